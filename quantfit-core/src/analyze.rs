//! Repository analysis: fetch a listing, work out what kind of repository it
//! is, and estimate how each candidate download would run.

use tracing::debug;

use crate::classify::{Classification, Performance, classify};
use crate::error::AnalysisError;
use crate::estimate::{bytes_to_gb, estimate_ram_gb};
use crate::group::group_files;
use crate::hardware::SystemMemory;
use crate::hub::{RemoteFile, RepoSource};
use crate::multipliers::QuantMultipliers;
use crate::url::{RepoTarget, parse_model_url};

/// Extensions counted as weights in non-GGUF repositories.
pub const WEIGHT_EXTENSIONS: &[&str] = &[".safetensors", ".bin"];

pub const GGUF_EXTENSION: &str = ".gguf";

/// Label used when a whole repository is estimated as one unit.
pub const WHOLE_REPOSITORY: &str = "whole repository";

/// Estimate for one download unit (a file, a quant group, or a whole repo).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub label: String,
    pub size_gb: f64,
    pub classification: Classification,
}

impl AnalysisResult {
    pub fn performance(&self) -> Performance {
        self.classification.performance
    }

    pub fn required_gb(&self) -> f64 {
        self.classification.required_gb
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// A single file picked via a `/blob/main/` URL.
    SingleFile {
        repo_id: String,
        memory: SystemMemory,
        result: AnalysisResult,
    },
    /// A GGUF repository with at least one quantization that fits.
    Quantizations {
        repo_id: String,
        memory: SystemMemory,
        /// Sorted ascending by size.
        viable: Vec<AnalysisResult>,
        recommended: String,
    },
    /// All weight files of a repository (or subfolder) estimated together.
    WholeRepository {
        repo_id: String,
        subfolder: Option<String>,
        memory: SystemMemory,
        result: AnalysisResult,
    },
}

pub struct Analyzer<'a, S: RepoSource> {
    source: &'a S,
    table: &'a QuantMultipliers,
    memory: SystemMemory,
}

impl<'a, S: RepoSource> Analyzer<'a, S> {
    pub fn new(source: &'a S, table: &'a QuantMultipliers, memory: SystemMemory) -> Self {
        Self {
            source,
            table,
            memory,
        }
    }

    pub fn memory(&self) -> &SystemMemory {
        &self.memory
    }

    /// Analyze the repository or file a Hub URL points at.
    /// The URL is validated before anything is fetched; exactly one listing
    /// request is made otherwise.
    pub fn analyze(&self, url: &str) -> Result<Report, AnalysisError> {
        let target = parse_model_url(url)?;
        let files = self.source.list_files(target.repo_id())?;
        debug!(repo_id = target.repo_id(), files = files.len(), "analyzing repository");

        match target {
            RepoTarget::File { repo_id, path } => self.analyze_file(repo_id, &path, &files),
            RepoTarget::Repository { repo_id, subfolder } => {
                if repo_id.to_uppercase().contains("GGUF") {
                    if let Some(report) = self.analyze_gguf(&repo_id, &files)? {
                        return Ok(report);
                    }
                    debug!(%repo_id, "no viable GGUF quantization, estimating weight files");
                }
                self.analyze_weights(repo_id, subfolder, &files)
            }
        }
    }

    fn evaluate(&self, label: &str, size_bytes: u64) -> AnalysisResult {
        let required = estimate_ram_gb(self.table, label, size_bytes);
        AnalysisResult {
            label: label.to_string(),
            size_gb: bytes_to_gb(size_bytes),
            classification: classify(required, self.memory.ram_gb, self.memory.vram_gb),
        }
    }

    fn analyze_file(
        &self,
        repo_id: String,
        path: &str,
        files: &[RemoteFile],
    ) -> Result<Report, AnalysisError> {
        let Some(file) = files.iter().find(|f| f.name == path) else {
            return Err(AnalysisError::FileNotFoundInRepository {
                repo_id,
                path: path.to_string(),
            });
        };

        Ok(Report::SingleFile {
            repo_id,
            memory: self.memory.clone(),
            result: self.evaluate(&file.name, file.size),
        })
    }

    /// `Ok(None)` when GGUF files exist but none of them fit.
    fn analyze_gguf(
        &self,
        repo_id: &str,
        files: &[RemoteFile],
    ) -> Result<Option<Report>, AnalysisError> {
        let gguf: Vec<RemoteFile> = files
            .iter()
            .filter(|f| f.name.ends_with(GGUF_EXTENSION))
            .cloned()
            .collect();
        if gguf.is_empty() {
            return Err(AnalysisError::NoMatchingFiles {
                what: "GGUF files".to_string(),
                scope: format!("repository '{repo_id}'"),
            });
        }

        let mut viable: Vec<AnalysisResult> = group_files(self.table, &gguf)
            .into_iter()
            .map(|g| self.evaluate(&g.label, g.total_size))
            .filter(|r| r.performance().is_viable())
            .collect();
        viable.sort_by(|a, b| {
            a.size_gb
                .partial_cmp(&b.size_gb)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let Some(recommended) = recommend(&viable).map(|r| r.label.clone()) else {
            return Ok(None);
        };

        Ok(Some(Report::Quantizations {
            repo_id: repo_id.to_string(),
            memory: self.memory.clone(),
            viable,
            recommended,
        }))
    }

    fn analyze_weights(
        &self,
        repo_id: String,
        subfolder: Option<String>,
        files: &[RemoteFile],
    ) -> Result<Report, AnalysisError> {
        let total: u64 = files
            .iter()
            .filter(|f| WEIGHT_EXTENSIONS.iter().any(|ext| f.name.ends_with(ext)))
            .filter(|f| match &subfolder {
                Some(dir) => f.name.starts_with(dir.as_str()),
                None => true,
            })
            .map(|f| f.size)
            .sum();

        if total == 0 {
            return Err(AnalysisError::NoMatchingFiles {
                what: format!("model files ({})", WEIGHT_EXTENSIONS.join(", ")),
                scope: "the specified repo/subfolder".to_string(),
            });
        }

        // Estimated on the repo id, so a quant tag in the repo name still counts.
        let mut result = self.evaluate(&repo_id, total);
        result.label = WHOLE_REPOSITORY.to_string();

        Ok(Report::WholeRepository {
            repo_id,
            subfolder,
            memory: self.memory.clone(),
            result,
        })
    }
}

/// Pick the quantization to recommend from viable results sorted by size.
///
/// - everything is slow: the smallest
/// - otherwise the largest GPU-Ready, then the largest Ready,
///   then the smallest Will-be-slow
///
/// Ties go to the earlier entry.
pub fn recommend(viable: &[AnalysisResult]) -> Option<&AnalysisResult> {
    if viable
        .iter()
        .all(|r| r.performance() == Performance::WillBeSlow)
    {
        return smallest(viable.iter());
    }

    let with = |p: Performance| viable.iter().filter(move |r| r.performance() == p);
    largest(with(Performance::GpuReady))
        .or_else(|| largest(with(Performance::Ready)))
        .or_else(|| smallest(with(Performance::WillBeSlow)))
}

fn smallest<'a>(it: impl Iterator<Item = &'a AnalysisResult>) -> Option<&'a AnalysisResult> {
    it.reduce(|best, r| if r.size_gb < best.size_gb { r } else { best })
}

fn largest<'a>(it: impl Iterator<Item = &'a AnalysisResult>) -> Option<&'a AnalysisResult> {
    it.reduce(|best, r| if r.size_gb > best.size_gb { r } else { best })
}
