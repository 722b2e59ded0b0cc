//! Parsing of Hugging Face model URLs.

use crate::error::AnalysisError;

const HOST_MARKER: &str = "huggingface.co/";
const TREE_MARKER: &str = "/tree/main/";
const BLOB_MARKER: &str = "/blob/main/";

/// What a model URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoTarget {
    /// The whole repository, optionally narrowed to a subfolder prefix.
    Repository {
        repo_id: String,
        subfolder: Option<String>,
    },
    /// One exact file inside the repository.
    File { repo_id: String, path: String },
}

impl RepoTarget {
    pub fn repo_id(&self) -> &str {
        match self {
            RepoTarget::Repository { repo_id, .. } | RepoTarget::File { repo_id, .. } => repo_id,
        }
    }
}

/// Parse `https://huggingface.co/<org>/<repo>[/tree/main/<dir>|/blob/main/<file>]`.
///
/// Only the host marker is required to be present; anything after it up to
/// the tree/blob marker is taken as the repository id verbatim.
pub fn parse_model_url(url: &str) -> Result<RepoTarget, AnalysisError> {
    let invalid = || AnalysisError::InvalidUrl(url.to_string());

    let (_, path) = url.trim().split_once(HOST_MARKER).ok_or_else(invalid)?;

    let target = if let Some((repo_id, file)) = path.split_once(BLOB_MARKER) {
        let file = file.trim_end_matches('/');
        if file.is_empty() {
            return Err(invalid());
        }
        RepoTarget::File {
            repo_id: repo_id.to_string(),
            path: file.to_string(),
        }
    } else if let Some((repo_id, dir)) = path.split_once(TREE_MARKER) {
        let dir = dir.trim_end_matches('/');
        RepoTarget::Repository {
            repo_id: repo_id.to_string(),
            subfolder: Some(dir.to_string()).filter(|d| !d.is_empty()),
        }
    } else {
        RepoTarget::Repository {
            repo_id: path.trim_end_matches('/').to_string(),
            subfolder: None,
        }
    };

    if target.repo_id().is_empty() {
        return Err(invalid());
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_repository() {
        let t = parse_model_url("https://huggingface.co/TheBloke/Llama-2-7B-GGUF/").unwrap();
        assert_eq!(
            t,
            RepoTarget::Repository {
                repo_id: "TheBloke/Llama-2-7B-GGUF".to_string(),
                subfolder: None,
            }
        );
    }

    #[test]
    fn test_tree_subfolder() {
        let t = parse_model_url("https://huggingface.co/org/model/tree/main/unet").unwrap();
        assert_eq!(
            t,
            RepoTarget::Repository {
                repo_id: "org/model".to_string(),
                subfolder: Some("unet".to_string()),
            }
        );
    }

    #[test]
    fn test_blob_file_keeps_nested_path() {
        let t =
            parse_model_url("https://huggingface.co/org/model-GGUF/blob/main/q4/model-Q4_K_M.gguf")
                .unwrap();
        assert_eq!(
            t,
            RepoTarget::File {
                repo_id: "org/model-GGUF".to_string(),
                path: "q4/model-Q4_K_M.gguf".to_string(),
            }
        );
    }

    #[test]
    fn test_rejects_other_hosts_and_empty_ids() {
        for url in [
            "https://example.com/org/model",
            "not a url",
            "https://huggingface.co/",
            "https://huggingface.co/org/model/blob/main/",
        ] {
            assert!(
                matches!(parse_model_url(url), Err(AnalysisError::InvalidUrl(_))),
                "accepted {url}"
            );
        }
    }
}
