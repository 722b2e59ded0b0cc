use sysinfo::System;
use tracing::debug;

use crate::error::MemorySizeError;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Memory figures the estimator compares against.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemMemory {
    /// Total host RAM in GB.
    pub ram_gb: f64,
    /// Dedicated memory of the primary GPU in GB; 0.0 without a GPU.
    pub vram_gb: f64,
    pub gpu_name: Option<String>,
}

/// A GPU reported by `nvidia-smi`.
#[derive(Debug, Clone, PartialEq)]
struct NvidiaGpu {
    name: String,
    vram_gb: f64,
}

impl SystemMemory {
    pub fn new(ram_gb: f64, vram_gb: f64) -> Self {
        Self {
            ram_gb,
            vram_gb,
            gpu_name: None,
        }
    }

    pub fn detect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        let ram_gb = sys.total_memory() as f64 / BYTES_PER_GB;

        // Primary GPU = the one with the most VRAM.
        let primary = Self::detect_nvidia_gpus().into_iter().max_by(|a, b| {
            a.vram_gb
                .partial_cmp(&b.vram_gb)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let (vram_gb, gpu_name) = match primary {
            Some(gpu) => (gpu.vram_gb, Some(gpu.name)),
            None => (0.0, None),
        };
        debug!(ram_gb, vram_gb, gpu = ?gpu_name, "detected system memory");

        SystemMemory {
            ram_gb,
            vram_gb,
            gpu_name,
        }
    }

    fn detect_nvidia_gpus() -> Vec<NvidiaGpu> {
        let output = match std::process::Command::new("nvidia-smi")
            .arg("--query-gpu=memory.total,name")
            .arg("--format=csv,noheader,nounits")
            .output()
        {
            Ok(o) if o.status.success() => o,
            _ => {
                debug!("nvidia-smi unavailable, assuming no dedicated GPU");
                return Vec::new();
            }
        };

        match String::from_utf8(output.stdout) {
            Ok(text) => Self::parse_nvidia_smi_list(&text),
            Err(_) => Vec::new(),
        }
    }

    /// Parse `nvidia-smi --query-gpu=memory.total,name --format=csv,noheader,nounits`.
    /// One entry per card; memory is reported in MiB.
    fn parse_nvidia_smi_list(text: &str) -> Vec<NvidiaGpu> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| {
                let (mem, name) = line.split_once(',').unwrap_or((line, ""));
                let vram_mb = mem.trim().parse::<f64>().ok().filter(|v| *v > 0.0)?;
                let name = match name.trim() {
                    "" => "NVIDIA GPU".to_string(),
                    n => n.to_string(),
                };
                Some(NvidiaGpu {
                    name,
                    vram_gb: vram_mb / 1024.0,
                })
            })
            .collect()
    }

    /// Replace detected VRAM with a user-specified value (GB), for when
    /// autodetection misses the card.
    pub fn with_vram_override(mut self, vram_gb: f64) -> Self {
        self.vram_gb = vram_gb;
        if self.gpu_name.is_none() {
            self.gpu_name = Some("User-specified GPU".to_string());
        }
        self
    }

    pub fn with_ram_override(mut self, ram_gb: f64) -> Self {
        self.ram_gb = ram_gb;
        self
    }
}

/// Unit suffixes accepted by [`parse_memory_size`], as multipliers to GB.
const SIZE_UNITS: &[(&[&str], f64)] = &[
    (&["", "G", "GB", "GIB"], 1.0),
    (&["M", "MB", "MIB"], 1.0 / 1024.0),
    (&["T", "TB", "TIB"], 1024.0),
];

/// Parse a size like `24G`, `24000MB` or `1.5t` into GB. A bare number is GB.
pub fn parse_memory_size(input: &str) -> Result<f64, MemorySizeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(MemorySizeError::Empty);
    }

    let number_len = input
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .len();
    let (number, unit) = input.split_at(number_len);
    let number = number.trim();

    let value = number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| MemorySizeError::Number(input.to_string()))?;

    let unit = unit.to_ascii_uppercase();
    let (_, factor) = SIZE_UNITS
        .iter()
        .find(|(names, _)| names.contains(&unit.as_str()))
        .ok_or_else(|| MemorySizeError::Unit(unit.clone()))?;

    Ok(value * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nvidia_smi_per_card() {
        let text = "24564, NVIDIA GeForce RTX 4090\n16376, NVIDIA GeForce RTX 4080\n";
        let gpus = SystemMemory::parse_nvidia_smi_list(text);

        assert_eq!(gpus.len(), 2);
        assert!(gpus[0].name.contains("4090"));
        // 24564 MiB ~= 23.99 GiB
        assert!(gpus[0].vram_gb > 23.0 && gpus[0].vram_gb < 25.0);
    }

    #[test]
    fn test_parse_nvidia_smi_skips_garbage() {
        let text = "\n[N/A], Some GPU\n8192,\n";
        let gpus = SystemMemory::parse_nvidia_smi_list(text);

        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].name, "NVIDIA GPU");
        assert_eq!(gpus[0].vram_gb, 8.0);
    }

    #[test]
    fn test_overrides() {
        let mem = SystemMemory::new(16.0, 0.0)
            .with_vram_override(24.0)
            .with_ram_override(64.0);
        assert_eq!(mem.ram_gb, 64.0);
        assert_eq!(mem.vram_gb, 24.0);
        assert_eq!(mem.gpu_name.as_deref(), Some("User-specified GPU"));
    }

    #[test]
    fn test_parse_memory_size_units() {
        assert_eq!(parse_memory_size("32G"), Ok(32.0));
        assert_eq!(parse_memory_size("32gib"), Ok(32.0));
        assert_eq!(parse_memory_size("2048M"), Ok(2.0));
        assert_eq!(parse_memory_size("1.5t"), Ok(1536.0));
        assert_eq!(parse_memory_size(" 8 "), Ok(8.0));
        assert_eq!(parse_memory_size("12 GB"), Ok(12.0));
    }

    #[test]
    fn test_parse_memory_size_errors() {
        assert_eq!(parse_memory_size(""), Err(MemorySizeError::Empty));
        assert_eq!(
            parse_memory_size("lots"),
            Err(MemorySizeError::Number("lots".to_string()))
        );
        assert_eq!(
            parse_memory_size("-4G"),
            Err(MemorySizeError::Number("-4G".to_string()))
        );
        assert_eq!(
            parse_memory_size("8Q"),
            Err(MemorySizeError::Unit("Q".to_string()))
        );
    }
}
