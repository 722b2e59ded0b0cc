//! Quantization multiplier table.
//!
//! Maps a quantization label (e.g. `Q4_K`) to the memory-overhead multiplier
//! applied to a file's size. Declaration order is significant: substring
//! matching takes the first key that hits, and the selector returns the last
//! fitting key, so the table keeps keys in the order the JSON file lists them.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::MultiplierError;

/// Default location of the table, relative to the working directory.
pub const DEFAULT_PATH: &str = "quant_multipliers.json";

#[derive(Debug, Clone, PartialEq)]
struct QuantEntry {
    label: String,
    /// Uppercased label used for case-insensitive substring matching.
    pattern: String,
    multiplier: f64,
}

/// Ordered, immutable quantization multiplier table.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantMultipliers {
    entries: Vec<QuantEntry>,
}

impl QuantMultipliers {
    /// Build a table from `(label, multiplier)` pairs, keeping their order.
    pub fn new<I, S>(entries: I) -> Result<Self, MultiplierError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(label, multiplier)| {
                let label = label.into();
                if !multiplier.is_finite() || multiplier <= 0.0 {
                    return Err(MultiplierError::InvalidMultiplier {
                        value: multiplier.to_string(),
                        label,
                    });
                }
                Ok(QuantEntry {
                    pattern: label.to_uppercase(),
                    label,
                    multiplier,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// Load the table from a JSON object file (`{"Q4_K": 1.3, ...}`).
    pub fn load(path: &Path) -> Result<Self, MultiplierError> {
        if !path.exists() {
            return Err(MultiplierError::Missing(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path).map_err(|source| MultiplierError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&text)?;

        debug!(path = %path.display(), entries = table.len(), "loaded quantization multipliers");
        Ok(table)
    }

    /// Parse a JSON object whose values are numbers. Key order is preserved.
    pub fn from_json_str(json: &str) -> Result<Self, MultiplierError> {
        let object: Map<String, Value> = serde_json::from_str(json)?;

        let pairs = object
            .into_iter()
            .map(|(label, value)| match value.as_f64() {
                Some(multiplier) => Ok((label, multiplier)),
                None => Err(MultiplierError::InvalidMultiplier {
                    label,
                    value: value.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(pairs)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels and multipliers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .iter()
            .map(|e| (e.label.as_str(), e.multiplier))
    }

    /// Exact-label lookup.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.multiplier)
    }

    /// First key (in declaration order) that occurs in `name`, ignoring case.
    pub fn match_name(&self, name: &str) -> Option<(&str, f64)> {
        let upper = name.to_uppercase();
        self.entries
            .iter()
            .find(|e| upper.contains(&e.pattern))
            .map(|e| (e.label.as_str(), e.multiplier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_declaration_order() {
        let table = QuantMultipliers::from_json_str(r#"{"Q8_0": 1.2, "Q2_K": 1.4, "Q4_K": 1.3}"#)
            .unwrap();
        let labels: Vec<&str> = table.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Q8_0", "Q2_K", "Q4_K"]);
        assert_eq!(table.get("Q2_K"), Some(1.4));
        assert_eq!(table.get("q2_k"), None);
    }

    #[test]
    fn test_match_name_is_case_insensitive_and_first_wins() {
        let table = QuantMultipliers::new([("q4_k", 1.3), ("Q4_K_M", 9.0)]).unwrap();
        assert_eq!(table.match_name("model-Q4_K_M.gguf"), Some(("q4_k", 1.3)));
        assert_eq!(table.match_name("model-q4_k_m.gguf"), Some(("q4_k", 1.3)));
        assert_eq!(table.match_name("model-f16.gguf"), None);
    }

    #[test]
    fn test_rejects_non_numeric_and_non_positive_values() {
        let err = QuantMultipliers::from_json_str(r#"{"Q4_K": "fast"}"#).unwrap_err();
        assert!(matches!(err, MultiplierError::InvalidMultiplier { ref label, .. } if label == "Q4_K"));

        let err = QuantMultipliers::new([("Q4_K", 0.0)]).unwrap_err();
        assert!(matches!(err, MultiplierError::InvalidMultiplier { .. }));
    }

    #[test]
    fn test_rejects_non_object_json() {
        let err = QuantMultipliers::from_json_str("[1.0, 2.0]").unwrap_err();
        assert!(matches!(err, MultiplierError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("quantfit-definitely-missing-table.json");
        let err = QuantMultipliers::load(&path).unwrap_err();
        assert!(matches!(err, MultiplierError::Missing(p) if p == path));
    }

    #[test]
    fn test_shipped_table_parses() {
        let table = QuantMultipliers::from_json_str(include_str!("../../quant_multipliers.json"))
            .unwrap();
        assert!(!table.is_empty());
        // BF16 must come before F16 or bf16 files would match F16 first.
        assert_eq!(table.match_name("model-bf16.gguf"), Some(("BF16", 1.15)));
    }
}
