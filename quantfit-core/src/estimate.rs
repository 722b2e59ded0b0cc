use crate::multipliers::QuantMultipliers;

/// Multiplier used when a name matches no known quantization.
pub const DEFAULT_MULTIPLIER: f64 = 2.5;

/// Extra fraction of the weights reserved for attention / KV buffers.
pub const ATTENTION_OVERHEAD: f64 = 0.1;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

/// Estimate peak RAM (GB) needed to run a file of `size_bytes`.
///
/// The quantization is inferred from `name` by substring match against the
/// table; unknown names use [`DEFAULT_MULTIPLIER`].
/// Formula: `size_gb * multiplier + size_gb * ATTENTION_OVERHEAD`.
pub fn estimate_ram_gb(table: &QuantMultipliers, name: &str, size_bytes: u64) -> f64 {
    let size_gb = bytes_to_gb(size_bytes);
    let multiplier = table
        .match_name(name)
        .map(|(_, m)| m)
        .unwrap_or(DEFAULT_MULTIPLIER);

    let base_ram = size_gb * multiplier;
    let attention = size_gb * ATTENTION_OVERHEAD;
    base_ram + attention
}

/// Outcome of [`select_best`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Fits(String),
    TooLarge,
}

impl Selection {
    pub fn label(&self) -> &str {
        match self {
            Selection::Fits(label) => label,
            Selection::TooLarge => "Model too large for available memory",
        }
    }
}

/// Pick a quantization from `candidates` that fits in `max(ram, vram)`.
///
/// Candidates are visited in table order and the last one that fits wins.
/// The result therefore depends on how the table file orders its keys, not
/// on the multipliers' magnitudes.
pub fn select_best(
    table: &QuantMultipliers,
    ram_gb: f64,
    vram_gb: f64,
    model_size_gb: f64,
    candidates: &[impl AsRef<str>],
) -> Selection {
    let ceiling = ram_gb.max(vram_gb);

    table
        .iter()
        .filter(|(label, _)| candidates.iter().any(|c| c.as_ref() == *label))
        .filter(|(_, multiplier)| model_size_gb * (multiplier + ATTENTION_OVERHEAD) <= ceiling)
        .last()
        .map(|(label, _)| Selection::Fits(label.to_string()))
        .unwrap_or(Selection::TooLarge)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GB: u64 = 1024 * 1024 * 1024;

    fn table() -> QuantMultipliers {
        QuantMultipliers::new([("Q8_0", 1.2), ("Q4_K", 1.3), ("Q2_K", 1.4)]).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ────────────────────────────────────────────────────────────────────
    // estimate_ram_gb
    // ────────────────────────────────────────────────────────────────────

    #[test]
    fn test_estimate_unknown_uses_default_multiplier() {
        let table = table();
        for size in [1, 3, 7, 70] {
            let est = estimate_ram_gb(&table, "model.safetensors", size * GB);
            assert!(approx(est, size as f64 * 2.6), "size {size}: {est}");
        }
    }

    #[test]
    fn test_estimate_matching_label() {
        let table = table();
        let est = estimate_ram_gb(&table, "llama-q4_k_m.gguf", 4 * GB);
        assert!(approx(est, 4.0 * 1.4));
        let est = estimate_ram_gb(&table, "Q8_0", 2 * GB);
        assert!(approx(est, 2.0 * 1.3));
    }

    #[test]
    fn test_estimate_zero_bytes() {
        assert_eq!(estimate_ram_gb(&table(), "anything", 0), 0.0);
    }

    // ────────────────────────────────────────────────────────────────────
    // select_best
    // ────────────────────────────────────────────────────────────────────

    #[test]
    fn test_select_returns_last_fitting_in_table_order() {
        // 10 GB model: Q8_0 needs 13, Q4_K 14, Q2_K 15.
        let table = table();
        let all = ["Q8_0", "Q4_K", "Q2_K"];
        assert_eq!(
            select_best(&table, 16.0, 0.0, 10.0, &all),
            Selection::Fits("Q2_K".to_string())
        );
        assert_eq!(
            select_best(&table, 14.5, 0.0, 10.0, &all),
            Selection::Fits("Q4_K".to_string())
        );
    }

    #[test]
    fn test_select_uses_larger_of_ram_and_vram() {
        let table = table();
        assert_eq!(
            select_best(&table, 4.0, 13.5, 10.0, &["Q8_0", "Q2_K"]),
            Selection::Fits("Q8_0".to_string())
        );
    }

    #[test]
    fn test_select_ignores_candidates_outside_table() {
        let table = table();
        assert_eq!(
            select_best(&table, 64.0, 0.0, 1.0, &["Q5_K", "f16"]),
            Selection::TooLarge
        );
    }

    #[test]
    fn test_select_too_large() {
        let table = table();
        let sel = select_best(&table, 8.0, 4.0, 10.0, &["Q8_0", "Q4_K", "Q2_K"]);
        assert_eq!(sel, Selection::TooLarge);
        assert_eq!(sel.label(), "Model too large for available memory");
    }
}
