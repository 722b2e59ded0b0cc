//! Grouping of split / sharded files by inferred quantization label.

use crate::hub::RemoteFile;
use crate::multipliers::QuantMultipliers;

/// Size-variant suffixes in match priority order. The first one present in
/// the uppercased file name is appended to the base label.
pub const SIZE_VARIANTS: &[&str] = &["_L", "_M", "_S", "_XS", "_XXS"];

/// Files sharing one quantization label (e.g. all shards of a `Q4_K_M`).
#[derive(Debug, Clone, PartialEq)]
pub struct QuantGroup {
    pub label: String,
    /// Sum of member sizes in bytes.
    pub total_size: u64,
    pub files: Vec<RemoteFile>,
}

/// Infer the group label for a file name: first matching table key plus the
/// first size-variant suffix found anywhere in the name.
pub fn quant_label(table: &QuantMultipliers, name: &str) -> Option<String> {
    let (base, _) = table.match_name(name)?;
    let upper = name.to_uppercase();
    let variant = SIZE_VARIANTS
        .iter()
        .find(|v| upper.contains(*v))
        .copied()
        .unwrap_or("");
    Some(format!("{base}{variant}"))
}

/// Group files by [`quant_label`], summing sizes. Files with no recognised
/// quantization are left out. Groups come back in first-encounter order.
pub fn group_files(table: &QuantMultipliers, files: &[RemoteFile]) -> Vec<QuantGroup> {
    let mut groups: Vec<QuantGroup> = Vec::new();

    for file in files {
        let Some(label) = quant_label(table, &file.name) else {
            continue;
        };

        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => {
                group.total_size += file.size;
                group.files.push(file.clone());
            }
            None => groups.push(QuantGroup {
                label,
                total_size: file.size,
                files: vec![file.clone()],
            }),
        }
    }

    groups
}
