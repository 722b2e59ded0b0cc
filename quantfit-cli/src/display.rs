use std::path::Path;

use colored::*;
use quantfit_core::estimate::Selection;
use quantfit_core::{AnalysisError, AnalysisResult, Performance, Report, SystemMemory};
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct PropertyRow {
    #[tabled(rename = "Property")]
    property: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn row(property: &str, value: impl Into<String>) -> PropertyRow {
    PropertyRow {
        property: property.cyan().to_string(),
        value: value.into(),
    }
}

fn print_panel(title: &str, rows: Vec<PropertyRow>) {
    println!("\n{}", format!("=== {title} ===").bold().green());
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

fn memory_rows(memory: &SystemMemory) -> Vec<PropertyRow> {
    vec![
        row("RAM Available", format!("{:.2}GB", memory.ram_gb)),
        row("VRAM Available", format!("{:.2}GB", memory.vram_gb)),
    ]
}

fn colored_performance(performance: Performance) -> ColoredString {
    let label = performance.label();
    match performance {
        Performance::GpuReady | Performance::Ready => label.green(),
        Performance::WillBeSlow => label.yellow(),
        Performance::TooLarge => label.red(),
    }
}

/// Full verdict, e.g. `Ready (needs 5.20GB, 16.00GB RAM available)`.
fn performance_text(result: &AnalysisResult) -> String {
    format!(
        "{} ({})",
        colored_performance(result.performance()),
        result.classification.detail()
    )
}

/// One line per viable quantization, e.g. `Q4_K_M (8.0GB) - Ready`.
fn viable_line(result: &AnalysisResult) -> String {
    let label = result.performance().label();
    let perf = match result.performance() {
        Performance::GpuReady => label.green(),
        Performance::WillBeSlow => label.yellow(),
        _ => label.cyan(),
    };
    format!("{} ({:.1}GB) - {}", result.label, result.size_gb, perf)
}

pub fn display_report(report: &Report) {
    let rows = match report {
        Report::SingleFile { memory, result, .. } => {
            let mut rows = vec![
                row("File", result.label.clone()),
                row("Size", format!("{:.2}GB", result.size_gb)),
            ];
            rows.extend(memory_rows(memory));
            rows.push(row("Performance", performance_text(result)));
            rows
        }
        Report::Quantizations {
            memory,
            viable,
            recommended,
            ..
        } => {
            let mut rows = memory_rows(memory);
            let lines: Vec<String> = viable.iter().map(viable_line).collect();
            rows.push(row("Viable Quantizations", lines.join("\n")));
            rows.push(row(
                "Recommended Quantization",
                recommended.bold().blue().to_string(),
            ));
            rows
        }
        Report::WholeRepository {
            subfolder,
            memory,
            result,
            ..
        } => {
            let mut rows = Vec::new();
            if let Some(dir) = subfolder {
                rows.push(row("Subfolder", dir.clone()));
            }
            rows.push(row("Model Size", format!("{:.2}GB", result.size_gb)));
            rows.extend(memory_rows(memory));
            rows.push(row("Performance", performance_text(result)));
            rows
        }
    };

    print_panel("Model Analysis", rows);
}

pub fn display_analysis_error(err: &AnalysisError) {
    match err {
        AnalysisError::RepositoryNotFound(_) => {
            println!("\n{}", "Model Not Found".yellow());
            println!(
                "{}",
                "The model you're looking for does not exist or it's not public.".red()
            );
        }
        other => println!("{}", capitalize(&other.to_string()).red()),
    }
}

pub fn display_missing_multipliers(path: &Path) {
    println!("{} {} not found!", "Error:".red(), path.display());
    println!("Please ensure the file exists in the working directory, or pass --multipliers <PATH>.");
}

pub fn display_system(memory: &SystemMemory) {
    let mut rows = vec![row("Total RAM", format!("{:.2}GB", memory.ram_gb))];
    match &memory.gpu_name {
        Some(name) => {
            rows.push(row("GPU", name.clone()));
            rows.push(row("VRAM", format!("{:.2}GB", memory.vram_gb)));
        }
        None => rows.push(row("GPU", "Not detected")),
    }
    print_panel("System Memory", rows);
}

pub fn display_selection(
    memory: &SystemMemory,
    size_gb: f64,
    candidates: &[String],
    selection: &Selection,
) {
    let best = match selection {
        Selection::Fits(label) => label.bold().blue().to_string(),
        Selection::TooLarge => selection.label().red().to_string(),
    };

    let mut rows = vec![row("Model Size", format!("{size_gb:.2}GB"))];
    rows.extend(memory_rows(memory));
    rows.push(row("Candidates", candidates.join(", ")));
    rows.push(row("Best Quantization", best));
    print_panel("Quantization Selection", rows);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
