mod display;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use quantfit_core::error::MultiplierError;
use quantfit_core::estimate::select_best;
use quantfit_core::hardware::parse_memory_size;
use quantfit_core::{Analyzer, HubClient, QuantMultipliers, SystemMemory, multipliers};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quantfit")]
#[command(about = "Check whether a Hugging Face model fits your RAM and VRAM", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Quantization multiplier table (JSON object of label -> multiplier)
    #[arg(long, value_name = "PATH", global = true)]
    multipliers: Option<PathBuf>,

    /// Override GPU VRAM size (e.g. "24G", "24000M").
    /// Useful when GPU memory autodetection fails.
    #[arg(long, value_name = "SIZE", global = true)]
    memory: Option<String>,

    /// Override total system RAM (same formats as --memory)
    #[arg(long, value_name = "SIZE", global = true)]
    ram: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a model repository, subfolder or single file URL
    Analyze {
        /// e.g. https://huggingface.co/org/Model-GGUF
        url: String,
    },

    /// Show detected RAM and GPU memory
    System,

    /// Pick the quantization that fits a model of the given size
    Select {
        /// Model size in GB
        #[arg(long)]
        size: f64,

        /// Candidate quantization labels, as written in the multiplier table
        #[arg(required = true)]
        labels: Vec<String>,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Only `system` runs without the multiplier table.
fn needs_multipliers(command: Option<&Commands>) -> bool {
    !matches!(command, Some(Commands::System))
}

fn load_multipliers(path: &Path) -> QuantMultipliers {
    match QuantMultipliers::load(path) {
        Ok(table) => table,
        Err(MultiplierError::Missing(missing)) => {
            display::display_missing_multipliers(&missing);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            std::process::exit(1);
        }
    }
}

fn parse_override(flag: &str, value: &Option<String>) -> Option<f64> {
    match parse_memory_size(value.as_deref()?) {
        Ok(gb) => Some(gb),
        Err(e) => {
            eprintln!("{} ignoring --{flag}: {e}", "Warning:".yellow());
            None
        }
    }
}

/// Detect system memory, then apply any `--memory` / `--ram` overrides.
fn detect_memory(cli: &Cli) -> SystemMemory {
    let mut memory = SystemMemory::detect();
    if let Some(vram) = parse_override("memory", &cli.memory) {
        memory = memory.with_vram_override(vram);
    }
    if let Some(ram) = parse_override("ram", &cli.ram) {
        memory = memory.with_ram_override(ram);
    }
    memory
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(80));
    pb.set_message(message);
    pb
}

fn run_analyze(cli: &Cli, table: &QuantMultipliers, url: &str) {
    println!("\n{} {}", "Analyzing:".yellow(), url);

    let pb = spinner("Analyzing system resources...".to_string());
    let memory = detect_memory(cli);

    pb.set_message(format!("Analyzing {url}..."));
    let hub = HubClient::new();
    let analyzer = Analyzer::new(&hub, table, memory);
    let outcome = analyzer.analyze(url);
    pb.finish_and_clear();

    match outcome {
        Ok(report) => display::display_report(&report),
        Err(e) => display::display_analysis_error(&e),
    }
    println!();
}

fn run_select(cli: &Cli, table: &QuantMultipliers, size_gb: f64, labels: &[String]) {
    let memory = detect_memory(cli);
    let selection = select_best(table, memory.ram_gb, memory.vram_gb, size_gb, labels);
    display::display_selection(&memory, size_gb, labels, &selection);
}

/// Prompt for one URL on stdin. `None` means quit without output.
fn prompt_for_url() -> Option<String> {
    println!(
        "\n{}",
        "Enter a Hugging Face model URL (or 'exit' to quit):"
            .bold()
            .cyan()
    );
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return None;
    }
    let url = line.trim();
    if url.eq_ignore_ascii_case("exit") {
        return None;
    }
    Some(url.to_string())
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    // Loaded before any prompt so a missing table fails fast.
    let table = needs_multipliers(cli.command.as_ref()).then(|| {
        let path = cli
            .multipliers
            .clone()
            .unwrap_or_else(|| PathBuf::from(multipliers::DEFAULT_PATH));
        load_multipliers(&path)
    });

    match (&cli.command, &table) {
        (Some(Commands::System), _) => display::display_system(&detect_memory(&cli)),
        (Some(Commands::Analyze { url }), Some(table)) => run_analyze(&cli, table, url),
        (Some(Commands::Select { size, labels }), Some(table)) => {
            run_select(&cli, table, *size, labels)
        }
        (None, Some(table)) => {
            if let Some(url) = prompt_for_url()
                && !url.is_empty()
            {
                run_analyze(&cli, table, &url);
            }
        }
        (_, None) => unreachable!("multiplier table is loaded for every command but `system`"),
    }
}
