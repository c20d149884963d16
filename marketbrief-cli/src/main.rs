//! MarketBrief CLI — pipeline and registry commands.
//!
//! Commands:
//! - `run` — fetch every registered dataset and write JSON documents + index
//! - `fetch` — run the pipeline for a single dataset by id
//! - `datasets` — list the dataset registry

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use marketbrief_core::registry::Registry;
use marketbrief_core::sources::StandardFactory;
use marketbrief_runner::{run_pipeline, RunOptions, StdoutProgress};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "marketbrief",
    about = "MarketBrief CLI — build-time market data pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every registered dataset and write JSON documents + index.json.
    Run {
        /// Path to a TOML dataset registry. Defaults to the built-in registry.
        #[arg(long)]
        datasets: Option<PathBuf>,

        /// Output directory for dataset documents.
        #[arg(long, default_value = "data")]
        output_dir: PathBuf,

        /// Total-run deadline in seconds. Datasets not started by then are skipped.
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Fetch datasets one at a time instead of in parallel.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Cap on price rows kept per symbol in output documents.
        #[arg(long)]
        max_rows: Option<usize>,
    },
    /// Run the pipeline for a single dataset by id.
    Fetch {
        /// Dataset id (see `datasets` for the list).
        id: String,

        /// Path to a TOML dataset registry. Defaults to the built-in registry.
        #[arg(long)]
        datasets: Option<PathBuf>,

        /// Output directory for the dataset document.
        #[arg(long, default_value = "data")]
        output_dir: PathBuf,
    },
    /// List the dataset registry.
    Datasets {
        /// Path to a TOML dataset registry. Defaults to the built-in registry.
        #[arg(long)]
        datasets: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            datasets,
            output_dir,
            timeout_secs,
            sequential,
            max_rows,
        } => run_cmd(datasets, output_dir, timeout_secs, sequential, max_rows),
        Commands::Fetch {
            id,
            datasets,
            output_dir,
        } => fetch_cmd(&id, datasets, output_dir),
        Commands::Datasets { datasets } => datasets_cmd(datasets),
    }
}

fn load_registry(path: Option<PathBuf>) -> Result<Registry> {
    match path {
        Some(path) => Registry::from_toml_file(&path)
            .with_context(|| format!("failed to load registry from {}", path.display())),
        None => Ok(Registry::builtin()),
    }
}

fn run_cmd(
    datasets: Option<PathBuf>,
    output_dir: PathBuf,
    timeout_secs: Option<u64>,
    sequential: bool,
    max_rows: Option<usize>,
) -> Result<()> {
    let registry = load_registry(datasets)?;
    if registry.is_empty() {
        bail!("registry is empty: nothing to fetch");
    }

    let mut options = RunOptions::new(output_dir);
    options.timeout = timeout_secs.map(Duration::from_secs);
    options.sequential = sequential;
    if let Some(cap) = max_rows {
        options.transform.max_rows_per_symbol = cap;
    }

    let factory = StandardFactory::new();
    let summary = run_pipeline(&registry, &factory, &options, &StdoutProgress)?;

    if summary.all_failed() {
        bail!("every dataset failed; see {} for details",
            marketbrief_runner::summary_path(&options.output_dir).display());
    }

    Ok(())
}

fn fetch_cmd(id: &str, datasets: Option<PathBuf>, output_dir: PathBuf) -> Result<()> {
    let registry = load_registry(datasets)?;
    let descriptor = match registry.lookup(id) {
        Some(descriptor) => descriptor.clone(),
        None => {
            let known: Vec<&str> = registry.list().iter().map(|d| d.id.as_str()).collect();
            bail!("unknown dataset '{id}'. Known: {}", known.join(", "));
        }
    };

    // A one-dataset registry reuses the whole pipeline path, so `fetch`
    // writes the same document shape `run` would.
    let single = Registry::new(vec![descriptor])?;
    let options = RunOptions::new(output_dir);
    let factory = StandardFactory::new();
    let summary = run_pipeline(&single, &factory, &options, &StdoutProgress)?;

    if summary.all_failed() {
        bail!("fetch failed for '{id}'");
    }

    Ok(())
}

fn datasets_cmd(datasets: Option<PathBuf>) -> Result<()> {
    let registry = load_registry(datasets)?;

    println!(
        "{:<14} {:<16} {}",
        "Id", "Category", "Description"
    );
    println!("{}", "-".repeat(72));
    for descriptor in registry.list() {
        println!(
            "{:<14} {:<16} {}",
            descriptor.id,
            descriptor.category().to_string(),
            descriptor.description
        );
    }
    println!();
    println!("{} dataset(s)", registry.len());

    Ok(())
}
