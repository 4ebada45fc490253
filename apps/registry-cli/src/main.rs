//! Registry CLI Binary
//!
//! Extracts ledgers from OCR'd registry text and scores proposed deposits.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use registry_cli::{run_batch, Document};
use registry_engine::{EngineConfig, RegistryEngine};
use serde_json::json;
use shared_types::{Region, Valuation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "registry-cli")]
#[command(version, about = "Registry extraction and jeonse deposit risk scoring")]
struct Args {
    /// Engine configuration (TOML); built-in defaults when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the ledger and diagnostics from one document
    Extract { file: PathBuf },

    /// Extract one document and assess a proposed deposit against it
    Assess {
        file: PathBuf,

        /// Property value in won
        #[arg(long)]
        valuation: u64,

        /// Proposed deposit in won
        #[arg(long)]
        deposit: u64,

        /// Region override: seoul, overcrowding_control, metropolitan_city, other
        #[arg(long, value_parser = parse_region)]
        region: Option<Region>,
    },

    /// Extract many documents in parallel
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Per-document timeout in milliseconds
        #[arg(long, default_value = "5000")]
        timeout_ms: u64,
    },
}

fn parse_region(s: &str) -> Result<Region, String> {
    Region::parse_code(s).ok_or_else(|| format!("unknown region '{}'", s))
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_engine(config: Option<&Path>) -> anyhow::Result<RegistryEngine> {
    let config = match config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    Ok(RegistryEngine::with_config(config)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout is reserved for JSON output
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let engine = load_engine(args.config.as_deref())?;

    match args.command {
        Command::Extract { file } => {
            tracing::info!("Extracting {}", file.display());
            let extraction = engine.extract(&read(&file)?);
            print_json(&extraction)?;
        }
        Command::Assess {
            file,
            valuation,
            deposit,
            region,
        } => {
            tracing::info!("Assessing {}", file.display());
            let valuation = Valuation::point(valuation);
            let (extraction, assessment) =
                engine.analyze(&read(&file)?, Some(&valuation), deposit, region)?;
            print_json(&json!({
                "extraction": extraction,
                "assessment": assessment,
            }))?;
        }
        Command::Batch { files, timeout_ms } => {
            tracing::info!("Batch of {} documents, timeout {}ms", files.len(), timeout_ms);
            let documents = files
                .iter()
                .map(|path| {
                    let name = path.display().to_string();
                    match std::fs::read_to_string(path) {
                        Ok(text) => Document::new(name, text),
                        Err(e) => Document::unreadable(name, e.to_string()),
                    }
                })
                .collect();
            let items = run_batch(documents, timeout_ms).await;
            print_json(&items)?;
        }
    }

    Ok(())
}
