//! Salience CLI - Command-line interface
//!
//! Usage:
//!   salience analyze --original <text> [--variation-1 <text>] [--variation-2 <text>]
//!   salience compare <results.json>

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use salience_compare::{build_comparison, render_or_message, OutputFormat, TextEntitySet};
use salience_core::{AppConfig, EntityResult, FailurePolicy, TextLabel};
use salience_extractor::{create_extraction_stack, AnalysisRequest};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salience")]
#[command(about = "Compare entity salience across a text and its variations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities from up to three texts and compare them
    Analyze {
        #[command(flatten)]
        texts: TextArgs,

        /// Output format
        #[arg(long, default_value = "table", value_parser = parse_format)]
        format: OutputFormat,

        /// Leave out texts whose extraction fails instead of aborting
        #[arg(long)]
        degrade: bool,

        /// Configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Compare previously captured extraction results
    Compare {
        /// JSON file mapping text labels to entity lists
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "table", value_parser = parse_format)]
        format: OutputFormat,
    },
}

#[derive(Args, Debug, Default)]
struct TextArgs {
    /// Original text
    #[arg(long, conflicts_with = "original_file")]
    original: Option<String>,

    /// Read the original text from a file
    #[arg(long)]
    original_file: Option<PathBuf>,

    /// First variation
    #[arg(long = "variation-1", conflicts_with = "variation_1_file")]
    variation_1: Option<String>,

    /// Read the first variation from a file
    #[arg(long = "variation-1-file")]
    variation_1_file: Option<PathBuf>,

    /// Second variation
    #[arg(long = "variation-2", conflicts_with = "variation_2_file")]
    variation_2: Option<String>,

    /// Read the second variation from a file
    #[arg(long = "variation-2-file")]
    variation_2_file: Option<PathBuf>,
}

impl TextArgs {
    fn into_request(self) -> Result<AnalysisRequest> {
        Ok(AnalysisRequest::from_slots(
            resolve_text(self.original, self.original_file)?,
            resolve_text(self.variation_1, self.variation_1_file)?,
            resolve_text(self.variation_2, self.variation_2_file)?,
        ))
    }
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

fn resolve_text(inline: Option<String>, file: Option<PathBuf>) -> Result<Option<String>> {
    match (inline, file) {
        (Some(text), _) => Ok(Some(text)),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .map(Some)
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, None) => Ok(None),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

/// Load captured extraction results keyed by text label
fn load_results(path: &Path) -> Result<TextEntitySet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_results(&content)
}

fn parse_results(content: &str) -> Result<TextEntitySet> {
    let captured: BTreeMap<TextLabel, Vec<EntityResult>> =
        serde_json::from_str(content).context("Invalid results file")?;

    let mut set = TextEntitySet::new();
    for (label, entities) in captured {
        set.insert(label, entities)?;
    }
    Ok(set)
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("salience_extractor={}", config.logging.level).into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            texts,
            format,
            degrade,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            init_tracing(&config);

            let request = texts.into_request()?;
            let analyzer = create_extraction_stack(&config)?.analyzer(&config);
            let policy = if degrade {
                FailurePolicy::Degrade
            } else {
                analyzer.failure_policy()
            };

            let outcome = analyzer.analyze_with_policy(&request, policy).await?;
            for warning in &outcome.warnings {
                eprintln!("warning: {warning}");
            }
            println!("{}", render_or_message(&outcome.table, format));
        }
        Commands::Compare { path, format } => {
            init_tracing(&AppConfig::default());

            let set = load_results(&path)?;
            println!("{}", render_or_message(&build_comparison(&set), format));
        }
    }

    Ok(())
}
