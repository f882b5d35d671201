use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod client;
mod confidence;
mod config;
mod engine;
mod error;
mod metrics;
mod models;
mod output;
mod pos;
mod readability;
mod registry;
mod report;
mod runner;
mod segments;
mod similarity;
mod stats;
mod text;
mod tfidf;
mod toolkit;

use crate::client::OpenAiConversationClient;
use crate::config::Config;
use crate::engine::ConsistencyEngine;
use crate::output::OutputFormat;
use crate::registry::ModelRegistry;
use crate::runner::Runner;
use crate::toolkit::AnalysisToolkit;

/// LLM consistency CLI - sample a model repeatedly and measure how stable its replies are
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML run file
    run_file: PathBuf,

    /// Output format: plain or json
    #[arg(short, long, default_value = "plain")]
    output: OutputFormat,

    /// Verbose output - log every run and segment
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = Config::from_file(&args.run_file)?;
    let registry = ModelRegistry::from_configs(&config.models)?;
    let engine = ConsistencyEngine::new(
        registry,
        OpenAiConversationClient::new(),
        AnalysisToolkit::full(),
    );
    let runner = Runner::new(config, engine);

    let results = runner.run_experiments().await?;

    output::print_results(&results, args.output);

    Ok(())
}
