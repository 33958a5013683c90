//! # docqa CLI
//!
//! Command-line interface for docqa, a question answering service over an
//! uploaded PDF.
//!
//! ## Commands
//!
//! - `docqa serve` - Run the HTTP API (and the web UI when `public/` exists)
//! - `docqa ask <PDF> <QUESTION>` - Index a PDF and answer one question
//! - `docqa config show|init|path` - Inspect configuration
//!
//! ## Examples
//!
//! ```bash
//! # Start the server on port 3001
//! HUGGINGFACEHUB_API_KEY=hf_... docqa serve
//!
//! # One-shot question, JSON output
//! docqa --format json ask report.pdf "What is the deadline?"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docqa::{app, router, Config};
use docqa_core::Answer;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about a PDF using retrieval-augmented generation")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/docqa/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Index a PDF and answer a single question
    Ask {
        /// PDF file to index
        pdf: PathBuf,

        /// Question to ask
        question: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print sample configuration file
    Init,
    /// Show config file path
    Path,
}

/// Output structure for `ask`.
#[derive(Serialize)]
struct AskOutput {
    question: String,
    answer: String,
    sources: Vec<SourceItem>,
    chunks: usize,
}

#[derive(Serialize)]
struct SourceItem {
    chunk: u32,
    score: f32,
    content: String,
}

impl AskOutput {
    fn new(question: String, answer: Answer) -> Self {
        Self {
            question,
            answer: answer.answer,
            sources: answer
                .sources
                .into_iter()
                .map(|s| SourceItem {
                    chunk: s.position,
                    score: s.score,
                    content: s.content,
                })
                .collect(),
            chunks: answer.total_chunks,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_from(cli.config.clone()).context("Failed to load config")?;

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.logging.level.parse().unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await?;
        }

        Commands::Ask { pdf, question } => {
            let data = tokio::fs::read(&pdf)
                .await
                .with_context(|| format!("Failed to read {}", pdf.display()))?;

            let state = app::create_state(&config)?;
            let chunks = state
                .indexer()
                .index_document(&data)
                .await
                .with_context(|| format!("Failed to index {}", pdf.display()))?;
            info!("Indexed {} into {} chunks", pdf.display(), chunks);

            let answer = state
                .orchestrator()
                .ask(&question)
                .await
                .context("Failed to answer question")?;

            let output = AskOutput::new(question, answer);
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    println!("Question: {}\n", output.question);
                    println!("{}\n", output.answer);
                    println!("Sources ({} chunks indexed):", output.chunks);
                    for source in &output.sources {
                        println!(
                            "  Chunk {} (score: {:.3}) {}",
                            source.chunk,
                            source.score,
                            truncate(&source.content, 80)
                        );
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&config)
                            .context("Failed to serialize config")?
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "{}",
                        toml::to_string_pretty(&config).context("Failed to serialize config")?
                    );
                }
            },
            ConfigAction::Init => {
                println!("{}", Config::sample_toml());
            }
            ConfigAction::Path => {
                if let Some(path) = Config::config_path() {
                    println!("{}", path.display());
                } else {
                    println!("Could not determine config directory");
                }
            }
        },
    }

    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;
    let state = app::create_state(&config)?;
    let reporter = app::spawn_update_reporter(state.indexer().subscribe());
    let app = router(state, &config.server);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("docqa server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The router owned the last indexer handle, so the reporter sees the channel close.
    let totals = reporter.await.context("Update reporter failed")?;
    info!(
        "Server stopped after {} indexed uploads ({} failed)",
        totals.indexed, totals.failed
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Truncate a string to max chars, adding ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ").replace('\r', "");
    if s.chars().count() <= max_len {
        s
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
