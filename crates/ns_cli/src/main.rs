use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use ns_core::ProviderKind;
use ns_sources::{DateWindow, ReportManager, ReportRequest, SourcesArgs, SourcesConfig};
use ns_web::AppState;
use tracing::info;

mod render;

#[derive(Parser, Debug)]
#[command(author, version, about = "Company news sentiment reports", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    inference: ns_inference::Config,
    #[command(flatten)]
    sources: SourcesConfig,
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Build a sentiment report for a company
    Report {
        company: String,
        /// News source: newsapi or bing
        #[arg(long, short, default_value = "bing")]
        source: ProviderKind,
        #[arg(long, short, default_value_t = ns_sources::normalize::DEFAULT_LIMIT)]
        limit: usize,
        /// Oldest publish date to keep (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,
        /// Newest publish date to keep (YYYY-MM-DD)
        #[arg(long)]
        until: Option<NaiveDate>,
        /// Translate and speak the summary in this language (e.g. hi)
        #[arg(long)]
        language: Option<String>,
        /// Write the spoken summary MP3 here
        #[arg(long, requires = "language")]
        audio_out: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
    /// Inspect news sources
    Sources(SourcesArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    ns_sources::init_logging(&cli.log_level);

    match cli.command {
        Commands::Report {
            company,
            source,
            limit,
            since,
            until,
            language,
            audio_out,
            json,
        } => {
            let manager = ReportManager::from_config(&cli.sources, &cli.inference)?;
            info!("🧠 Using {} backend", cli.inference.backend);
            let mut request = ReportRequest::new(company, source)
                .with_limit(limit)
                .with_window(DateWindow { since, until });
            if let Some(language) = language {
                request = request.with_language(language);
            }

            let report = manager.generate(&request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::render_text(&report));
            }

            if let Some(path) = audio_out {
                match report.audio() {
                    Some(clip) => {
                        tokio::fs::write(&path, &clip.bytes)
                            .await
                            .with_context(|| format!("writing audio to {}", path.display()))?;
                        info!("💾 Audio summary saved to {}", path.display());
                    }
                    None => eprintln!("No audio was produced; {} not written", path.display()),
                }
            }
        }
        Commands::Serve { addr } => {
            let manager = ReportManager::from_config(&cli.sources, &cli.inference)?;
            ns_web::serve(addr, AppState::new(manager)).await?;
        }
        Commands::Sources(args) => {
            ns_sources::handle_command(args, &cli.sources).await?;
        }
    }
    Ok(())
}
