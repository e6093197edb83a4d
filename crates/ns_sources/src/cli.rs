use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use ns_core::{ProviderKind, Result};

use crate::normalize::{DateWindow, NormalizeOptions, Normalizer, DEFAULT_LIMIT};
use crate::providers::{self, SourcesConfig};
use crate::scrape::HttpPageFetcher;

#[derive(Args, Debug)]
pub struct SourcesArgs {
    #[command(subcommand)]
    pub command: SourcesCommands,
}

#[derive(Subcommand, Debug)]
pub enum SourcesCommands {
    /// List news sources and whether they are configured
    List,
    /// Fetch and normalize articles without scoring them
    Fetch {
        /// Company to search for
        company: String,
        /// News source: newsapi or bing
        #[arg(long, short, default_value = "bing")]
        source: ProviderKind,
        #[arg(long, short, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
        /// Oldest publish date to keep (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,
        /// Newest publish date to keep (YYYY-MM-DD)
        #[arg(long)]
        until: Option<NaiveDate>,
    },
}

pub async fn handle_command(args: SourcesArgs, config: &SourcesConfig) -> Result<()> {
    let client = providers::http_client()?;
    let available = providers::create_providers(config, client.clone());

    match args.command {
        SourcesCommands::List => {
            println!("Available news sources:");
            for kind in ProviderKind::ALL {
                match available.iter().find(|p| p.kind() == kind) {
                    Some(provider) => println!("  ✅ {:<8} {}", kind, provider.name()),
                    None => println!("  ❌ {:<8} not configured (set NEWS_API_KEY)", kind),
                }
            }
        }
        SourcesCommands::Fetch {
            company,
            source,
            limit,
            since,
            until,
        } => {
            let provider = available
                .iter()
                .find(|p| p.kind() == source)
                .ok_or_else(|| ns_core::Error::Config(format!("news source '{}' is not configured", source)))?;
            let raws = provider.fetch(&company, limit).await?;
            let normalizer = Normalizer::new(Arc::new(HttpPageFetcher::new(client)));
            let options = NormalizeOptions {
                company: Some(company.clone()),
                window: DateWindow { since, until },
                limit,
                always_scrape: config.always_scrape,
            };
            let articles = normalizer.normalize(raws, &options).await;

            println!("Found {} articles", articles.len());
            for article in articles {
                let date = article
                    .published_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "unknown date".to_string());
                let marker = if article.has_text() { "📄" } else { "∅" };
                println!("{} [{}] {} - {}", marker, date, article.title, article.url);
            }
        }
    }
    Ok(())
}
