use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::Args;
use reqwest::Client;
use ns_core::{ProviderKind, Result};
use serde::Serialize;

pub mod bing;
pub mod newsapi;

pub use bing::{BingItem, BingNewsProvider};
pub use newsapi::{NewsApiArticle, NewsApiProvider};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A record exactly as one provider delivered it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawArticle {
    NewsApi(NewsApiArticle),
    Bing(BingItem),
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Human-readable name of the service
    fn name(&self) -> &str;

    /// Searches for articles about `company`. `limit` is the number of articles the caller
    /// wants; providers may return more so deduplication has headroom.
    async fn fetch(&self, company: &str, limit: usize) -> Result<Vec<RawArticle>>;
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub id: ProviderKind,
    pub name: String,
    pub configured: bool,
}

/// News retrieval settings, usable directly as CLI flags.
#[derive(Clone, Args)]
pub struct SourcesConfig {
    /// NewsAPI key; without it only Bing News is available
    #[arg(long = "news-api-key", env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,
    /// Articles scored concurrently per report
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,
    /// Scrape every article page, not only those without body text
    #[arg(long)]
    pub always_scrape: bool,
}

impl fmt::Debug for SourcesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourcesConfig")
            .field("news_api_key", &self.news_api_key.as_deref().map(|_| "<redacted>"))
            .field("concurrency", &self.concurrency)
            .field("always_scrape", &self.always_scrape)
            .finish()
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            concurrency: 4,
            always_scrape: false,
        }
    }
}

pub fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Every provider the configuration allows. NewsAPI needs a key; Bing is always present.
pub fn create_providers(config: &SourcesConfig, client: Client) -> Vec<Arc<dyn NewsProvider>> {
    let mut providers: Vec<Arc<dyn NewsProvider>> = Vec::new();
    match config.news_api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            providers.push(Arc::new(NewsApiProvider::new(client.clone(), key)));
        }
        _ => tracing::debug!("NEWS_API_KEY not set, NewsAPI disabled"),
    }
    providers.push(Arc::new(BingNewsProvider::new(client)));
    providers
}

/// Common helpers for provider records
pub(crate) mod utils {
    use chrono::{DateTime, NaiveDate, Utc};
    use scraper::{Html, Node};
    use url::Url;

    const BLOCK_TAGS: [&str; 18] = [
        "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "th",
        "table", "blockquote", "section",
    ];

    fn is_block(node: &Node) -> bool {
        node.as_element()
            .map_or(false, |el| BLOCK_TAGS.contains(&el.name()))
    }

    /// Text content of an HTML fragment with whitespace collapsed. Inline tags join their
    /// text directly; block tags separate it.
    pub fn strip_html(fragment: &str) -> String {
        let document = Html::parse_fragment(fragment);
        let mut text = String::new();
        for node in document.root_element().descendants() {
            if is_block(node.value()) || node.prev_sibling().map_or(false, |prev| is_block(prev.value())) {
                text.push(' ');
            }
            if let Node::Text(chunk) = node.value() {
                text.push_str(chunk);
            }
        }
        collapse_whitespace(&text)
    }

    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Bing wraps article links in `apiclick.aspx?...&url=<target>`; returns the target.
    pub fn unwrap_redirect(link: &str) -> String {
        let link = link.trim();
        let Ok(parsed) = Url::parse(link) else {
            return link.to_string();
        };
        let is_bing = parsed
            .host_str()
            .map_or(false, |host| host.ends_with("bing.com"));
        if !is_bing || !parsed.path().contains("apiclick") {
            return link.to_string();
        }
        parsed
            .query_pairs()
            .find(|(key, _)| key.eq_ignore_ascii_case("url"))
            .map(|(_, target)| target.trim().to_string())
            .filter(|target| target.starts_with("http"))
            .unwrap_or_else(|| link.to_string())
    }

    /// RFC 3339, RFC 2822, or a bare `YYYY-MM-DD` (taken as midnight UTC).
    pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if let Ok(date) = DateTime::parse_from_rfc3339(value) {
            return Some(date.with_timezone(&Utc));
        }
        if let Ok(date) = DateTime::parse_from_rfc2822(value) {
            return Some(date.with_timezone(&Utc));
        }
        let day = value.get(..10).unwrap_or(value);
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::utils;
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_strip_html() {
        assert_eq!(
            utils::strip_html("<p>Acme <b>beats</b>\n estimates</p><br/>"),
            "Acme beats estimates"
        );
        assert_eq!(utils::strip_html("plain text"), "plain text");
    }

    #[test]
    fn test_strip_html_keeps_words_across_inline_tags() {
        assert_eq!(utils::strip_html("Ac<b>me</b> Corp"), "Acme Corp");
        assert_eq!(utils::strip_html("<i>Acme</i><span>'s</span> results"), "Acme's results");
        assert_eq!(utils::strip_html("<p>Profit rose</p><p>Shares fell</p>"), "Profit rose Shares fell");
        assert_eq!(utils::strip_html("<p>Profit rose</p>after hours"), "Profit rose after hours");
        assert_eq!(utils::strip_html("first<br>second"), "first second");
    }

    #[test]
    fn test_unwrap_redirect() {
        let link = "http://www.bing.com/news/apiclick.aspx?ref=FexRss&aid=&tid=abc&url=https%3a%2f%2fwww.reuters.com%2fbusiness%2facme-q3%2f&c=123&mkt=en-us";
        assert_eq!(utils::unwrap_redirect(link), "https://www.reuters.com/business/acme-q3/");
        assert_eq!(
            utils::unwrap_redirect(" https://example.com/story "),
            "https://example.com/story"
        );
        assert_eq!(
            utils::unwrap_redirect("https://www.bing.com/news/apiclick.aspx?ref=FexRss"),
            "https://www.bing.com/news/apiclick.aspx?ref=FexRss"
        );
    }

    #[test]
    fn test_parse_date_formats() {
        let rfc3339 = utils::parse_date("2024-03-05T14:30:00Z").unwrap();
        assert_eq!((rfc3339.day(), rfc3339.hour()), (5, 14));

        let rfc2822 = utils::parse_date("Tue, 05 Mar 2024 14:30:00 GMT").unwrap();
        assert_eq!(rfc2822, rfc3339);

        let day = utils::parse_date("2024-03-05").unwrap();
        assert_eq!((day.day(), day.hour()), (5, 0));

        assert!(utils::parse_date("last Tuesday").is_none());
        assert!(utils::parse_date("").is_none());
    }

    #[test]
    fn test_create_providers_requires_news_api_key() {
        let client = Client::new();
        let bing_only = create_providers(&SourcesConfig::default(), client.clone());
        assert_eq!(bing_only.len(), 1);
        assert_eq!(bing_only[0].kind(), ProviderKind::Bing);

        let config = SourcesConfig {
            news_api_key: Some("key".to_string()),
            ..SourcesConfig::default()
        };
        let kinds: Vec<ProviderKind> = create_providers(&config, client)
            .iter()
            .map(|p| p.kind())
            .collect();
        assert_eq!(kinds, vec![ProviderKind::NewsApi, ProviderKind::Bing]);
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = SourcesConfig {
            news_api_key: Some("secret-key".to_string()),
            ..SourcesConfig::default()
        };
        assert!(!format!("{:?}", config).contains("secret-key"));
    }
}
