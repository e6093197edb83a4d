use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use ns_core::{Error, ProviderKind, Result};
use serde::Deserialize;

use super::{NewsProvider, RawArticle};

pub const NEWS_API_URL: &str = "https://newsapi.org";
/// Largest `pageSize` the API accepts.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewsApiSource {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    /// First ~200 characters of the body, suffixed with `[+N chars]`.
    pub content: Option<String>,
    pub published_at: Option<String>,
    pub source: Option<NewsApiSource>,
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
    message: Option<String>,
}

/// Decodes an `/v2/everything` body; error payloads become `FetchUnavailable`.
pub(crate) fn parse_response(body: &str) -> Result<Vec<NewsApiArticle>> {
    let response: NewsApiResponse = serde_json::from_str(body)
        .map_err(|e| Error::FetchUnavailable(format!("unreadable NewsAPI response: {}", e)))?;
    if response.status != "ok" {
        return Err(Error::FetchUnavailable(format!(
            "NewsAPI request failed: {}",
            response.message.as_deref().unwrap_or("unknown error")
        )));
    }
    Ok(response.articles)
}

pub struct NewsApiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for NewsApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl NewsApiProvider {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: NEWS_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::NewsApi
    }

    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch(&self, company: &str, limit: usize) -> Result<Vec<RawArticle>> {
        let page_size = limit.saturating_mul(2).clamp(1, MAX_PAGE_SIZE).to_string();
        tracing::info!("🔎 Searching NewsAPI for '{}'", company);
        let body = self
            .client
            .get(format!("{}/v2/everything", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", company),
                ("pageSize", page_size.as_str()),
                ("language", "en"),
                ("sortBy", "relevancy"),
            ])
            .send()
            .await
            .map_err(|e| Error::FetchUnavailable(e.to_string()))?
            .text()
            .await
            .map_err(|e| Error::FetchUnavailable(e.to_string()))?;

        let articles = parse_response(&body)?;
        tracing::info!("📰 NewsAPI returned {} articles for '{}'", articles.len(), company);
        Ok(articles.into_iter().map(RawArticle::NewsApi).collect())
    }
}
