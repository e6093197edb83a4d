use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use reqwest::Client;
use ns_core::{Error, ProviderKind, Result};

use super::{NewsProvider, RawArticle};

pub const BING_NEWS_URL: &str = "https://www.bing.com";

/// One `<item>` of the Bing News RSS feed.
#[derive(Debug, Clone, PartialEq)]
pub struct BingItem {
    pub title: Option<String>,
    /// Usually a `bing.com/news/apiclick.aspx` redirect.
    pub link: Option<String>,
    /// HTML snippet.
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

pub(crate) fn parse_feed(body: &[u8]) -> Result<Vec<BingItem>> {
    let feed = parser::parse(body)
        .map_err(|e| Error::FetchUnavailable(format!("unreadable Bing feed: {}", e)))?;
    Ok(feed
        .entries
        .into_iter()
        .map(|entry| BingItem {
            title: entry.title.map(|t| t.content),
            link: entry.links.first().map(|link| link.href.clone()),
            description: entry.summary.map(|t| t.content),
            published: entry.published,
        })
        .collect())
}

#[derive(Debug)]
pub struct BingNewsProvider {
    client: Client,
    base_url: String,
}

impl BingNewsProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: BING_NEWS_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl NewsProvider for BingNewsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Bing
    }

    fn name(&self) -> &str {
        "Bing News"
    }

    async fn fetch(&self, company: &str, _limit: usize) -> Result<Vec<RawArticle>> {
        tracing::info!("🔎 Searching Bing News for '{}'", company);
        let body = self
            .client
            .get(format!("{}/news/search", self.base_url))
            .query(&[("q", company), ("format", "rss")])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::FetchUnavailable(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| Error::FetchUnavailable(e.to_string()))?;

        let items = parse_feed(&body)?;
        tracing::info!("📰 Bing News returned {} items for '{}'", items.len(), company);
        Ok(items.into_iter().map(RawArticle::Bing).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    use crate::test_support::serve;

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0" xmlns:News="https://www.bing.com/news/search?q=Acme&amp;format=rss">
  <channel>
    <title>Acme - BingNews</title>
    <link>https://www.bing.com/news/search?q=Acme&amp;format=rss</link>
    <description>Search results</description>
    <item>
      <title>Acme beats third-quarter estimates</title>
      <link>http://www.bing.com/news/apiclick.aspx?ref=FexRss&amp;aid=&amp;tid=1&amp;url=https%3a%2f%2fwww.reuters.com%2fbusiness%2facme-q3%2f&amp;c=1&amp;mkt=en-us</link>
      <description>Acme Corp &lt;b&gt;reported&lt;/b&gt; record revenue.</description>
      <pubDate>Tue, 05 Mar 2024 14:30:00 GMT</pubDate>
      <News:Source>Reuters</News:Source>
    </item>
    <item>
      <title>Acme recalls widgets</title>
      <link>https://example.com/acme-recall</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed() {
        let items = parse_feed(FIXTURE.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("Acme beats third-quarter estimates"));
        assert!(items[0].link.as_deref().unwrap().contains("apiclick.aspx"));
        assert!(items[0].description.as_deref().unwrap().contains("record revenue"));
        assert_eq!(items[0].published.map(|d| d.day()), Some(5));
        assert!(items[1].description.is_none());
        assert!(items[1].published.is_none());
    }

    #[test]
    fn test_parse_feed_rejects_html() {
        assert!(matches!(
            parse_feed(b"<html><body>blocked</body></html>"),
            Err(Error::FetchUnavailable(_))
        ));
    }

    async fn search(
        State(seen): State<Seen>,
        Query(query): Query<HashMap<String, String>>,
    ) -> (StatusCode, String) {
        let blocked = query.get("q").map_or(false, |q| q == "blocked");
        seen.lock().unwrap().push(query);
        if blocked {
            (StatusCode::SERVICE_UNAVAILABLE, String::new())
        } else {
            (StatusCode::OK, FIXTURE.to_string())
        }
    }

    #[tokio::test]
    async fn test_fetch_rss_search() {
        let seen = Seen::default();
        let router = Router::new().route("/news/search", get(search)).with_state(seen.clone());
        let provider = BingNewsProvider::new(Client::new()).with_base_url(serve(router).await);

        let raws = provider.fetch("Acme Corp", 10).await.unwrap();
        assert_eq!(raws.len(), 2);
        assert!(matches!(&raws[1], RawArticle::Bing(item) if item.title.as_deref() == Some("Acme recalls widgets")));

        assert!(matches!(
            provider.fetch("blocked", 10).await,
            Err(Error::FetchUnavailable(_))
        ));

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["q"], "Acme Corp");
        assert_eq!(seen[0]["format"], "rss");
    }
}
