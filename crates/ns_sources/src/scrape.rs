use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::{Html, Selector};
use ns_core::{Error, Result};

use crate::providers::utils::{collapse_whitespace, parse_date};

/// Paragraph containers, most specific first.
const BODY_SELECTORS: [&str; 4] = [
    "article p",
    "div[class*='article-body'] p",
    "div[class*='content'] p",
    "p",
];

/// `(selector, attribute)`; `None` means the element text.
const DATE_SELECTORS: [(&str, Option<&str>); 5] = [
    ("meta[property='article:published_time']", Some("content")),
    ("meta[name='pubdate']", Some("content")),
    ("meta[itemprop='datePublished']", Some("content")),
    ("time[datetime]", Some("datetime")),
    (".date-published", None),
];

/// Paragraphs shorter than this are navigation, captions or bylines.
const MIN_PARAGRAPH_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrapedPage {
    pub title: Option<String>,
    pub text: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Downloads `url` and extracts the article body. Fails with `FetchUnavailable`.
    async fn fetch_page(&self, url: &str) -> Result<ScrapedPage>;
}

#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<ScrapedPage> {
        let html = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::FetchUnavailable(format!("{}: {}", url, e)))?
            .text()
            .await
            .map_err(|e| Error::FetchUnavailable(format!("{}: {}", url, e)))?;

        let page = parse_page(&html);
        if page.text.is_empty() {
            return Err(Error::FetchUnavailable(format!("{}: no article text", url)));
        }
        tracing::debug!("📄 Scraped {} chars from {}", page.text.len(), url);
        Ok(page)
    }
}

pub fn parse_page(html: &str) -> ScrapedPage {
    let document = Html::parse_document(html);
    ScrapedPage {
        title: extract_title(&document),
        text: extract_body(&document),
        published_at: extract_published(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    ["h1", "title"].iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document
            .select(&selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .find(|t| !t.is_empty())
    })
}

fn extract_body(document: &Html) -> String {
    for css in BODY_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        let paragraphs: Vec<String> = document
            .select(&selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
            .collect();
        if !paragraphs.is_empty() {
            return paragraphs.join("\n\n");
        }
    }
    String::new()
}

fn extract_published(document: &Html) -> Option<DateTime<Utc>> {
    DATE_SELECTORS
        .iter()
        .find_map(|(css, attr)| {
            let selector = Selector::parse(css).ok()?;
            document.select(&selector).find_map(|el| {
                let value = match attr {
                    Some(attr) => el.value().attr(attr)?.to_string(),
                    None => el.text().collect::<String>(),
                };
                parse_date(&value)
            })
        })
        .or_else(|| jsonld::extract_date_published(document))
}

/// JSON-LD `NewsArticle` metadata
pub(crate) mod jsonld {
    use chrono::{DateTime, Utc};
    use scraper::{Html, Selector};
    use serde_json::Value;

    use crate::providers::utils::parse_date;

    /// `datePublished` from the first JSON-LD block carrying one; handles arrays and `@graph`.
    pub fn extract_date_published(document: &Html) -> Option<DateTime<Utc>> {
        let selector = Selector::parse("script[type='application/ld+json']").ok()?;
        document.select(&selector).find_map(|script| {
            let json: Value = serde_json::from_str(script.text().collect::<String>().trim()).ok()?;
            find_date(&json)
        })
    }

    fn find_date(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::Array(items) => items.iter().find_map(find_date),
            Value::Object(obj) => obj
                .get("datePublished")
                .and_then(Value::as_str)
                .and_then(parse_date)
                .or_else(|| obj.get("@graph").and_then(find_date)),
            _ => None,
        }
    }
}
