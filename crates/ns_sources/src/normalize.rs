use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures::{future, stream, StreamExt};
use ns_core::{Article, ProviderKind};
use serde::{Deserialize, Serialize};

use crate::mention::CompanyMatcher;
use crate::providers::utils::{collapse_whitespace, parse_date, strip_html, unwrap_redirect};
use crate::providers::{BingItem, NewsApiArticle, RawArticle};
use crate::scrape::{PageFetcher, ScrapedPage};

pub const DEFAULT_LIMIT: usize = 10;
pub const UNTITLED: &str = "Untitled";
/// Title NewsAPI puts on articles pulled by the publisher.
const REMOVED_MARKER: &str = "[Removed]";
const SCRAPE_CONCURRENCY: usize = 4;

/// Inclusive publish-date window. Articles with an unknown date always pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateWindow {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DateWindow {
    pub fn contains(&self, published_at: Option<DateTime<Utc>>) -> bool {
        let Some(date) = published_at.map(|d| d.date_naive()) else {
            return true;
        };
        self.since.map_or(true, |since| date >= since) && self.until.map_or(true, |until| date <= until)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    /// Keep only articles that mention this company; `None` keeps everything.
    pub company: Option<String>,
    pub window: DateWindow,
    pub limit: usize,
    /// Scrape every page and prefer the scraped body when it is longer.
    pub always_scrape: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            company: None,
            window: DateWindow::default(),
            limit: DEFAULT_LIMIT,
            always_scrape: false,
        }
    }
}

/// Turns provider records into `Article`s. Never fails; bad records are dropped or degraded.
pub struct Normalizer {
    fetcher: Arc<dyn PageFetcher>,
}

impl Normalizer {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn normalize(&self, raws: Vec<RawArticle>, options: &NormalizeOptions) -> Vec<Article> {
        let received = raws.len();
        let mut seen = HashSet::new();
        let candidates: Vec<Article> = raws
            .into_iter()
            .filter_map(convert)
            .filter(|article| seen.insert(article.url.clone()))
            .filter(|article| options.window.contains(article.published_at))
            .collect();
        let unique = candidates.len();
        let matcher = options.company.as_deref().and_then(CompanyMatcher::new);

        let articles: Vec<Article> = stream::iter(candidates)
            .map(|article| self.complete(article, options.always_scrape))
            .buffered(SCRAPE_CONCURRENCY)
            .filter(|article| future::ready(options.window.contains(article.published_at)))
            .filter(|article| {
                let on_topic = matcher.as_ref().map_or(true, |m| m.mentioned_in(article));
                if !on_topic {
                    tracing::debug!("Dropping off-topic article {}", article.url);
                }
                future::ready(on_topic)
            })
            .take(options.limit)
            .collect()
            .await;

        tracing::info!(
            "🧹 Normalized {} records into {} articles ({} after dedupe and date filter)",
            received,
            articles.len(),
            unique
        );
        articles
    }

    /// Fills a missing body, and a missing date, from the article page.
    async fn complete(&self, mut article: Article, always_scrape: bool) -> Article {
        if article.has_text() && !always_scrape {
            return article;
        }
        match self.fetcher.fetch_page(&article.url).await {
            Ok(page) => merge_page(&mut article, page),
            Err(e) => tracing::warn!("⚠️ Could not scrape {}: {}", article.url, e),
        }
        article
    }
}

fn merge_page(article: &mut Article, page: ScrapedPage) {
    if page.text.chars().count() > article.raw_text.chars().count() {
        article.raw_text = page.text;
    }
    if article.published_at.is_none() {
        article.published_at = page.published_at;
    }
    if article.title == UNTITLED {
        if let Some(title) = page.title {
            article.title = title;
        }
    }
}

fn convert(raw: RawArticle) -> Option<Article> {
    match raw {
        RawArticle::NewsApi(record) => from_news_api(record),
        RawArticle::Bing(item) => from_bing(item),
    }
}

fn clean_title(title: Option<String>) -> String {
    title
        .map(|t| collapse_whitespace(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn clean_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string())
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
}

/// Drops NewsAPI's `… [+1234 chars]` truncation suffix.
fn strip_char_count(content: &str) -> &str {
    match content.rfind(" [+") {
        Some(idx) if content.ends_with(" chars]") => content[..idx].trim_end_matches('…').trim_end(),
        _ => content,
    }
}

fn from_news_api(record: NewsApiArticle) -> Option<Article> {
    if record.title.as_deref() == Some(REMOVED_MARKER) {
        return None;
    }
    let url = clean_url(record.url)?;
    let content = record
        .content
        .as_deref()
        .map(|c| strip_html(strip_char_count(c)))
        .unwrap_or_default();
    let description = record.description.as_deref().map(strip_html).unwrap_or_default();
    let raw_text = if content.len() >= description.len() { content } else { description };

    Some(Article {
        url,
        title: clean_title(record.title),
        published_at: record.published_at.as_deref().and_then(parse_date),
        raw_text,
        source: record.source.and_then(|s| s.name).filter(|n| !n.trim().is_empty()),
        provider: ProviderKind::NewsApi,
    })
}

fn from_bing(item: BingItem) -> Option<Article> {
    let url = clean_url(item.link.map(|link| unwrap_redirect(&link)))?;
    let source = url::Url::parse(&url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()));

    Some(Article {
        url,
        title: clean_title(item.title),
        published_at: item.published,
        raw_text: item.description.as_deref().map(strip_html).unwrap_or_default(),
        source,
        provider: ProviderKind::Bing,
    })
}
