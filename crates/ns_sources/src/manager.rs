use std::sync::Arc;

use futures::future::join_all;
use ns_core::{
    aggregate, Article, Error, ProviderKind, Report, Result, ScoreOutcome, SentimentResult,
    SentimentScorer, UnscoredReason,
};
use ns_inference::{NarrativeMerger, Speaker};
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::logging::Logger;
use crate::normalize::{DateWindow, NormalizeOptions, Normalizer, DEFAULT_LIMIT};
use crate::providers::{self, NewsProvider, SourceInfo, SourcesConfig};
use crate::scrape::{HttpPageFetcher, PageFetcher};

pub const DEFAULT_CONCURRENCY: usize = 4;
/// Upper bound on articles per report.
pub const MAX_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportRequest {
    pub company: String,
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub window: DateWindow,
    /// Target language of the spoken summary; `None` skips speech.
    #[serde(default)]
    pub language: Option<String>,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Bing
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl ReportRequest {
    pub fn new(company: impl Into<String>, provider: ProviderKind) -> Self {
        Self {
            company: company.into(),
            provider,
            limit: DEFAULT_LIMIT,
            window: DateWindow::default(),
            language: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.company.trim().is_empty() {
            return Err(Error::InvalidRequest("company name is empty".to_string()));
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(Error::InvalidRequest(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        if let (Some(since), Some(until)) = (self.window.since, self.window.until) {
            if since > until {
                return Err(Error::InvalidRequest(format!(
                    "since ({}) is after until ({})",
                    since, until
                )));
            }
        }
        Ok(())
    }
}

/// Runs the whole pipeline for one request: fetch, normalize, score, aggregate, narrate, speak.
pub struct ReportManager {
    providers: Vec<Arc<dyn NewsProvider>>,
    normalizer: Normalizer,
    scorer: Arc<dyn SentimentScorer>,
    narrative: NarrativeMerger,
    speaker: Option<Speaker>,
    concurrency: usize,
    always_scrape: bool,
}

impl ReportManager {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        scorer: Arc<dyn SentimentScorer>,
        narrative: NarrativeMerger,
    ) -> Self {
        Self {
            providers: Vec::new(),
            normalizer: Normalizer::new(fetcher),
            scorer,
            narrative,
            speaker: None,
            concurrency: DEFAULT_CONCURRENCY,
            always_scrape: false,
        }
    }

    /// Production wiring: HTTP providers and scraper, the configured model, Google speech.
    pub fn from_config(sources: &SourcesConfig, inference: &ns_inference::Config) -> Result<Self> {
        let client = providers::http_client()?;
        let ns_inference::Inference { scorer, narrative } = ns_inference::create_inference(inference)?;
        let mut manager = Self::new(Arc::new(HttpPageFetcher::new(client.clone())), scorer, narrative)
            .with_speaker(Speaker::google()?)
            .with_concurrency(sources.concurrency)
            .with_always_scrape(sources.always_scrape);
        for provider in providers::create_providers(sources, client) {
            manager.add_provider(provider);
        }
        Ok(manager)
    }

    pub fn add_provider(&mut self, provider: Arc<dyn NewsProvider>) {
        self.providers.retain(|p| p.kind() != provider.kind());
        self.providers.push(provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn NewsProvider>) -> Self {
        self.add_provider(provider);
        self
    }

    pub fn with_speaker(mut self, speaker: Speaker) -> Self {
        self.speaker = Some(speaker);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_always_scrape(mut self, always_scrape: bool) -> Self {
        self.always_scrape = always_scrape;
        self
    }

    pub fn provider(&self, kind: ProviderKind) -> Result<Arc<dyn NewsProvider>> {
        self.providers
            .iter()
            .find(|p| p.kind() == kind)
            .cloned()
            .ok_or_else(|| Error::Config(format!("news source '{}' is not configured", kind)))
    }

    /// All known sources, configured or not.
    pub fn sources(&self) -> Vec<SourceInfo> {
        ProviderKind::ALL
            .iter()
            .map(|kind| match self.provider(*kind) {
                Ok(provider) => SourceInfo {
                    id: *kind,
                    name: provider.name().to_string(),
                    configured: true,
                },
                Err(_) => SourceInfo {
                    id: *kind,
                    name: kind.to_string(),
                    configured: false,
                },
            })
            .collect()
    }

    /// Fetches and normalizes articles without scoring them.
    pub async fn fetch_articles(&self, request: &ReportRequest) -> Result<Vec<Article>> {
        request.validate()?;
        let provider = self.provider(request.provider)?;
        let company = request.company.trim();
        let logger = Logger::new()
            .with_prefix(format!("[{}]", company))
            .with_prefix(format!("[{}]", provider.kind()));

        let raws = match provider.fetch(company, request.limit).await {
            Ok(raws) => raws,
            Err(e) => {
                logger.warn(&format!("⚠️ Fetch failed, continuing with no articles: {}", e));
                Vec::new()
            }
        };
        let options = NormalizeOptions {
            company: Some(company.to_string()),
            window: request.window,
            limit: request.limit,
            always_scrape: self.always_scrape,
        };
        let articles = self.normalizer.normalize(raws, &options).await;
        logger.info(&format!("📰 {} articles ready for scoring", articles.len()));
        Ok(articles)
    }

    pub async fn generate(&self, request: &ReportRequest) -> Result<Report> {
        let articles = self.fetch_articles(request).await?;
        let company = request.company.trim();
        let logger = Logger::new().with_prefix(format!("[{}]", company));

        let outcomes = self.score_all(company, &articles).await;
        let scored = outcomes.iter().filter(|o| o.as_scored().is_some()).count();
        logger.info(&format!("🎯 Scored {}/{} articles", scored, outcomes.len()));

        let stats = match aggregate(&outcomes) {
            Ok(stats) => Some(stats),
            Err(Error::NoData) => {
                logger.warn("📭 No article could be scored");
                None
            }
            Err(e) => return Err(e),
        };
        let narrative = self.narrative.merge(company, &outcomes, stats.as_ref()).await;
        let report = Report::assemble(company, request.provider, articles, outcomes, stats, narrative)?;

        let Some(language) = request.language.as_deref() else {
            return Ok(report);
        };
        match &self.speaker {
            Some(speaker) => {
                let spoken = speaker.speak(&report.narrative.text, language).await;
                Ok(report.with_spoken(spoken))
            }
            None => {
                logger.debug("Speech requested but no speaker is configured");
                Ok(report.with_spoken(ns_core::SpokenSummary {
                    language: language.to_lowercase(),
                    translated_text: None,
                    audio: None,
                    issues: vec!["speech is not configured".to_string()],
                }))
            }
        }
    }

    /// Scores every article with at most `concurrency` calls in flight. Outcome `i` is for article `i`.
    async fn score_all(&self, company: &str, articles: &[Article]) -> Vec<ScoreOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let tasks = articles.iter().map(|article| {
            let semaphore = semaphore.clone();
            async move {
                if !article.has_text() {
                    return ScoreOutcome::unscored(article, UnscoredReason::EmptyText);
                }
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return ScoreOutcome::unscored(
                            article,
                            UnscoredReason::ScoringUnavailable(e.to_string()),
                        )
                    }
                };
                match self.scorer.score(company, &article.scoring_text()).await {
                    Ok(score) => ScoreOutcome::Scored(SentimentResult::for_article(article, score)),
                    Err(e) => {
                        tracing::warn!("⚠️ Could not score {}: {}", article.url, e);
                        ScoreOutcome::unscored(article, UnscoredReason::ScoringUnavailable(e.to_string()))
                    }
                }
            }
        });
        join_all(tasks).await
    }
}
