use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Scores strictly above this are `Positive`.
pub const POSITIVE_THRESHOLD: f64 = 0.1;
/// Scores strictly below this are `Negative`.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Body text. Empty when neither the provider nor the page scrape produced any.
    pub raw_text: String,
    /// Outlet name, when the provider reports one.
    pub source: Option<String>,
    pub provider: ProviderKind,
}

impl Article {
    pub fn has_text(&self) -> bool {
        !self.raw_text.trim().is_empty()
    }

    /// Text submitted for scoring: the headline followed by the body.
    pub fn scoring_text(&self) -> String {
        format!("{}\n\n{}", self.title.trim(), self.raw_text.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// NewsAPI `/v2/everything`.
    NewsApi,
    /// Bing News RSS search.
    Bing,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::NewsApi, ProviderKind::Bing];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::NewsApi => "newsapi",
            ProviderKind::Bing => "bing",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newsapi" | "news-api" => Ok(ProviderKind::NewsApi),
            "bing" | "bing-news" => Ok(ProviderKind::Bing),
            other => Err(Error::Config(format!(
                "Unknown news source '{}'. Expected one of: newsapi, bing",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// The only way a label is produced, for single articles and aggregates alike.
    pub fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score < NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "📈",
            SentimentLabel::Negative => "📉",
            SentimentLabel::Neutral => "➖",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        };
        f.write_str(name)
    }
}

/// What a scorer returns for one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub score: f64,
    pub label: SentimentLabel,
    pub summary: String,
    pub keywords: Vec<String>,
}

impl SentimentScore {
    /// Builds a score, deriving the label. Fails when `score` is outside [-1, 1].
    pub fn new(score: f64, summary: impl Into<String>, keywords: Vec<String>) -> crate::Result<Self> {
        if !score.is_finite() || !(-1.0..=1.0).contains(&score) {
            return Err(Error::ScoringUnavailable(format!(
                "score {} outside [-1, 1]",
                score
            )));
        }
        Ok(Self {
            score,
            label: SentimentLabel::from_score(score),
            summary: summary.into(),
            keywords,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Back-reference to the scored article.
    pub article_url: String,
    pub score: f64,
    pub label: SentimentLabel,
    pub summary: String,
    pub keywords: Vec<String>,
}

impl SentimentResult {
    pub fn for_article(article: &Article, score: SentimentScore) -> Self {
        Self {
            article_url: article.url.clone(),
            score: score.score,
            label: score.label,
            summary: score.summary,
            keywords: score.keywords,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnscoredReason {
    /// No text to submit: the provider had no body and the page scrape failed.
    EmptyText,
    ScoringUnavailable(String),
}

impl fmt::Display for UnscoredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnscoredReason::EmptyText => f.write_str("no article text"),
            UnscoredReason::ScoringUnavailable(msg) => write!(f, "scoring unavailable: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Scored(SentimentResult),
    Unscored {
        article_url: String,
        reason: UnscoredReason,
    },
}

impl ScoreOutcome {
    pub fn unscored(article: &Article, reason: UnscoredReason) -> Self {
        ScoreOutcome::Unscored {
            article_url: article.url.clone(),
            reason,
        }
    }

    pub fn article_url(&self) -> &str {
        match self {
            ScoreOutcome::Scored(result) => &result.article_url,
            ScoreOutcome::Unscored { article_url, .. } => article_url,
        }
    }

    pub fn as_scored(&self) -> Option<&SentimentResult> {
        match self {
            ScoreOutcome::Scored(result) => Some(result),
            ScoreOutcome::Unscored { .. } => None,
        }
    }
}
