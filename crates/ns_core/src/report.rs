use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateStats;
use crate::types::{Article, ProviderKind, ScoreOutcome};
use crate::{Error, Result};

pub const INSUFFICIENT_DATA_MESSAGE: &str = "insufficient data";
pub const NARRATIVE_UNAVAILABLE_MESSAGE: &str = "Overall summary unavailable.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeOrigin {
    /// Written by the text model.
    Generated,
    /// Stitched together locally from the per-article summaries.
    Extractive,
    /// Nothing was scored, no model was asked.
    InsufficientData,
    /// The text model failed; the stock message is shown.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub text: String,
    pub origin: NarrativeOrigin,
}

impl Narrative {
    pub fn insufficient_data() -> Self {
        Self {
            text: INSUFFICIENT_DATA_MESSAGE.to_string(),
            origin: NarrativeOrigin::InsufficientData,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            text: NARRATIVE_UNAVAILABLE_MESSAGE.to_string(),
            origin: NarrativeOrigin::Unavailable,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(
            self.origin,
            NarrativeOrigin::InsufficientData | NarrativeOrigin::Unavailable
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl AudioClip {
    pub fn mp3(bytes: Vec<u8>) -> Self {
        Self {
            mime_type: "audio/mpeg".to_string(),
            bytes,
        }
    }
}

/// Translated and spoken form of the narrative. Every part is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpokenSummary {
    pub language: String,
    pub translated_text: Option<String>,
    pub audio: Option<AudioClip>,
    /// Human-readable notes about the parts that could not be produced.
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub article: Article,
    pub sentiment: ScoreOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub company: String,
    pub provider: ProviderKind,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<ReportEntry>,
    /// `None` when no article could be scored.
    pub aggregate: Option<AggregateStats>,
    pub narrative: Narrative,
    pub spoken: Option<SpokenSummary>,
}

impl Report {
    /// Pairs articles with their outcomes. Lengths and URLs must line up.
    pub fn assemble(
        company: impl Into<String>,
        provider: ProviderKind,
        articles: Vec<Article>,
        outcomes: Vec<ScoreOutcome>,
        aggregate: Option<AggregateStats>,
        narrative: Narrative,
    ) -> Result<Self> {
        if articles.len() != outcomes.len() {
            return Err(Error::Invariant(format!(
                "{} articles but {} sentiment outcomes",
                articles.len(),
                outcomes.len()
            )));
        }

        let entries = articles
            .into_iter()
            .zip(outcomes)
            .enumerate()
            .map(|(i, (article, sentiment))| {
                if article.url != sentiment.article_url() {
                    return Err(Error::Invariant(format!(
                        "entry {} pairs article {} with outcome for {}",
                        i,
                        article.url,
                        sentiment.article_url()
                    )));
                }
                Ok(ReportEntry { article, sentiment })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            company: company.into(),
            provider,
            generated_at: Utc::now(),
            entries,
            aggregate,
            narrative,
            spoken: None,
        })
    }

    pub fn with_spoken(self, spoken: SpokenSummary) -> Self {
        Self {
            spoken: Some(spoken),
            ..self
        }
    }

    pub fn overall_score(&self) -> Option<f64> {
        self.aggregate.as_ref().map(|a| a.overall_score)
    }

    pub fn unscored_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.sentiment.as_scored().is_none())
            .count()
    }

    pub fn audio(&self) -> Option<&AudioClip> {
        self.spoken.as_ref().and_then(|s| s.audio.as_ref())
    }
}
