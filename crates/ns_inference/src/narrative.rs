use std::fmt;
use std::sync::Arc;

use ns_core::{
    AggregateStats, CompletionRequest, Narrative, NarrativeOrigin, ScoreOutcome, SentimentResult,
    TextModel,
};

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that provides concise and accurate summaries.";
const MAX_NARRATIVE_TOKENS: u32 = 500;
const EXTRACTIVE_SUMMARY_LIMIT: usize = 5;

enum Strategy {
    Model(Arc<dyn TextModel>),
    Extractive,
}

/// Merges per-article summaries and the aggregate into one paragraph.
pub struct NarrativeMerger {
    strategy: Strategy,
}

impl fmt::Debug for NarrativeMerger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match &self.strategy {
            Strategy::Model(model) => model.name().to_string(),
            Strategy::Extractive => "extractive".to_string(),
        };
        f.debug_struct("NarrativeMerger").field("strategy", &strategy).finish()
    }
}

impl NarrativeMerger {
    pub fn with_model(model: Arc<dyn TextModel>) -> Self {
        Self {
            strategy: Strategy::Model(model),
        }
    }

    pub fn extractive() -> Self {
        Self {
            strategy: Strategy::Extractive,
        }
    }

    pub async fn merge(
        &self,
        company: &str,
        outcomes: &[ScoreOutcome],
        aggregate: Option<&AggregateStats>,
    ) -> Narrative {
        let scored: Vec<&SentimentResult> = outcomes.iter().filter_map(ScoreOutcome::as_scored).collect();
        let aggregate = match aggregate {
            Some(aggregate) if !scored.is_empty() => aggregate,
            _ => {
                tracing::info!("📭 No scored articles for {}, skipping narrative", company);
                return Narrative::insufficient_data();
            }
        };

        match &self.strategy {
            Strategy::Extractive => Narrative {
                text: extractive_paragraph(company, &scored, aggregate),
                origin: NarrativeOrigin::Extractive,
            },
            Strategy::Model(model) => {
                let request = CompletionRequest::new(SYSTEM_PROMPT, build_prompt(company, &scored, aggregate))
                    .max_tokens(MAX_NARRATIVE_TOKENS);
                match model.complete(&request).await {
                    Ok(text) if !text.trim().is_empty() => Narrative {
                        text: text.trim().to_string(),
                        origin: NarrativeOrigin::Generated,
                    },
                    Ok(_) => {
                        tracing::warn!("⚠️ {} returned an empty narrative for {}", model.name(), company);
                        Narrative::unavailable()
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Narrative unavailable for {}: {}", company, e);
                        Narrative::unavailable()
                    }
                }
            }
        }
    }
}

pub(crate) fn build_prompt(company: &str, scored: &[&SentimentResult], aggregate: &AggregateStats) -> String {
    let mut prompt = format!(
        "You are a financial analyst. Provide a comprehensive summary of the following news articles about {}.\n\
         Consider the sentiment of each article and highlight key points, trends, and any significant events mentioned.\n\
         Focus on facts and avoid speculation. Keep the summary under 200 words and write it as one paragraph.\n\n\
         Articles:\n",
        company
    );
    for (i, result) in scored.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. [{} {:+.2}] {}\n",
            i + 1,
            result.label,
            result.score,
            result.summary.trim()
        ));
    }
    prompt.push_str(&format!(
        "\nOverall sentiment: {} (average score {:+.2} across {} articles)\n",
        aggregate.overall_label, aggregate.overall_score, aggregate.scored
    ));
    prompt
}

fn first_sentence(summary: &str) -> &str {
    let summary = summary.trim();
    match summary.find(|c| c == '.' || c == '!' || c == '?') {
        Some(end) => &summary[..=end],
        None => summary,
    }
}

fn extractive_paragraph(company: &str, scored: &[&SentimentResult], aggregate: &AggregateStats) -> String {
    let dist = &aggregate.distribution;
    let mut paragraph = format!(
        "Coverage of {} across {} scored articles is {} overall (average score {:+.2}; {}% positive, {}% negative, {}% neutral).",
        company,
        aggregate.scored,
        aggregate.overall_label.to_string().to_lowercase(),
        aggregate.overall_score,
        dist.positive,
        dist.negative,
        dist.neutral
    );
    for result in scored.iter().take(EXTRACTIVE_SUMMARY_LIMIT) {
        let sentence = first_sentence(&result.summary);
        if sentence.is_empty() {
            continue;
        }
        paragraph.push(' ');
        paragraph.push_str(sentence);
        if !sentence.ends_with(|c| c == '.' || c == '!' || c == '?') {
            paragraph.push('.');
        }
    }
    if !aggregate.topic_keywords.is_empty() {
        let topics: Vec<&str> = aggregate.topic_keywords.iter().take(5).map(String::as_str).collect();
        paragraph.push_str(&format!(" Recurring topics: {}.", topics.join(", ")));
    }
    paragraph
}
