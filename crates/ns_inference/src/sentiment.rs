use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use ns_core::{CompletionRequest, Error, Result, SentimentScore, SentimentScorer, TextModel};

/// Longest body, in characters, submitted for scoring.
pub const MAX_SCORING_CHARS: usize = 2000;
const TRUNCATION_MARKER: &str = "... [truncated]";

const SYSTEM_PROMPT: &str = r#"You are a financial news analyst. Return ONLY valid JSON with this exact format:

{
    "Score": 0.75,
    "Sentiment": "Positive",
    "Summary": "Brief summary here",
    "Keywords": ["keyword1", "keyword2", "keyword3"]
}

Rules:
- Score is a number between -1.0 and 1.0, no quotes, no plus sign.
- Sentiment is exactly "Positive", "Neutral" or "Negative".
- Summary is one or two sentences about the article's impact on the company.
- Keywords lists up to five short topics.
- No trailing commas, no text before or after the JSON.

Scoring guide, judged by impact on the COMPANY:
- 0.8 to 1.0: major breakthrough or strong advantage
- 0.4 to 0.7: innovation, problem-solving, market strength
- 0.1 to 0.3: minor positive developments
- -0.1 to 0.1: no clear company impact
- -0.1 to -0.3: minor concerns
- -0.4 to -0.7: significant problems
- -0.8 to -1.0: major failures or serious issues"#;

/// Cuts `text` to `MAX_SCORING_CHARS` characters, marking the cut.
pub fn truncate_for_scoring(text: &str) -> String {
    match text.char_indices().nth(MAX_SCORING_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
struct ScoreReply {
    #[serde(rename = "Score")]
    score: Number,
    #[serde(rename = "Sentiment", default)]
    sentiment: Option<String>,
    #[serde(rename = "Summary")]
    summary: String,
    #[serde(rename = "Keywords")]
    keywords: Vec<String>,
}

/// Parses the model's JSON reply. The label is recomputed from the score.
pub fn parse_score_reply(reply: &str) -> Result<SentimentScore> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => return Err(Error::ScoringUnavailable("reply contains no JSON object".to_string())),
    };

    let parsed: ScoreReply = serde_json::from_str(json)
        .map_err(|e| Error::ScoringUnavailable(format!("malformed scoring reply: {}", e)))?;
    let score = match parsed.score {
        Number::Float(value) => value,
        Number::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::ScoringUnavailable(format!("non-numeric score '{}'", text)))?,
    };

    let result = SentimentScore::new(
        score,
        parsed.summary.trim(),
        parsed
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
    )?;
    if let Some(claimed) = parsed.sentiment {
        if !claimed.eq_ignore_ascii_case(&result.label.to_string()) {
            tracing::debug!("Model said {} for score {}, using {}", claimed, score, result.label);
        }
    }
    Ok(result)
}

/// Scores articles through a text model in JSON mode.
pub struct LlmScorer {
    model: Arc<dyn TextModel>,
}

impl fmt::Debug for LlmScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmScorer")
            .field("model", &self.model.name())
            .finish()
    }
}

impl LlmScorer {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub(crate) fn build_request(company: &str, text: &str) -> CompletionRequest {
        let prompt = format!(
            "Company: {}\nNews article (truncated if too long):\n{}",
            company,
            truncate_for_scoring(text)
        );
        CompletionRequest::new(SYSTEM_PROMPT, prompt).json().max_tokens(512)
    }
}

#[async_trait]
impl SentimentScorer for LlmScorer {
    fn name(&self) -> &str {
        self.model.name()
    }

    async fn score(&self, company: &str, text: &str) -> Result<SentimentScore> {
        if text.trim().is_empty() {
            return Err(Error::ScoringUnavailable("empty text".to_string()));
        }
        let request = Self::build_request(company, text);
        let reply = self
            .model
            .complete(&request)
            .await
            .map_err(|e| match e {
                Error::ScoringUnavailable(_) => e,
                other => Error::ScoringUnavailable(other.to_string()),
            })?;
        parse_score_reply(&reply)
    }
}
