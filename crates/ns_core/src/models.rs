use async_trait::async_trait;

use crate::report::AudioClip;
use crate::types::SentimentScore;
use crate::Result;

/// One request to a chat-style text model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the model for a single JSON object.
    pub json: bool,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature: 0.3,
            max_tokens: 512,
            json: false,
        }
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
pub trait TextModel: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the model's reply text. Transport and API failures are errors, never partial text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[async_trait]
pub trait SentimentScorer: Send + Sync {
    fn name(&self) -> &str;

    /// Scores `text` with respect to `company`. Fails with `ScoringUnavailable`.
    async fn score(&self, company: &str, text: &str) -> Result<SentimentScore>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<AudioClip>;
}
