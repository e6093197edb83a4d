use std::str::FromStr;
use std::sync::Arc;

use reqwest::Client;
use ns_core::{Error, Result, SentimentScorer};

use crate::narrative::NarrativeMerger;
use crate::sentiment::LlmScorer;
use crate::Config;

pub mod chat;
pub mod lexicon;

pub use chat::ChatModel;
pub use lexicon::LexiconScorer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Hosted OpenAI-compatible chat model.
    Remote,
    /// Lexicon scoring and extractive narrative. No network.
    Offline,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" | "openai" | "remote" => Ok(Backend::Remote),
            "offline" | "lexicon" => Ok(Backend::Offline),
            other => Err(Error::Config(format!(
                "Unknown model backend '{}'. Available: groq (default), offline",
                other
            ))),
        }
    }
}

/// The scorer and narrative merger a report needs.
pub struct Inference {
    pub scorer: Arc<dyn SentimentScorer>,
    pub narrative: NarrativeMerger,
}

pub fn create_inference(config: &Config) -> Result<Inference> {
    match config.backend.parse::<Backend>()? {
        Backend::Remote => {
            let client = Arc::new(Client::new());
            let scoring = ChatModel::new(
                config.api_key.clone(),
                config.model_url.clone(),
                config.scoring_model.clone(),
            )?
            .with_client(client.clone());
            let narrative = ChatModel::new(
                config.api_key.clone(),
                config.model_url.clone(),
                config.narrative_model.clone(),
            )?
            .with_client(client);
            Ok(Inference {
                scorer: Arc::new(LlmScorer::new(Arc::new(scoring))),
                narrative: NarrativeMerger::with_model(Arc::new(narrative)),
            })
        }
        Backend::Offline => Ok(Inference {
            scorer: Arc::new(LexiconScorer::new()?),
            narrative: NarrativeMerger::extractive(),
        }),
    }
}
