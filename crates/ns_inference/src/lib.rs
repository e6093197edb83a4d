use std::fmt;

use clap::Args;

pub mod models;
pub mod narrative;
pub mod sentiment;
pub mod speech;

#[cfg(test)]
mod test_support;

pub const DEFAULT_SCORING_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_NARRATIVE_MODEL: &str = "llama-3.3-70b-versatile";

/// Inference settings, usable directly as CLI flags.
#[derive(Clone, Args)]
pub struct Config {
    /// API key for the hosted chat model
    #[arg(long = "api-key", env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Model backend: groq (default) or offline
    #[arg(long = "model", env = "NS_MODEL", default_value = "groq")]
    pub backend: String,
    /// Base URL of an OpenAI-compatible API
    #[arg(long = "model-url", env = "NS_MODEL_URL")]
    pub model_url: Option<String>,
    #[arg(long, default_value = DEFAULT_SCORING_MODEL)]
    pub scoring_model: String,
    #[arg(long, default_value = DEFAULT_NARRATIVE_MODEL)]
    pub narrative_model: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("backend", &self.backend)
            .field("model_url", &self.model_url)
            .field("scoring_model", &self.scoring_model)
            .field("narrative_model", &self.narrative_model)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            backend: "groq".to_string(),
            model_url: None,
            scoring_model: DEFAULT_SCORING_MODEL.to_string(),
            narrative_model: DEFAULT_NARRATIVE_MODEL.to_string(),
        }
    }
}

impl Config {
    pub fn offline() -> Self {
        Self {
            backend: "offline".to_string(),
            ..Self::default()
        }
    }
}

pub mod prelude {
    pub use super::Config;
    pub use super::models::{create_inference, Inference};
    pub use super::narrative::NarrativeMerger;
    pub use super::speech::Speaker;
    pub use ns_core::{Error, Result};
}

pub use models::{create_inference, Inference};
pub use narrative::NarrativeMerger;
pub use speech::Speaker;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_debug_redacts_key() {
        let config = Config {
            api_key: Some("gsk_secret".to_string()),
            ..Config::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_offline_pipeline_pieces() {
        let inference = create_inference(&Config::offline()).unwrap();
        let score = inference
            .scorer
            .score("Acme", "Acme reported strong growth and record profit.")
            .await
            .unwrap();
        assert!(score.score > 0.0);
    }
}
