use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use ns_core::{Result, SpeechSynthesizer, SpokenSummary, Translator};

pub mod translate;
pub mod tts;

pub use translate::GoogleTranslator;
pub use tts::GoogleTts;

/// Language the narrative is written in.
pub const SOURCE_LANGUAGE: &str = "en";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Translates the narrative and renders it as audio. Never fails; missing parts are reported.
pub struct Speaker {
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl fmt::Debug for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Speaker").finish()
    }
}

impl Speaker {
    pub fn new(translator: Arc<dyn Translator>, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            translator,
            synthesizer,
        }
    }

    /// Google translation and TTS sharing one HTTP client.
    pub fn google() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::new(
            Arc::new(GoogleTranslator::new(client.clone())),
            Arc::new(GoogleTts::new(client)),
        ))
    }

    pub async fn speak(&self, text: &str, lang: &str) -> SpokenSummary {
        let lang = lang.trim().to_lowercase();
        let mut spoken = SpokenSummary {
            language: lang.clone(),
            translated_text: None,
            audio: None,
            issues: Vec::new(),
        };

        let speech_text = if lang == SOURCE_LANGUAGE {
            text.to_string()
        } else {
            match self.translator.translate(text, SOURCE_LANGUAGE, &lang).await {
                Ok(translated) => translated,
                Err(e) => {
                    tracing::warn!("🌐 Translation to {} failed: {}", lang, e);
                    spoken.issues.push(e.to_string());
                    return spoken;
                }
            }
        };
        spoken.translated_text = Some(speech_text.clone());

        match self.synthesizer.synthesize(&speech_text, &lang).await {
            Ok(clip) => {
                tracing::info!("🔊 Audio summary ready ({} bytes, {})", clip.bytes.len(), lang);
                spoken.audio = Some(clip);
            }
            Err(e) => {
                tracing::warn!("🔇 Audio synthesis failed: {}", e);
                spoken.issues.push(e.to_string());
            }
        }
        spoken
    }
}
