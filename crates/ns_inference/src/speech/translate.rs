use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use ns_core::{Error, Result, Translator};

pub const GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com";

/// Google's public `translate_a/single` endpoint.
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
}

impl fmt::Debug for GoogleTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleTranslator")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GoogleTranslator {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: GOOGLE_TRANSLATE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// The reply is `[[["translated", "source", ...], ...], ...]`; sentence parts are joined.
pub(crate) fn parse_translation(value: &Value) -> Result<String> {
    let sentences = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::TranslationUnavailable("unexpected translation payload".to_string()))?;
    let text: String = sentences
        .iter()
        .filter_map(|part| part.get(0).and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        return Err(Error::TranslationUnavailable("empty translation".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::TranslationUnavailable(e.to_string()))?;
        let value: Value = response
            .json()
            .await
            .map_err(|e| Error::TranslationUnavailable(e.to_string()))?;
        parse_translation(&value)
    }
}
