use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use ns_core::{AudioClip, Error, Result, SpeechSynthesizer};

pub const GOOGLE_TTS_URL: &str = "https://translate.google.com";
/// Longest text the TTS endpoint accepts per request.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Google Translate's text-to-speech endpoint. Produces MP3.
pub struct GoogleTts {
    client: Client,
    base_url: String,
}

impl fmt::Debug for GoogleTts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleTts").field("base_url", &self.base_url).finish()
    }
}

impl GoogleTts {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: GOOGLE_TTS_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_chunk(&self, chunk: &str, lang: &str, idx: usize, total: usize) -> Result<Vec<u8>> {
        let (idx, total, textlen) = (
            idx.to_string(),
            total.to_string(),
            chunk.chars().count().to_string(),
        );
        let response = self
            .client
            .get(format!("{}/translate_tts", self.base_url))
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", chunk),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::AudioUnavailable(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::AudioUnavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Splits on whitespace into chunks of at most `max` characters; longer words are hard-split.
pub fn chunk_text(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.push(word.drain(..max).collect());
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() { word.len() } else { current.chars().count() + 1 + word.len() };
        if needed > max {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<AudioClip> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(Error::AudioUnavailable("nothing to speak".to_string()));
        }
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, lang, idx, chunks.len()).await?);
        }
        tracing::debug!("🔊 Synthesized {} chunks ({} bytes) in {}", chunks.len(), audio.len(), lang);
        Ok(AudioClip::mp3(audio))
    }
}
