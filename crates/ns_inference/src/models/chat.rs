use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;
use ns_core::{CompletionRequest, Error, Result, TextModel};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint (Groq by default).
pub struct ChatModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    model: String,
}

impl ChatModel {
    pub fn new(api_key: Option<String>, base_url: Option<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("An API key is required for the chat model".to_string()))?;
        let base_url = base_url
            .unwrap_or_else(|| GROQ_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Url::parse(&base_url)?;
        Ok(Self {
            client: Arc::new(Client::new()),
            api_key,
            base_url,
            model: model.into(),
        })
    }

    /// Shares one HTTP connection pool between several models.
    pub fn with_client(mut self, client: Arc<Client>) -> Self {
        self.client = client;
        self
    }

    fn build_request<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json.then_some(ResponseFormat { kind: "json_object" }),
        }
    }
}

impl fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

fn first_reply(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| Error::External(anyhow!("Chat completion returned no content")))
}

#[async_trait]
impl TextModel for ChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.build_request(request);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::External(anyhow!(
                "{} responded {}: {}",
                self.model,
                status,
                detail.chars().take(200).collect::<String>()
            )));
        }

        let reply = first_reply(response.json::<ChatResponse>().await?)?;
        tracing::debug!("{} replied with {} chars", self.model, reply.len());
        Ok(reply)
    }
}
