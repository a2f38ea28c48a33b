//! Language-model extractor over an OpenAI-compatible chat completions API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::LlmConfig;
use crate::models::pricing::ParsedInput;

use super::payload::RawPayload;
use super::{InputExtractor, Result};

const SYSTEM_PROMPT: &str = r#"You are a retail pricing assistant for German supermarkets.
You read one short line describing a product and its prices and return ONLY a JSON object.
Never add markdown fences or commentary."#;

const PARSER_PROMPT: &str = r#"Extract the following fields from the input line.

{
  "item": "product name or null",
  "ek": number or null,        // purchase price per unit (EK)
  "vk": number or null,        // operative sale price per unit; if an Aktion price is stated use it
  "vkNormal": number or null,  // regular price, e.g. after "statt"
  "wkzTotal": number or null,  // total promotional fund (WKZ) for the whole quantity
  "menge": number or null,     // quantity; use 1 when not stated
  "notes": "anything relevant that does not fit the fields, or null"
}

Rules:
- Decimal commas are decimal separators: "0,89" means 0.89.
- Use null for fields you cannot determine. Do not guess prices.

Examples:
Input: "Monster EK 0,89 VK 1,29"
Output: {"item": "Monster", "ek": 0.89, "vk": 1.29, "vkNormal": null, "wkzTotal": null, "menge": 1, "notes": null}

Input: "Kasten Wasser EK 3,90 Aktion 4,49 statt 4,99"
Output: {"item": "Kasten Wasser", "ek": 3.9, "vk": 4.49, "vkNormal": 4.99, "wkzTotal": null, "menge": 1, "notes": null}"#;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

/// Extractor that asks a language model to fill the fields.
pub struct LlmExtractor {
    client: Client,
    config: LlmConfig,
    api_key: Option<String>,
}

impl LlmExtractor {
    /// Create an extractor; the API key is read from `config.api_key_env` on each call.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key: None,
        })
    }

    /// Use an explicit API key instead of the environment.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        std::env::var(&self.config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ExtractionError::MissingApiKey(self.config.api_key_env.clone()))
    }

    fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(format!("{PARSER_PROMPT}\n\nInput: \"{text}\"\nOutput:")),
                },
            ],
            temperature: self.config.temperature,
        }
    }
}

impl InputExtractor for LlmExtractor {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn extract(&self, text: &str) -> Result<ParsedInput> {
        let api_key = self.resolve_api_key()?;
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        info!(model = %self.config.model, "Parsing check line with language model");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.build_request(text))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Language model returned an error");
            return Err(ExtractionError::Api { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ExtractionError::EmptyResponse)?;

        debug!("Model replied with {} characters", content.len());
        parse_json_response(&content)
    }
}

/// Decode the outermost JSON object of a model reply into a [`ParsedInput`].
///
/// Text around the object (reasoning, fences) is ignored.
pub fn parse_json_response(raw: &str) -> Result<ParsedInput> {
    let trimmed = raw.trim();
    let start = trimmed.find('{').ok_or(ExtractionError::NoJsonObject)?;
    let end = trimmed.rfind('}').ok_or(ExtractionError::NoJsonObject)?;
    if end <= start {
        return Err(ExtractionError::NoJsonObject);
    }

    let payload: RawPayload = serde_json::from_str(&trimmed[start..=end])?;
    Ok(payload.into_parsed())
}
