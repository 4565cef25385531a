use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{Completion, CompletionReply};
use crate::error::CompletionError;
use crate::state::ChatMessage;

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";
pub const DEFAULT_MODEL: &str = "pixtral-12b-2409";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Serialize)]
struct MistralRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

// Choices stay loosely typed: a null list, a null choice or a message of an
// unexpected shape are all answers the handlers have to relay, not decode errors.
#[derive(Deserialize)]
struct MistralResponse {
    #[serde(default)]
    choices: Option<Vec<Value>>,
}

impl From<MistralResponse> for CompletionReply {
    fn from(response: MistralResponse) -> Self {
        match response.choices {
            None => CompletionReply::default(),
            Some(choices) => CompletionReply {
                has_choices: true,
                message: choices
                    .into_iter()
                    .next()
                    .and_then(|mut choice| choice.get_mut("message").map(Value::take))
                    .filter(Value::is_object),
            },
        }
    }
}

/// Model and sampling parameters sent with every request.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Clone)]
pub struct MistralClient {
    client: Client,
    base_url: String,
    api_key: String,
    settings: CompletionSettings,
}

impl MistralClient {
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            settings: CompletionSettings::default(),
        }
    }

    pub fn settings(mut self, settings: CompletionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Result<Self, CompletionError> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }
}

#[async_trait]
impl Completion for MistralClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<CompletionReply, CompletionError> {
        let request = MistralRequest {
            model: &self.settings.model,
            messages,
            max_tokens,
            temperature: self.settings.temperature,
        };

        let response = self.client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!("Mistral API error {}: {}", status, text);
            return Err(CompletionError::Upstream { status: status.as_u16() });
        }

        let mistral_response: MistralResponse = response.json().await?;
        Ok(mistral_response.into())
    }
}
