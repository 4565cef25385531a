use francisco_core::{ChatMessage, Theme};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The handler answered with a non-2xx status and its `error` message.
    #[error("handler returned {status}: {message}")]
    Handler { status: u16, message: String },

    #[error("request to handler failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("handler reply has no '{0}' field")]
    MissingField(&'static str),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct ChatReply {
    response: Value,
}

/// Talks to the Francisco-IA handlers the way the theme pages do.
#[derive(Clone)]
pub struct HandlerClient {
    client: Client,
    base_url: String,
}

impl HandlerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|b| b.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(ClientError::Handler {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Send a themed prompt and return the generated text.
    pub async fn ask(&self, theme: Theme, prompt: &str) -> Result<String, ClientError> {
        let reply = self.post(&theme.endpoint(), json!({ "prompt": prompt })).await?;
        let field = theme.reply_field();
        reply
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ClientError::MissingField(field))
    }

    /// Send the whole conversation to the free-form chat handler. `None` when
    /// the model produced nothing.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<Option<ChatMessage>, ClientError> {
        let reply = self.post("/api/chat", json!({ "messages": messages })).await?;
        let reply: ChatReply =
            serde_json::from_value(reply).map_err(|_| ClientError::MissingField("response"))?;
        Ok(serde_json::from_value(reply.response).ok())
    }
}
