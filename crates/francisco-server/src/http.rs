use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::Method;
use axum::response::{IntoResponse, Json};
use axum::routing::{any, get};
use axum::Router;
use francisco_core::theme::DEFAULT_MAX_TOKENS;
use francisco_core::{
    strip_markdown, with_formatting, ChatMessage, Completion, CompletionError, Theme,
    ThemeSummary, CHAT_SYSTEM_PROMPT,
};
use serde_json::{json, Map, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};

use crate::error::ApiError;

const METHOD_NOT_ALLOWED: &str = "Méthode non autorisée.";
const CHAT_METHOD_NOT_ALLOWED: &str = "Méthode non autorisée";
const PROMPT_REQUIRED: &str = "Le prompt est requis.";
const MESSAGES_REQUIRED: &str = "'messages' est requis et doit être un tableau.";
const CHAT_UPSTREAM_ERROR: &str = "Erreur lors de la génération de la réponse.";
const INTERNAL_ERROR: &str = "Erreur interne du serveur";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    completion: Arc<dyn Completion>,
}

impl AppStateInner {
    pub fn new(completion: Arc<dyn Completion>) -> AppState {
        Arc::new(Self { completion })
    }
}

fn require_post(method: &Method, message: &'static str) -> Result<(), ApiError> {
    if method == Method::POST {
        Ok(())
    } else {
        Err(ApiError::MethodNotAllowed(message))
    }
}

/// Pull a non-empty `prompt` string out of the request body.
fn parse_prompt(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("prompt")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

fn parse_messages(body: &[u8]) -> Option<Vec<ChatMessage>> {
    let mut value: Value = serde_json::from_slice(body).ok()?;
    let messages = value.get_mut("messages")?.take();
    if !messages.is_array() {
        return None;
    }
    serde_json::from_value(messages).ok()
}

fn map_completion_error(
    err: CompletionError,
    upstream_message: &'static str,
    internal_message: &'static str,
) -> ApiError {
    match err.upstream_status() {
        Some(status) => ApiError::Upstream {
            status,
            message: upstream_message,
        },
        None => {
            tracing::error!("Completion call failed: {}", err);
            ApiError::Internal(internal_message)
        }
    }
}

async fn api_theme(
    State(state): State<AppState>,
    Path(route): Path<String>,
    method: Method,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let theme = Theme::from_endpoint(&route).ok_or(ApiError::NotFound)?;
    require_post(&method, METHOD_NOT_ALLOWED)?;

    let prompt = parse_prompt(&body).ok_or(ApiError::BadRequest(PROMPT_REQUIRED))?;
    let messages = [ChatMessage::user(with_formatting(theme, &prompt))];

    let reply = state
        .completion
        .complete(&messages, theme.max_tokens())
        .await
        .map_err(|e| map_completion_error(e, theme.upstream_error(), theme.internal_error()))?;

    if theme.requires_choices() && !reply.has_choices {
        tracing::error!("No choices in the {} completion", theme.id());
        return Err(ApiError::Internal(theme.internal_error()));
    }

    let mut text = reply
        .content()
        .unwrap_or_else(|| theme.fallback_reply())
        .to_string();
    if theme.strips_markdown() {
        text = strip_markdown(&text);
    }

    let mut body = Map::new();
    body.insert(theme.reply_field().to_string(), Value::String(text));
    Ok(Json(Value::Object(body)))
}

async fn api_chat(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    require_post(&method, CHAT_METHOD_NOT_ALLOWED)?;

    let history = parse_messages(&body).ok_or(ApiError::BadRequest(MESSAGES_REQUIRED))?;
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(CHAT_SYSTEM_PROMPT));
    messages.extend(history);

    let reply = state
        .completion
        .complete(&messages, DEFAULT_MAX_TOKENS)
        .await
        .map_err(|e| map_completion_error(e, CHAT_UPSTREAM_ERROR, INTERNAL_ERROR))?;

    if !reply.has_choices {
        tracing::error!("No choices in the chat completion");
        return Err(ApiError::Internal(INTERNAL_ERROR));
    }

    // The message object goes back untouched, empty content included.
    let response = reply.message.unwrap_or_else(|| json!({}));
    Ok(Json(json!({ "response": response })))
}

async fn api_themes() -> Json<Vec<ThemeSummary>> {
    Json(Theme::ALL.iter().map(Theme::summary).collect())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/themes", get(api_themes))
        .route("/api/chat", any(api_chat))
        .route("/api/{route}", any(api_theme))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(completion: Arc<dyn Completion>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(AppStateInner::new(completion));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Francisco-IA handlers listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
