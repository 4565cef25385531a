use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use francisco_core::{ChatMessage, Completion, CompletionError, CompletionReply, MistralClient};
use francisco_server::{router, AppStateInner};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct BrokenCompletion;

#[async_trait]
impl Completion for BrokenCompletion {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _max_tokens: u32,
    ) -> Result<CompletionReply, CompletionError> {
        Err(CompletionError::Transport("connection reset".to_string()))
    }
}

fn app_for(mock_server: &MockServer) -> Router {
    let client = MistralClient::with_base_url(&mock_server.uri(), "test-key");
    router(AppStateInner::new(Arc::new(client)))
}

async fn mount_reply(mock_server: &MockServer, content: &str) {
    mount_body(
        mock_server,
        json!({ "choices": [{"message": {"role": "assistant", "content": content}}] }),
    )
    .await;
}

async fn mount_body(mock_server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

fn chat_body() -> Value {
    json!({ "messages": [{"role": "user", "content": "Salut"}] })
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_get_is_rejected_with_405() {
    let mock_server = MockServer::start().await;
    let app = app_for(&mock_server);

    let request = Request::builder()
        .method("GET")
        .uri("/api/finances")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "POST");
}

#[tokio::test]
async fn test_chat_rejects_put_with_405() {
    let mock_server = MockServer::start().await;
    let request = Request::builder()
        .method("PUT")
        .uri("/api/chat")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app_for(&mock_server), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Méthode non autorisée");
}

#[tokio::test]
async fn test_missing_prompt_is_400() {
    let mock_server = MockServer::start().await;

    let (status, body) = post_json(app_for(&mock_server), "/api/loisirs", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Le prompt est requis.");

    let (status, _) =
        post_json(app_for(&mock_server), "/api/loisirs", json!({ "prompt": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        post_json(app_for(&mock_server), "/api/loisirs", json!({ "prompt": 12 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Le prompt est requis.");
}

#[tokio::test]
async fn test_chat_requires_message_array() {
    let mock_server = MockServer::start().await;

    let (status, body) =
        post_json(app_for(&mock_server), "/api/chat", json!({ "messages": "salut" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "'messages' est requis et doit être un tableau.");
}

#[tokio::test]
async fn test_theme_reply_is_stripped_of_markdown() {
    let mock_server = MockServer::start().await;
    mount_reply(&mock_server, "### Budget\n**Épargnez** 10 % 💰").await;

    let (status, body) = post_json(
        app_for(&mock_server),
        "/api/finances",
        json!({ "prompt": "Comment épargner ?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], " Budget\nÉpargnez 10 % 💰");
}

#[tokio::test]
async fn test_recipe_reply_is_relayed_unchanged() {
    let mock_server = MockServer::start().await;
    mount_reply(&mock_server, "<b>Omelette **rapide** 🍴").await;

    let (status, body) = post_json(
        app_for(&mock_server),
        "/api/recettes",
        json!({ "prompt": "oeufs, lait" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipe"], "<b>Omelette **rapide** 🍴");
    assert!(body.get("response").is_none());
}

#[tokio::test]
async fn test_formatting_and_token_cap_are_sent_upstream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "pixtral-12b-2409",
            "max_tokens": 700,
            "temperature": 0.7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "Voici la solution 📚"}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = post_json(
        app_for(&mock_server),
        "/api/aide-devoirs",
        json!({ "prompt": "Résoudre 2x = 4" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Voici la solution 📚");

    let requests = mock_server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let content = sent["messages"][0]["content"].as_str().unwrap();
    assert!(content.starts_with("Résoudre 2x = 4\n\nVeuillez NE PAS"));
    assert_eq!(sent["messages"][0]["role"], "user");
}

#[tokio::test]
async fn test_empty_reply_uses_theme_fallback() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, json!({ "choices": [] })).await;

    let (status, body) = post_json(
        app_for(&mock_server),
        "/api/vacances",
        json!({ "prompt": "Une semaine en Bretagne" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Aucune proposition reçue.");
}

#[tokio::test]
async fn test_null_choices_use_theme_fallback() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, json!({ "choices": null })).await;

    let (status, body) = post_json(
        app_for(&mock_server),
        "/api/finances",
        json!({ "prompt": "Comment épargner ?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Aucune réponse générée.");
}

#[tokio::test]
async fn test_recipe_without_choices_is_500() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, json!({ "id": "cmpl-1" })).await;

    let (status, body) = post_json(
        app_for(&mock_server),
        "/api/recettes",
        json!({ "prompt": "oeufs, lait" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Erreur lors de la génération de la recette.");

    // An empty list is still a list: the recipe gets its fallback.
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, json!({ "choices": [] })).await;

    let (status, body) = post_json(
        app_for(&mock_server),
        "/api/recettes",
        json!({ "prompt": "oeufs, lait" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipe"], "Aucune recette générée.");
}

#[tokio::test]
async fn test_upstream_status_is_propagated() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&mock_server)
        .await;

    let (status, body) = post_json(
        app_for(&mock_server),
        "/api/recettes",
        json!({ "prompt": "pâtes" }),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Erreur lors de la génération de la recette.");
}

#[tokio::test]
async fn test_completion_failure_is_500() {
    let app = router(AppStateInner::new(Arc::new(BrokenCompletion)));

    let (status, body) =
        post_json(app.clone(), "/api/bien-etre", json!({ "prompt": "Mieux dormir" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Erreur interne du serveur.");

    let (status, body) = post_json(app, "/api/chat", chat_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Erreur interne du serveur");
}

#[tokio::test]
async fn test_chat_upstream_status_is_propagated() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&mock_server)
        .await;

    let (status, body) = post_json(app_for(&mock_server), "/api/chat", chat_body()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "error": "Erreur lors de la génération de la réponse." }));
}

#[tokio::test]
async fn test_chat_without_choices_is_500() {
    let mock_server = MockServer::start().await;
    mount_body(&mock_server, json!({})).await;

    let (status, body) = post_json(app_for(&mock_server), "/api/chat", chat_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Erreur interne du serveur");
}

#[tokio::test]
async fn test_chat_relays_message_object_as_sent() {
    let mock_server = MockServer::start().await;
    mount_reply(&mock_server, "").await;

    let (status, body) = post_json(app_for(&mock_server), "/api/chat", chat_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": {"role": "assistant", "content": ""} }));

    let mock_server = MockServer::start().await;
    mount_body(&mock_server, json!({ "choices": [{"finish_reason": "length"}] })).await;

    let (status, body) = post_json(app_for(&mock_server), "/api/chat", chat_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": {} }));
}

#[tokio::test]
async fn test_chat_prepends_system_message() {
    let mock_server = MockServer::start().await;
    mount_reply(&mock_server, "Bonjour 😊").await;

    let (status, body) = post_json(app_for(&mock_server), "/api/chat", chat_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], json!({"role": "assistant", "content": "Bonjour 😊"}));

    let requests = mock_server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(sent["messages"][1], json!({"role": "user", "content": "Salut"}));
}

#[tokio::test]
async fn test_unknown_route_and_theme_listing() {
    let mock_server = MockServer::start().await;

    let (status, _) =
        post_json(app_for(&mock_server), "/api/horoscope", json!({ "prompt": "?" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .uri("/api/themes")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app_for(&mock_server), request).await;
    assert_eq!(status, StatusCode::OK);
    let themes = body.as_array().unwrap();
    assert_eq!(themes.len(), 8);
    assert_eq!(themes[0]["id"], "aide-devoirs");
    assert_eq!(themes[1]["endpoint"], "/api/recettes");
}
