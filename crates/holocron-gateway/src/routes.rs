//! API route handlers for the gateway.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use super::server::AppState;

fn session_not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"ok": false, "error": format!("Session not found: {id}")})),
    )
        .into_response()
}

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "holocron-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// System information endpoint.
pub async fn system_info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "name": "Sith Holocron",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.factory.provider_name(),
        "model": state.factory.model(),
        "llm_online": state.factory.provider_online().await,
        "sessions": state.session_count(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "greeting": state.factory.greeting(),
    }))
}

/// Open a new chat session.
pub async fn create_session(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let (id, session) = state.create_session();
    let session = session.lock().await;
    Json(json!({
        "ok": true,
        "session_id": id,
        "messages": session.history(),
    }))
}

/// Visible history of a session.
pub async fn session_messages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(session) = state.session(&id) else {
        return session_not_found(&id);
    };
    let session = session.lock().await;
    Json(json!({"ok": true, "messages": session.history()})).into_response()
}

/// Run one chat turn. Agent failures come back inline, with the error
/// already recorded in the history.
pub async fn session_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let message = body["message"].as_str().unwrap_or("").trim();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error": "Empty message"})),
        )
            .into_response();
    }
    let Some(session) = state.session(&id) else {
        return session_not_found(&id);
    };

    let mut session = session.lock().await;
    match session.send(message).await {
        Ok(response) => Json(json!({
            "ok": true,
            "response": response,
            "messages": session.history(),
        }))
        .into_response(),
        Err(e) => Json(json!({
            "ok": false,
            "error": e.to_string(),
            "messages": session.history(),
        }))
        .into_response(),
    }
}

/// Reset a session to the greeting with fresh memory.
pub async fn session_clear(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(session) = state.session(&id) else {
        return session_not_found(&id);
    };
    let mut session = session.lock().await;
    session.clear();
    Json(json!({"ok": true, "messages": session.history()})).into_response()
}

/// Close a session and free its agent.
pub async fn session_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    if !state.remove_session(&id) {
        return session_not_found(&id);
    }
    Json(json!({"ok": true})).into_response()
}

#[cfg(test)]
mod tests {
    use crate::server::{AppState, build_router};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use holocron_agent::AgentFactory;
    use holocron_core::config::HolocronConfig;
    use holocron_core::error::{HolocronError, Result};
    use holocron_core::traits::Provider;
    use holocron_core::traits::provider::GenerateParams;
    use holocron_core::types::{Message, ProviderResponse, ToolDefinition};
    use holocron_tools::ToolRegistry;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Repeats the user's words back; fails on "fail".
    struct ParrotProvider;

    #[async_trait]
    impl Provider for ParrotProvider {
        fn name(&self) -> &str {
            "parrot"
        }

        async fn chat(
            &self,
            messages: &[Message],
            _tools: &[ToolDefinition],
            _params: &GenerateParams,
        ) -> Result<ProviderResponse> {
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            if last == "fail" {
                return Err(HolocronError::Http("connection refused".into()));
            }
            // Prove memory: how many earlier user messages are visible.
            let seen = messages.iter().filter(|m| m.role.as_str() == "user").count();
            Ok(ProviderResponse {
                content: Some(format!("{last} ({seen})")),
                ..Default::default()
            })
        }
    }

    fn app() -> axum::Router {
        app_with(HolocronConfig::default())
    }

    fn app_with(config: HolocronConfig) -> axum::Router {
        let factory = AgentFactory::new(
            Arc::new(ParrotProvider),
            Arc::new(ToolRegistry::new()),
            &config,
        );
        build_router(AppState::new(config.gateway.clone(), Arc::new(factory)))
    }

    async fn call(
        app: &axum::Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    async fn new_session(app: &axum::Router) -> String {
        let (_, json) = call(app, "POST", "/api/v1/sessions", None).await;
        json["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_and_info() {
        let app = app();
        let (status, json) = call(&app, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");

        let (_, json) = call(&app, "GET", "/api/v1/info", None).await;
        assert_eq!(json["provider"], "parrot");
        assert_eq!(json["model"], "llama3.2:3b");
        assert_eq!(json["llm_online"], true);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = app();
        let id = new_session(&app).await;
        let (_, json) = call(&app, "GET", "/api/v1/info", None).await;
        assert_eq!(json["sessions"], 1);

        let (status, json) = call(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);

        let (status, _) = call(&app, "GET", &format!("/api/v1/sessions/{id}/messages"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, json) = call(&app, "GET", "/api/v1/info", None).await;
        assert_eq!(json["sessions"], 0);
    }

    #[tokio::test]
    async fn test_idle_sessions_evicted_on_create() {
        let mut config = HolocronConfig::default();
        config.gateway.session_idle_secs = 0;
        let app = app_with(config);

        let stale = new_session(&app).await;
        let fresh = new_session(&app).await;

        let (status, _) = call(&app, "GET", &format!("/api/v1/sessions/{stale}/messages"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "GET", &format!("/api/v1/sessions/{fresh}/messages"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, json) = call(&app, "GET", "/api/v1/info", None).await;
        assert_eq!(json["sessions"], 1);
    }

    #[tokio::test]
    async fn test_active_sessions_survive_eviction() {
        let config = HolocronConfig::default();
        let factory = AgentFactory::new(
            Arc::new(ParrotProvider),
            Arc::new(ToolRegistry::new()),
            &config,
        );
        let state = AppState::new(config.gateway.clone(), Arc::new(factory));
        let (busy, session) = state.create_session();
        let (idle, _) = state.create_session();

        let _turn = session.lock().await;
        assert_eq!(state.evict_idle(std::time::Duration::ZERO), 1);
        assert!(state.session(&busy).is_some());
        assert!(state.session(&idle).is_none());
    }

    #[tokio::test]
    async fn test_index_page_served() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Sith Holocron"));
    }

    #[tokio::test]
    async fn test_new_session_starts_with_greeting() {
        let app = app();
        let (status, json) = call(&app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_chat_and_clear() {
        let app = app();
        let id = new_session(&app).await;
        let chat = format!("/api/v1/sessions/{id}/chat");

        let (_, json) = call(&app, "POST", &chat, Some(serde_json::json!({"message": "one"}))).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["response"], "one (1)");

        let (_, json) = call(&app, "POST", &chat, Some(serde_json::json!({"message": "two"}))).await;
        assert_eq!(json["response"], "two (2)");
        assert_eq!(json["messages"].as_array().unwrap().len(), 5);

        let (_, json) = call(&app, "POST", &format!("/api/v1/sessions/{id}/clear"), None).await;
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);

        let (_, json) = call(&app, "POST", &chat, Some(serde_json::json!({"message": "three"}))).await;
        assert_eq!(json["response"], "three (1)");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let app = app();
        let first = new_session(&app).await;
        let second = new_session(&app).await;
        assert_ne!(first, second);

        call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{first}/chat"),
            Some(serde_json::json!({"message": "secret"})),
        )
        .await;
        let (_, json) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{second}/chat"),
            Some(serde_json::json!({"message": "hello"})),
        )
        .await;
        assert_eq!(json["response"], "hello (1)");

        let (_, json) = call(&app, "GET", &format!("/api/v1/sessions/{second}/messages"), None).await;
        assert_eq!(json["messages"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_chat_error_is_inline() {
        let app = app();
        let id = new_session(&app).await;
        let (status, json) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/chat"),
            Some(serde_json::json!({"message": "fail"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], false);
        assert!(json["error"].as_str().unwrap().contains("connection refused"));
        let last = json["messages"].as_array().unwrap().last().unwrap().clone();
        assert!(last["content"].as_str().unwrap().starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_unknown_session_and_empty_message() {
        let app = app();
        let (status, _) = call(&app, "GET", "/api/v1/sessions/nope/messages", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let id = new_session(&app).await;
        let (status, json) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/chat"),
            Some(serde_json::json!({"message": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["ok"], false);
    }
}
