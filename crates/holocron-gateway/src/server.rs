//! HTTP server implementation using Axum.

use axum::response::Html;
use axum::{
    Router,
    routing::{delete, get, post},
};
use holocron_agent::{AgentFactory, ChatSession};
use holocron_core::config::GatewayConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// A chat session, locked for the duration of one turn.
pub type SharedSession = Arc<tokio::sync::Mutex<ChatSession>>;

struct SessionEntry {
    session: SharedSession,
    last_used: Instant,
}

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub gateway_config: GatewayConfig,
    pub start_time: Instant,
    /// Builds a fresh agent for each new session.
    pub factory: Arc<AgentFactory>,
    /// Session id → session. The map lock is held only for lookups.
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl AppState {
    pub fn new(gateway_config: GatewayConfig, factory: Arc<AgentFactory>) -> Self {
        Self {
            gateway_config,
            start_time: Instant::now(),
            factory,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a session and return its id. Idle sessions are swept first.
    pub fn create_session(&self) -> (String, SharedSession) {
        self.evict_idle(Duration::from_secs(self.gateway_config.session_idle_secs));

        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(tokio::sync::Mutex::new(ChatSession::new(
            self.factory.clone(),
        )));
        self.sessions().insert(
            id.clone(),
            SessionEntry {
                session: session.clone(),
                last_used: Instant::now(),
            },
        );
        tracing::info!("🆕 Session {id} opened");
        (id, session)
    }

    /// Look up a session and mark it used.
    pub fn session(&self, id: &str) -> Option<SharedSession> {
        let mut sessions = self.sessions();
        let entry = sessions.get_mut(id)?;
        entry.last_used = Instant::now();
        Some(entry.session.clone())
    }

    /// Drop a session. `false` if it did not exist.
    pub fn remove_session(&self, id: &str) -> bool {
        let removed = self.sessions().remove(id).is_some();
        if removed {
            tracing::info!("🗑️ Session {id} closed");
        }
        removed
    }

    /// Drop sessions unused for at least `max_idle`. A session in the middle
    /// of a turn is kept. Returns how many were dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            entry.last_used.elapsed() < max_idle || entry.session.try_lock().is_err()
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("🧹 Evicted {evicted} idle session(s)");
        }
        evicted
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }
}

/// Serve the chat page.
async fn dashboard_page() -> Html<&'static str> {
    Html(super::dashboard::dashboard_html())
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);

    Router::new()
        .route("/", get(dashboard_page))
        .route("/health", get(super::routes::health_check))
        .route("/api/v1/health", get(super::routes::health_check))
        .route("/api/v1/info", get(super::routes::system_info))
        .route("/api/v1/sessions", post(super::routes::create_session))
        .route(
            "/api/v1/sessions/{id}",
            delete(super::routes::session_delete),
        )
        .route(
            "/api/v1/sessions/{id}/messages",
            get(super::routes::session_messages),
        )
        .route("/api/v1/sessions/{id}/chat", post(super::routes::session_chat))
        .route(
            "/api/v1/sessions/{id}/clear",
            post(super::routes::session_clear),
        )
        .layer(
            CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .allow_origin(Any)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server.
pub async fn start(config: &GatewayConfig, factory: Arc<AgentFactory>) -> anyhow::Result<()> {
    let app = build_router(AppState::new(config.clone(), factory));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Holocron chat listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
