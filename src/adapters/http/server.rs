//! REST API server.
//!
//! One router over the shared [`AppState`]; every route except the health
//! check sits behind the session middleware.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{middleware, Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::models::ServerConfig;

use super::state::AppState;
use super::{auth, goals, progress, units, user_stats};

/// HTTP server for the goal-tracking API.
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a server over already-wired state.
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        Self { config, state: Arc::new(state) }
    }

    fn into_router(self) -> Router {
        let state = self.state;

        let protected = Router::new()
            .route("/goals", get(goals::list_goals).post(goals::create_goal))
            .route("/goals/statistics", get(goals::goal_statistics))
            .route("/goals/statistics/{id}", get(progress::goal_history))
            .route(
                "/goals/{id}",
                get(goals::get_goal).put(goals::update_goal).delete(goals::delete_goal),
            )
            .route("/goals/{id}/toggle-completion", put(goals::toggle_completion))
            .route("/goal-progress", post(progress::record_progress))
            .route("/units", get(units::list_units).post(units::create_unit))
            .route("/units/statistics", get(units::unit_statistics))
            .route("/units/{id}", put(units::update_unit).delete(units::delete_unit))
            .route("/user-stats", get(user_stats::get_user_stats))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_session));

        let mut app = Router::new()
            .route("/health", get(health))
            .merge(protected)
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
            app = app.layer(cors);
        }
        app
    }

    /// Run until the process is killed.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Run until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.into_router();

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "api server listening");

        axum::serve(listener, router).with_graceful_shutdown(shutdown).await?;
        Ok(())
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
