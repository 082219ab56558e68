//! Bearer-session authentication.
//!
//! Token issuance lives outside this system; the middleware only resolves
//! `Authorization: Bearer <token>` against the sessions table. Handlers
//! behind it receive the verified identity as an
//! [`AuthUser`](crate::domain::ports::AuthUser) request extension and never
//! see unauthenticated traffic.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::domain::ports::SessionRepository;

use super::error::ApiError;
use super::state::AppState;

/// Reject the request with 401 unless the bearer token resolves to a live
/// session.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()).map(str::to_owned) else {
        return ApiError::unauthorized().into_response();
    };

    match state.sessions.verify(&token, state.clock.now()).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => ApiError::unauthorized().into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
