//! services/adm/src/web/session.rs
//!
//! Session cookie plumbing between axum and the `SessionStore` port.

use axum::http::{header, HeaderMap, StatusCode};
use audio_debug_core::domain::Session;
use std::time::Duration;
use tracing::error;

use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Extracts the session id from the request's `Cookie` header, if any.
pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|c| {
        c.trim()
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .filter(|id| !id.is_empty())
    })
}

/// The `Set-Cookie` value that hands `session` to the browser.
pub fn session_cookie(session: &Session, ttl: Duration) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        session.id,
        ttl.as_secs()
    )
}

/// Loads (or starts) the session belonging to this request.
pub async fn load_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Session, (StatusCode, String)> {
    state
        .sessions
        .load(session_id(headers))
        .await
        .map_err(|e| {
            error!("Failed to load session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
}
