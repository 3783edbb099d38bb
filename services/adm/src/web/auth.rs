//! services/adm/src/web/auth.rs
//!
//! OAuth login endpoints: `/auth/login` starts the flow and `/auth/callback`
//! completes it.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use audio_debug_core::AuthError;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::web::session::{load_session, session_cookie};
use crate::web::state::AppState;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub code: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /auth/login - Redirect to the identity provider
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let mut session = load_session(&state, &headers).await?;

    let url = state
        .authenticator
        .begin_login(&mut session)
        .await
        .map_err(|e| {
            error!("Failed to start login: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let cookie = session_cookie(&session, state.config.session_ttl);
    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, url), (header::SET_COOKIE, cookie)],
    )
        .into_response())
}

/// GET /auth/callback - Finish the login and go back to the application root
pub async fn callback_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<Response, (StatusCode, String)> {
    let mut session = load_session(&state, &headers).await?;

    state
        .authenticator
        .complete_login(&mut session, &params.state, &params.code)
        .await
        .map_err(|e| {
            error!("Login failed: {:?}", e);
            let status = match e {
                AuthError::InvalidState => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string())
        })?;

    let cookie = session_cookie(&session, state.config.session_ttl);
    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, "/".to_string()), (header::SET_COOKIE, cookie)],
    )
        .into_response())
}
