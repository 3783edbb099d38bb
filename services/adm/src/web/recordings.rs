//! services/adm/src/web/recordings.rs
//!
//! The recordings page plus the small root and heartbeat endpoints.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use audio_debug_core::ListError;
use std::sync::Arc;
use tracing::error;

use crate::web::session::load_session;
use crate::web::state::AppState;

fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// GET /heartbeat
pub async fn heartbeat_handler() -> &'static str {
    "adm"
}

/// GET / - The recordings page is the only page
pub async fn root_handler() -> Response {
    found("/recordings")
}

/// GET /recordings - Recordings from the last 24 hours, newest first
pub async fn recordings_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let session = load_session(&state, &headers).await?;

    let set = match state.lister.list_recordings(&session).await {
        Ok(set) => set,
        Err(ListError::Unauthenticated) => return Ok(found("/auth/login")),
        Err(e) => {
            error!("Failed to list recordings: {:?}", e);
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let page = state.renderer.recordings_page(&set).map_err(|e| {
        error!("Error executing template: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Html(page).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{app_state, logged_in, FakeProvider};
    use audio_debug_core::domain::StoredObject;
    use chrono::{TimeDelta, Utc};
    use std::collections::HashMap;

    fn recent_object(uid: i64, transcript: &str) -> StoredObject {
        let at = Utc::now() - TimeDelta::hours(1);
        StoredObject {
            name: format!(
                "audio/users/{}/recording-{}.wav",
                uid,
                at.format("%Y-%m-%dT%H:%M:%S%.6f")
            ),
            metadata: HashMap::from([
                ("rebble-language".to_string(), "en".to_string()),
                ("rebble-transcript".to_string(), transcript.to_string()),
            ]),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_heartbeat() {
        assert_eq!(heartbeat_handler().await, "adm");
    }

    #[tokio::test]
    async fn test_root_redirects_to_recordings() {
        let response = root_handler().await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/recordings");
    }

    #[tokio::test]
    async fn test_anonymous_user_is_sent_to_login() {
        let state = app_state(FakeProvider::with_uid(42), vec![]);

        let response = recordings_handler(State(state), HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");
    }

    #[tokio::test]
    async fn test_logged_in_user_sees_own_recordings() {
        let state = app_state(
            FakeProvider::with_uid(42),
            vec![recent_object(42, "aGVsbG8gd29ybGQ="), recent_object(7, "c2VjcmV0")],
        );
        let headers = logged_in(&state, 42).await;

        let response = recordings_handler(State(state), headers).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("hello world"));
        assert!(!html.contains("secret"));
    }

    #[tokio::test]
    async fn test_empty_listing_renders_page() {
        let state = app_state(FakeProvider::with_uid(42), vec![]);
        let headers = logged_in(&state, 42).await;

        let response = recordings_handler(State(state), headers).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response)
            .await
            .contains("No recordings in the last 24 hours."));
    }
}
