//! Fakes and builders for handler tests.

use async_trait::async_trait;
use audio_debug_core::domain::{AccessToken, AuthIdentity, StoredObject};
use audio_debug_core::ports::{
    IdentityProvider, ObjectStore, ObjectStream, PortResult, SessionStore,
};
use audio_debug_core::{Authenticator, RecordingLister};
use axum::http::{header, HeaderMap, HeaderValue};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::MemorySessionStore;
use crate::config::Config;
use crate::web::render::Renderer;
use crate::web::state::AppState;

pub struct FakeProvider {
    uid: i64,
}

impl FakeProvider {
    pub fn with_uid(uid: i64) -> Self {
        Self { uid }
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://auth.example/authorize?scope=profile&state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> PortResult<AccessToken> {
        Ok(AccessToken(format!("token-{}", code)))
    }

    async fn fetch_identity(&self, _token: &AccessToken) -> PortResult<AuthIdentity> {
        Ok(AuthIdentity {
            uid: self.uid,
            display_name: "Test User".to_string(),
            scopes: BTreeSet::from(["profile".to_string()]),
        })
    }
}

struct FakeStore {
    objects: Vec<StoredObject>,
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn list(&self, prefix: &str) -> PortResult<ObjectStream> {
        let items: Vec<PortResult<StoredObject>> = self
            .objects
            .iter()
            .filter(|o| o.name.starts_with(prefix))
            .cloned()
            .map(Ok)
            .collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }

    async fn signed_url(&self, name: &str, _ttl: Duration) -> PortResult<String> {
        Ok(format!("https://signed.example/{}", name))
    }
}

fn test_config() -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "OAUTH_CLIENT_ID" => "client",
            "OAUTH_CLIENT_SECRET" => "secret",
            "REBBLE_AUTH_URL" => "https://auth.example/authorize",
            "REBBLE_TOKEN_URL" => "https://auth.example/token",
            "REBBLE_USER_INFO_URL" => "https://auth.example/me",
            "OAUTH_CALLBACK_URL" => "https://adm.example/auth/callback",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

pub fn app_state(provider: FakeProvider, objects: Vec<StoredObject>) -> Arc<AppState> {
    let config = Arc::new(test_config());
    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(config.session_ttl));
    Arc::new(AppState {
        authenticator: Authenticator::new(Arc::new(provider), sessions.clone()),
        lister: RecordingLister::new(
            Arc::new(FakeStore { objects }),
            config.storage.recordings_root.clone(),
        ),
        renderer: Arc::new(Renderer::new().unwrap()),
        sessions,
        config,
    })
}

pub fn with_cookie(session_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("session={}", session_id)).unwrap(),
    );
    headers
}

/// Stores an authenticated session for `uid` and returns request headers carrying it.
pub async fn logged_in(state: &AppState, uid: i64) -> HeaderMap {
    let mut session = state.sessions.load(None).await.unwrap();
    session.uid = Some(uid);
    session.oauth_token = Some("token".to_string());
    state.sessions.save(&session).await.unwrap();
    with_cookie(&session.id)
}
