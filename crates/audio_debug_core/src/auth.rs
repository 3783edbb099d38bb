//! crates/audio_debug_core/src/auth.rs
//!
//! The OAuth2 authorization-code login flow: CSRF state handling, code exchange,
//! profile lookup and binding the verified uid to the session.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::{AccessToken, AuthIdentity, Session};
use crate::ports::{IdentityProvider, PortError, SessionStore};

/// Bytes of entropy in a login state token.
pub const STATE_TOKEN_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid state")]
    InvalidState,
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(#[source] PortError),
    #[error("Failed to get user info: {0}")]
    UserInfoFailed(#[source] PortError),
    #[error("Invalid user id")]
    InvalidIdentity,
    #[error("Session store error: {0}")]
    Session(#[source] PortError),
}

/// Drives the login flow against an [`IdentityProvider`], persisting through a [`SessionStore`].
#[derive(Clone)]
pub struct Authenticator {
    provider: Arc<dyn IdentityProvider>,
    sessions: Arc<dyn SessionStore>,
}

impl Authenticator {
    pub fn new(provider: Arc<dyn IdentityProvider>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { provider, sessions }
    }

    /// Starts a login attempt.
    ///
    /// Stores a fresh state token in the session (replacing any earlier one), saves the
    /// session and returns the provider URL the browser should be sent to.
    pub async fn begin_login(&self, session: &mut Session) -> Result<String, AuthError> {
        let state = generate_state_token();
        session.oauth_state = Some(state.clone());
        self.sessions.save(session).await.map_err(AuthError::Session)?;
        Ok(self.provider.authorize_url(&state))
    }

    /// Finishes a login attempt from the provider's callback.
    ///
    /// A state mismatch leaves the session untouched. Once the state matches it is consumed,
    /// and the consumed state is persisted even if a later step fails. `uid` and
    /// `oauth_token` are only written when every step succeeds, and then under a new
    /// session id so that an id known before login never becomes authenticated.
    pub async fn complete_login(
        &self,
        session: &mut Session,
        received_state: &str,
        code: &str,
    ) -> Result<AuthIdentity, AuthError> {
        match session.oauth_state.as_deref() {
            Some(expected) if expected == received_state => {}
            _ => {
                warn!("OAuth callback with mismatched state");
                return Err(AuthError::InvalidState);
            }
        }
        session.oauth_state = None;

        match self.verify(code).await {
            Ok((token, identity)) => {
                if let Err(e) = self.sessions.rotate(session).await {
                    self.persist_consumed_state(session).await;
                    return Err(AuthError::Session(e));
                }
                session.oauth_token = Some(token.0);
                session.uid = Some(identity.uid);
                self.sessions.save(session).await.map_err(AuthError::Session)?;
                info!(uid = identity.uid, name = %identity.display_name, "User logged in");
                Ok(identity)
            }
            Err(e) => {
                self.persist_consumed_state(session).await;
                Err(e)
            }
        }
    }

    async fn persist_consumed_state(&self, session: &Session) {
        if let Err(save_err) = self.sessions.save(session).await {
            error!("Failed to persist consumed OAuth state: {}", save_err);
        }
    }

    async fn verify(&self, code: &str) -> Result<(AccessToken, AuthIdentity), AuthError> {
        let token = self
            .provider
            .exchange_code(code)
            .await
            .map_err(AuthError::TokenExchangeFailed)?;

        let identity = self.provider.fetch_identity(&token).await.map_err(|e| {
            if let PortError::UpstreamStatus { status, body } = &e {
                error!(status = *status, "content: {}", body);
            }
            AuthError::UserInfoFailed(e)
        })?;

        if identity.uid == 0 {
            return Err(AuthError::InvalidIdentity);
        }
        Ok((token, identity))
    }
}

/// 32 bytes from the OS RNG, URL-safe base64 without padding.
pub fn generate_state_token() -> String {
    let mut buf = [0u8; STATE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}
