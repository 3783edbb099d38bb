//! services/adm/src/adapters/oauth.rs
//!
//! This module contains the adapter for the Rebble authentication service.
//! It implements the `IdentityProvider` port from the `core` crate using the
//! OAuth2 authorization-code grant over `reqwest`.

use async_trait::async_trait;
use audio_debug_core::domain::{AccessToken, AuthIdentity};
use audio_debug_core::ports::{IdentityProvider, PortError, PortResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::OAuthConfig;

/// The only scope this application asks for.
pub const PROFILE_SCOPE: &str = "profile";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `IdentityProvider` port against the Rebble auth server.
#[derive(Clone)]
pub struct RebbleOAuthAdapter {
    client: Client,
    config: OAuthConfig,
}

impl RebbleOAuthAdapter {
    /// Creates a new `RebbleOAuthAdapter`. The client should carry a request timeout.
    pub fn new(client: Client, config: OAuthConfig) -> Self {
        Self { client, config }
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// The profile document returned by the user-info endpoint.
#[derive(Debug, Deserialize)]
pub struct RebbleProfile {
    #[serde(default)]
    pub boot_overrides: serde_json::Value,
    #[serde(default)]
    pub has_timeline: bool,
    #[serde(default)]
    pub is_subscribed: bool,
    #[serde(default)]
    pub is_wizard: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub timeline_ttl: i64,
    /// Zero when the server omits it.
    #[serde(default)]
    pub uid: i64,
}

impl RebbleProfile {
    fn to_domain(self) -> AuthIdentity {
        AuthIdentity {
            uid: self.uid,
            display_name: self.name,
            scopes: self.scopes.into_iter().collect(),
        }
    }
}

async fn upstream_error(response: reqwest::Response) -> PortError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    PortError::UpstreamStatus { status, body }
}

//=========================================================================================
// `IdentityProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityProvider for RebbleOAuthAdapter {
    fn authorize_url(&self, state: &str) -> String {
        let separator = if self.config.auth_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            self.config.auth_url,
            separator,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_url),
            urlencoding::encode(PROFILE_SCOPE),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> PortResult<AccessToken> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| PortError::Malformed(e.to_string()))?;

        if token.access_token.is_empty() {
            return Err(PortError::Malformed(
                "server response missing access_token".to_string(),
            ));
        }
        Ok(AccessToken(token.access_token))
    }

    async fn fetch_identity(&self, token: &AccessToken) -> PortResult<AuthIdentity> {
        let response = self
            .client
            .get(&self.config.user_info_url)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let profile = response
            .json::<RebbleProfile>()
            .await
            .map_err(|e| PortError::Malformed(format!("decoding auth info failed: {}", e)))?;

        Ok(profile.to_domain())
    }
}
