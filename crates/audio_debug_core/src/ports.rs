//! crates/audio_debug_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the session backend, the identity provider and the object store.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;

use crate::domain::{AccessToken, AuthIdentity, Session, StoredObject};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP, storage SDK).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The remote service answered with a non-success status.
    #[error("Upstream returned HTTP {status}")]
    UpstreamStatus { status: u16, body: String },
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// A lazily evaluated listing. An `Err` item aborts the enumeration.
pub type ObjectStream = Pin<Box<dyn Stream<Item = PortResult<StoredObject>> + Send>>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session for `id`, or a fresh one when the id is missing, unknown or expired.
    async fn load(&self, id: Option<&str>) -> PortResult<Session>;

    /// Persists every field of `session` under `session.id`.
    async fn save(&self, session: &Session) -> PortResult<()>;

    /// Moves `session` to a fresh random id and forgets the old one.
    /// The caller still has to `save` it under the new id.
    async fn rotate(&self, session: &mut Session) -> PortResult<()>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The authorization endpoint URL carrying client id, scope, redirect URI and `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> PortResult<AccessToken>;

    /// Fetches the profile of the token's owner.
    async fn fetch_identity(&self, token: &AccessToken) -> PortResult<AuthIdentity>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Enumerates all objects whose name starts with `prefix`, in ascending name order.
    async fn list(&self, prefix: &str) -> PortResult<ObjectStream>;

    /// Mints a read-only (GET) URL for `name` that stays valid for `ttl`.
    async fn signed_url(&self, name: &str, ttl: Duration) -> PortResult<String>;
}
