//! crates/audio_debug_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any HTTP framework, storage SDK or serialization format.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeSet, HashMap};

/// Integer identity of an end user at the identity provider. Zero means "absent".
pub type Uid = i64;

/// A browser session as seen by the core.
///
/// The session store owns persistence and expiry; the core only reads and writes
/// these fields and asks the store to save them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    /// CSRF nonce for the login attempt in flight. Single-use.
    pub oauth_state: Option<String>,
    /// Raw access token from the last successful login.
    pub oauth_token: Option<String>,
    pub uid: Option<Uid>,
}

impl Session {
    /// Creates an empty session with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.uid.is_some()
    }
}

/// An OAuth2 access token returned by the provider's token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn secret(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs.
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// The verified identity returned by the provider's profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub uid: Uid,
    pub display_name: String,
    pub scopes: BTreeSet<String>,
}

/// One object as enumerated by the object store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredObject {
    pub name: String,
    pub metadata: HashMap<String, String>,
}

/// A render-ready projection of one stored recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    pub timestamp: DateTime<Utc>,
    /// Time elapsed since `timestamp`, rounded to whole seconds.
    pub age: TimeDelta,
    pub url: String,
    pub language: String,
    pub transcript: String,
}

/// The recordings of one user inside the recency window, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSet {
    pub uid: Uid,
    pub recordings: Vec<Recording>,
}

impl RecordingSet {
    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }
}
