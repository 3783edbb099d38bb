//! crates/audio_debug_core/src/recordings.rs
//!
//! Enumerates a user's debug recordings, decodes their metadata, drops anything
//! outside the recency window and signs a short-lived download URL for the rest.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::domain::{Recording, RecordingSet, Session, StoredObject, Uid};
use crate::ports::{ObjectStore, PortError};

pub const SIGNED_URL_TTL: Duration = Duration::from_secs(30 * 60);
pub const RECENCY_WINDOW: TimeDelta = TimeDelta::hours(24);

pub const LANGUAGE_KEY: &str = "rebble-language";
pub const TRANSCRIPT_KEY: &str = "rebble-transcript";

pub const UNKNOWN_LANGUAGE: &str = "(unknown)";
pub const NO_TRANSCRIPT: &str = "(no transcript)";
pub const UNDECODABLE_TRANSCRIPT: &str = "(error decoding transcript)";

const FILE_SUFFIX: &str = ".wav";
const TIMESTAMP_LAYOUT: &str = "recording-%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    /// The session carries no uid; the caller should send the user to login.
    #[error("Not logged in")]
    Unauthenticated,
    #[error("Failed to list recordings: {0}")]
    StoreEnumerationFailed(#[source] PortError),
}

#[derive(Clone)]
pub struct RecordingLister {
    store: Arc<dyn ObjectStore>,
    root: String,
}

impl RecordingLister {
    /// `root` is the key prefix under which the `users/` tree lives, e.g. `audio`.
    pub fn new(store: Arc<dyn ObjectStore>, root: impl Into<String>) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    /// The object-name prefix shared by every recording of `uid`.
    pub fn prefix_for(&self, uid: Uid) -> String {
        let root = self.root.trim_end_matches('/');
        if root.is_empty() {
            format!("users/{}/recording-", uid)
        } else {
            format!("{}/users/{}/recording-", root, uid)
        }
    }

    pub async fn list_recordings(&self, session: &Session) -> Result<RecordingSet, ListError> {
        self.list_recordings_at(session, Utc::now()).await
    }

    /// Lists the session user's recordings as seen at `now`.
    ///
    /// Objects that cannot be signed are skipped; a failing enumeration aborts the
    /// whole listing.
    pub async fn list_recordings_at(
        &self,
        session: &Session,
        now: DateTime<Utc>,
    ) -> Result<RecordingSet, ListError> {
        let uid = session.uid.ok_or(ListError::Unauthenticated)?;
        let prefix = self.prefix_for(uid);

        let mut objects = self.store.list(&prefix).await.map_err(|e| {
            error!(uid = uid, "Failed to list recordings: {}", e);
            ListError::StoreEnumerationFailed(e)
        })?;

        let mut recordings = Vec::new();
        while let Some(object) = objects.next().await {
            let object = object.map_err(|e| {
                error!(uid = uid, "Recording enumeration aborted: {}", e);
                ListError::StoreEnumerationFailed(e)
            })?;
            if let Some(recording) = self.project(&object, now).await {
                recordings.push(recording);
            }
        }

        // Stores enumerate oldest first; sort anyway in case this one does not.
        recordings.reverse();
        recordings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        info!(uid = uid, count = recordings.len(), "Listed recordings");
        Ok(RecordingSet { uid, recordings })
    }

    async fn project(&self, object: &StoredObject, now: DateTime<Utc>) -> Option<Recording> {
        let timestamp = parse_timestamp(&object.name).unwrap_or_else(|| {
            debug!(object = %object.name, "Unparseable recording timestamp");
            DateTime::<Utc>::UNIX_EPOCH
        });
        let age = now - timestamp;
        if age >= RECENCY_WINDOW {
            return None;
        }

        let url = match self.store.signed_url(&object.name, SIGNED_URL_TTL).await {
            Ok(url) => url,
            Err(e) => {
                debug!(object = %object.name, "Skipping unsignable recording: {}", e);
                return None;
            }
        };

        Some(Recording {
            timestamp,
            age: round_to_seconds(age),
            url,
            language: object
                .metadata
                .get(LANGUAGE_KEY)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
            transcript: decode_transcript(object.metadata.get(TRANSCRIPT_KEY).map(String::as_str)),
        })
    }
}

/// Extracts the capture time from an object name like
/// `audio/users/42/recording-2024-01-01T10:00:00.000000.wav`.
pub fn parse_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let base = name.rsplit('/').next().unwrap_or(name);
    let stem = base.strip_suffix(FILE_SUFFIX).unwrap_or(base);
    NaiveDateTime::parse_from_str(stem, TIMESTAMP_LAYOUT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Decodes the base64 transcript metadata value, falling back to a display label.
pub fn decode_transcript(value: Option<&str>) -> String {
    match value {
        None => NO_TRANSCRIPT.to_string(),
        Some(encoded) => match STANDARD.decode(encoded) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => UNDECODABLE_TRANSCRIPT.to_string(),
        },
    }
}

fn round_to_seconds(delta: TimeDelta) -> TimeDelta {
    let millis = delta.num_milliseconds();
    let secs = if millis >= 0 {
        (millis + 500) / 1000
    } else {
        (millis - 500) / 1000
    };
    TimeDelta::seconds(secs)
}
