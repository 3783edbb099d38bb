//! services/adm/src/adapters/session_store.rs
//!
//! A server-side session store held in process memory. It implements the
//! `SessionStore` port from the core crate; the browser only ever sees the
//! random session id in its cookie.

use async_trait::async_trait;
use audio_debug_core::domain::Session;
use audio_debug_core::ports::{PortResult, SessionStore};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// How long a session that has not logged in yet is kept.
pub const PENDING_SESSION_TTL: Duration = Duration::from_secs(10 * 60);
/// Upper bound on sessions that have not logged in yet.
pub const MAX_PENDING_SESSIONS: usize = 10_000;

struct Entry {
    session: Session,
    expires_at: Instant,
}

/// An in-memory session store. Logged-in sessions expire `ttl` after their last save;
/// sessions without a uid live for a much shorter time and are capped in number.
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
    pending_ttl: Duration,
    max_pending: usize,
}

impl MemorySessionStore {
    /// Creates a new `MemorySessionStore`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            pending_ttl: PENDING_SESSION_TTL.min(ttl),
            max_pending: MAX_PENDING_SESSIONS,
        }
    }

    /// Overrides the lifetime and the cap for sessions that have not logged in.
    pub fn with_pending_limits(mut self, pending_ttl: Duration, max_pending: usize) -> Self {
        self.pending_ttl = pending_ttl.min(self.ttl);
        self.max_pending = max_pending;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored sessions, expired ones included until the next save prunes them.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn new_session_id() -> String {
        let mut buf = [0u8; 32];
        OsRng.fill_bytes(&mut buf);
        URL_SAFE_NO_PAD.encode(buf)
    }
}

/// Drops the pending entry closest to expiry until a new one fits under `max_pending`.
fn evict_pending(entries: &mut HashMap<String, Entry>, max_pending: usize) {
    loop {
        let pending = entries.values().filter(|e| e.session.uid.is_none()).count();
        if pending < max_pending {
            return;
        }
        let oldest = entries
            .iter()
            .filter(|(_, e)| e.session.uid.is_none())
            .min_by_key(|(_, e)| e.expires_at)
            .map(|(id, _)| id.clone());
        match oldest {
            Some(id) => {
                entries.remove(&id);
                debug!("Evicted pending session over capacity");
            }
            None => return,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Option<&str>) -> PortResult<Session> {
        if let Some(id) = id {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(id) {
                if entry.expires_at > Instant::now() {
                    return Ok(entry.session.clone());
                }
            }
        }
        Ok(Session::new(Self::new_session_id()))
    }

    async fn save(&self, session: &Session) -> PortResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        if entries.len() < before {
            debug!(pruned = before - entries.len(), "Pruned expired sessions");
        }

        let ttl = if session.is_authenticated() {
            self.ttl
        } else {
            if !entries.contains_key(&session.id) {
                evict_pending(&mut entries, self.max_pending);
            }
            self.pending_ttl
        };
        entries.insert(
            session.id.clone(),
            Entry {
                session: session.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn rotate(&self, session: &mut Session) -> PortResult<()> {
        self.entries.write().await.remove(&session.id);
        session.id = Self::new_session_id();
        Ok(())
    }
}
