//! In-memory port implementations shared by the unit tests.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::{AccessToken, AuthIdentity, Session, StoredObject};
use crate::ports::{
    IdentityProvider, ObjectStore, ObjectStream, PortError, PortResult, SessionStore,
};

#[derive(Default)]
pub struct MemorySessions {
    saved: Mutex<HashMap<String, Session>>,
    fail: AtomicBool,
    rotations: AtomicUsize,
}

impl MemorySessions {
    pub fn get(&self, id: &str) -> Option<Session> {
        self.saved.lock().unwrap().get(id).cloned()
    }

    pub fn fail_saves(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn load(&self, id: Option<&str>) -> PortResult<Session> {
        Ok(id
            .and_then(|id| self.get(id))
            .unwrap_or_else(|| Session::new("fresh")))
    }

    async fn save(&self, session: &Session) -> PortResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("session backend offline".to_string()));
        }
        self.saved
            .lock()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn rotate(&self, session: &mut Session) -> PortResult<()> {
        let n = self.rotations.fetch_add(1, Ordering::SeqCst);
        self.saved.lock().unwrap().remove(&session.id);
        session.id = format!("rotated-{}", n);
        Ok(())
    }
}

pub enum ProfileReply {
    Uid(i64),
    Status(u16, String),
}

pub struct FakeProvider {
    pub fail_exchange: bool,
    pub profile: ProfileReply,
}

impl FakeProvider {
    pub fn with_uid(uid: i64) -> Self {
        Self {
            fail_exchange: false,
            profile: ProfileReply::Uid(uid),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://auth.example/oauth/authorize?scope=profile&state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> PortResult<AccessToken> {
        if self.fail_exchange {
            return Err(PortError::UpstreamStatus {
                status: 400,
                body: "invalid_grant".to_string(),
            });
        }
        Ok(AccessToken(format!("token-for-{}", code)))
    }

    async fn fetch_identity(&self, _token: &AccessToken) -> PortResult<AuthIdentity> {
        match &self.profile {
            ProfileReply::Uid(uid) => Ok(AuthIdentity {
                uid: *uid,
                display_name: "Test User".to_string(),
                scopes: BTreeSet::from(["profile".to_string()]),
            }),
            ProfileReply::Status(status, body) => Err(PortError::UpstreamStatus {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

/// Serves a fixed object list, filtered by prefix, in the order given.
#[derive(Default)]
pub struct FakeStore {
    pub objects: Vec<StoredObject>,
    /// Names whose signing fails.
    pub unsignable: HashSet<String>,
    /// Yield an enumeration error after this many objects.
    pub fail_after: Option<usize>,
    pub list_calls: AtomicUsize,
    pub last_prefix: Mutex<Option<String>>,
    pub last_ttl: Mutex<Option<Duration>>,
}

impl FakeStore {
    pub fn new(objects: Vec<StoredObject>) -> Self {
        Self {
            objects,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn list(&self, prefix: &str) -> PortResult<ObjectStream> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prefix.lock().unwrap() = Some(prefix.to_string());

        let mut items: Vec<PortResult<StoredObject>> = self
            .objects
            .iter()
            .filter(|o| o.name.starts_with(prefix))
            .cloned()
            .map(Ok)
            .collect();
        if let Some(n) = self.fail_after {
            items.truncate(n);
            items.push(Err(PortError::Unexpected("listing interrupted".to_string())));
        }
        Ok(Box::pin(futures::stream::iter(items)))
    }

    async fn signed_url(&self, name: &str, ttl: Duration) -> PortResult<String> {
        *self.last_ttl.lock().unwrap() = Some(ttl);
        if self.unsignable.contains(name) {
            return Err(PortError::Unexpected("signing key unavailable".to_string()));
        }
        Ok(format!("https://signed.example/{}", name))
    }
}
