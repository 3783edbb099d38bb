pub mod auth;
pub mod domain;
pub mod ports;
pub mod recordings;

#[cfg(test)]
mod testing;

pub use auth::{AuthError, Authenticator};
pub use domain::{AccessToken, AuthIdentity, Recording, RecordingSet, Session, StoredObject, Uid};
pub use ports::{
    IdentityProvider, ObjectStore, ObjectStream, PortError, PortResult, SessionStore,
};
pub use recordings::{ListError, RecordingLister};
