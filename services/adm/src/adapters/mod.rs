pub mod oauth;
pub mod object_store;
pub mod session_store;

pub use oauth::RebbleOAuthAdapter;
pub use object_store::S3ObjectStoreAdapter;
pub use session_store::MemorySessionStore;
