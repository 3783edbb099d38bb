pub mod auth;
pub mod recordings;
pub mod render;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_support;

// Re-export the handlers so the binary can build the router in one place.
pub use auth::{callback_handler, login_handler};
pub use recordings::{heartbeat_handler, recordings_handler, root_handler};
