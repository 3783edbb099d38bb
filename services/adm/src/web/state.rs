//! services/adm/src/web/state.rs
//!
//! Defines the application's shared state, built once by the composition root.

use crate::config::Config;
use crate::web::render::Renderer;
use audio_debug_core::ports::SessionStore;
use audio_debug_core::{Authenticator, RecordingLister};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<dyn SessionStore>,
    pub authenticator: Authenticator,
    pub lister: RecordingLister,
    pub renderer: Arc<Renderer>,
}
