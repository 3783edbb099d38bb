//! services/adm/src/bin/adm.rs

use adm_lib::{
    adapters::{MemorySessionStore, RebbleOAuthAdapter, S3ObjectStoreAdapter},
    config::Config,
    error::ApiError,
    web::{
        callback_handler, heartbeat_handler, login_handler, recordings_handler,
        render::Renderer, root_handler, state::AppState,
    },
};
use audio_debug_core::ports::SessionStore;
use audio_debug_core::{Authenticator, RecordingLister};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;
    let identity_provider = Arc::new(RebbleOAuthAdapter::new(http_client, config.oauth.clone()));

    info!(bucket = %config.storage.bucket, "Connecting to object storage...");
    let object_store =
        Arc::new(S3ObjectStoreAdapter::from_config(&config.storage, config.http_timeout).await);

    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(config.session_ttl));

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        authenticator: Authenticator::new(identity_provider, sessions.clone()),
        lister: RecordingLister::new(object_store, config.storage.recordings_root.clone()),
        renderer: Arc::new(Renderer::new()?),
        sessions,
    });

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .route("/heartbeat", get(heartbeat_handler))
        .route("/", get(root_handler))
        .route("/auth/login", get(login_handler))
        .route("/auth/callback", get(callback_handler))
        .route("/recordings", get(recordings_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // --- 5. Start the Server ---
    info!("Listening on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}
