//! Dashboard HTTP Server
//!
//! Axum server: pages, JSON API, embedded static assets, the raw data-file
//! dump and graceful shutdown.

use crate::config::Config;
use crate::dashboard::api::{api_router, AppState};
use crate::dashboard::auth::SessionStore;
use crate::dashboard::pages;
use crate::store::TopologyStore;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::Embed;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Embedded static files (scripts, styles)
#[derive(Embed)]
#[folder = "src/dashboard/static/"]
struct StaticAssets;

/// Dashboard server
pub struct DashboardServer {
    config: Config,
    state: AppState,
}

impl DashboardServer {
    /// Create a new dashboard server with the given configuration
    pub fn new(config: Config) -> Self {
        let store = TopologyStore::new(config.data_file.clone());
        let sessions = SessionStore::new(&config.secret_key, config.dashboard.secure_cookies);

        Self {
            state: AppState::new(store, sessions),
            config,
        }
    }

    /// Shared handler state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes and middleware
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/", get(pages::index_page))
            .route("/login", get(pages::login_page))
            .route("/device/{id}", get(pages::device_page))
            .route("/data/{filename}", get(data_file_handler))
            .route("/static/{*path}", get(static_handler))
            .with_state(self.state.clone())
            .nest("/api", api_router(self.state.clone()));

        if self.config.dashboard.log_requests {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server and run until shutdown signal
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.dashboard.socket_addr();
        let router = self.router();

        info!("Starting netinv on {}", addr);
        info!("Topology file: {}", self.config.data_file.display());

        if !self.config.dashboard.is_localhost() {
            warn!("Bound to {} - login is a mock gate, not access control", addr);
        }

        info!("Dashboard available at {}", self.config.dashboard.base_url());

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shut down gracefully");
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// GET /data/{filename} - raw topology file, only under its own name
async fn data_file_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    if state.store.file_name() != Some(filename.as_str()) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match state.store.read_raw().await {
        Ok(Some(bytes)) => {
            let mime = mime_guess::from_path(&filename)
                .first_or_text_plain()
                .to_string();

            ([(header::CONTENT_TYPE, mime)], Body::from(bytes)).into_response()
        }
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("Failed to read topology file: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Serve static files from embedded assets
async fn static_handler(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');

    if path.contains("..") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string();

            (
                [
                    (header::CONTENT_TYPE, mime),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                Body::from(content.data.into_owned()),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
