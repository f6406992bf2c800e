//! # GEOPROXY API Server
//!
//! HTTP front for the cache-first geocoding pipeline.
//!
//! ## Endpoints
//!
//! - `GET /geocode?address=...` - Geocode an address (`X-Cache: HIT|MISS`)
//! - `GET /health` - Liveness and configuration summary
//!
//! ## Example
//!
//! ```rust,ignore
//! use geoproxy_api::{ApiServer, ApiConfig};
//!
//! let server = ApiServer::from_config(ApiConfig::from_env()).await?;
//! server.run(([0, 0, 0, 0], 8080)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod routes;
mod handlers;
mod state;
mod dto;
mod error;

pub use routes::create_router;
pub use state::{AppState, ApiConfig};
pub use error::ApiError;
pub use dto::HealthResponse;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// API server for GEOPROXY.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server around prepared state.
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Builds store, provider and handler from the config.
    pub async fn from_config(config: ApiConfig) -> geoproxy_core::Result<Self> {
        Ok(Self::new(AppState::from_config(config).await?))
    }

    /// Creates the router with all routes and layers configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(CatchPanicLayer::custom(error::panic_response))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("GEOPROXY API server listening on {}", addr);

        axum::serve(listener, self.router()).await
    }
}
