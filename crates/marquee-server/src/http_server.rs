// Copyright 2025 Marquee Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP server for the review service.
//!
//! Wires the catalog client, the in-memory stores, the review service and
//! the metrics collector together and serves [`build_router`] with axum.
//!
//! # Example
//!
//! ```no_run
//! use marquee_server::{HttpServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let bind = config.bind;
//!     HttpServer::new(config)?.run(bind).await?;
//!     Ok(())
//! }
//! ```

use crate::config::ServerConfig;
use crate::http_router::{build_router, AppState};
use crate::service::ReviewService;
use crate::store::{InMemoryRatingCacheStore, InMemoryReviewStore};
use marquee_client::MovieServiceClient;
use marquee_common::Result;
use marquee_metrics::{MetricsCollector, ServiceMetricsCollector};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Builds a server with in-memory stores and an HTTP catalog client.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let metrics: Arc<dyn MetricsCollector> = Arc::new(ServiceMetricsCollector::new());
        let catalog = MovieServiceClient::new(config.catalog)?.with_metrics(metrics.clone());
        Ok(Self::with_catalog(catalog, metrics))
    }

    /// Builds a server over an existing catalog client. The client should
    /// report to the same `metrics` collector.
    pub fn with_catalog(catalog: MovieServiceClient, metrics: Arc<dyn MetricsCollector>) -> Self {
        let service = ReviewService::new(
            Arc::new(InMemoryReviewStore::new()),
            Arc::new(InMemoryRatingCacheStore::new()),
            catalog,
        )
        .with_metrics(metrics.clone());
        Self::from_state(AppState::new(Arc::new(service), metrics))
    }

    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The full application with CORS applied.
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone()).layer(CorsLayer::permissive())
    }

    /// Binds `addr` and serves until the process exits.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .inspect_err(|e| error!("Failed to bind to {}: {}", addr, e))?;
        self.serve(listener).await
    }

    /// Serves on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let local = listener.local_addr()?;
        info!("Review service listening on {}", local);

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
