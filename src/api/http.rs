// SPDX-License-Identifier: GPL-3.0-only
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{StatusCode, Uri},
    routing::get,
    Json, Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::api::error::ApiError;
use crate::api::handlers::{ApiHandlers, ApiResponse, PageParams};
use crate::config::Config;
use crate::registry::SpotRegistry;
use crate::store::{Page, SpotInput, SpotRecord};

pub struct HttpServer {
    handlers: ApiHandlers,
    addr: SocketAddr,
}

impl HttpServer {
    pub fn new(registry: SpotRegistry, config: &Config) -> Self {
        Self {
            handlers: ApiHandlers::new(registry, config),
            addr: config.api_bind,
        }
    }

    pub fn router(handlers: Arc<ApiHandlers>) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/parking-spot", get(list_spots_handler).post(create_spot_handler))
            .route(
                "/parking-spot/:id",
                get(get_spot_handler)
                    .put(update_spot_handler)
                    .delete(delete_spot_handler),
            )
            .layer(CorsLayer::permissive())
            .with_state(handlers)
    }

    /// Serve until `shutdown` resolves, then let in-flight requests finish
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = Self::router(Arc::new(self.handlers));

        info!(addr = %self.addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

async fn health_handler() -> Json<ApiResponse<&'static str>> {
    ApiHandlers::health().await
}

async fn list_spots_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    uri: Uri,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Page<SpotRecord>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()).at(&uri))?;
    handlers.list_spots(params).await.map_err(|e| e.at(&uri))
}

async fn get_spot_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    uri: Uri,
    Path(id): Path<String>,
) -> Result<Json<SpotRecord>, ApiError> {
    handlers.get_spot(&id).await.map_err(|e| e.at(&uri))
}

async fn create_spot_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    uri: Uri,
    payload: Result<Json<SpotInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SpotRecord>), ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::bad_request(e.body_text()).at(&uri))?;
    handlers.create_spot(input).await.map_err(|e| e.at(&uri))
}

async fn update_spot_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    uri: Uri,
    Path(id): Path<String>,
    payload: Result<Json<SpotInput>, JsonRejection>,
) -> Result<Json<SpotRecord>, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::bad_request(e.body_text()).at(&uri))?;
    handlers.update_spot(&id, input).await.map_err(|e| e.at(&uri))
}

async fn delete_spot_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    uri: Uri,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    handlers.delete_spot(&id).await.map_err(|e| e.at(&uri))
}
