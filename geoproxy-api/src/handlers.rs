//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use geoproxy_core::constants::CACHE_STATUS_HEADER;
use geoproxy_core::types::LookupRequest;

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /geocode?address=...
///
/// 200 with the provider JSON and `X-Cache: HIT|MISS`, 400 for a missing
/// address, 500 when the provider fails. Percent-escapes that are not valid
/// UTF-8 decode to U+FFFD rather than being rejected.
pub async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeParams>,
) -> Result<Response> {
    let request = LookupRequest::new(params.address);
    let response = state.handler.handle(&request).await?;

    debug!(cache = %response.cache_status, bytes = response.body.len(), "Geocode served");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (HeaderName::from_static(CACHE_STATUS_HEADER), response.cache_status.as_str()),
        ],
        response.body,
    )
        .into_response())
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        cache_ttl_days: state.config.cache_ttl_days,
        single_flight: state.handler.is_single_flight(),
    })
}
