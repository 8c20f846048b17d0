//! Batch fetch endpoint.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::header,
    response::{IntoResponse, Response},
};
use fanout_core::{AggregateResponse, BatchRequest};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::ApiError;
use super::middleware::RequestCancellation;
use crate::state::AppState;

/// POST / with a JSON array of URLs.
///
/// Responds 200 with `{ url: body }` when no URL failed hard, 500 with
/// `Error: <cause>` otherwise. Input is validated before anything is fetched.
pub async fn fetch_batch(
    State(state): State<Arc<AppState>>,
    RequestCancellation(cancel): RequestCancellation,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body.map_err(|e| ApiError::BodyRead(e.body_text()))?;

    let urls: Vec<String> = serde_json::from_slice(&body).map_err(|e| {
        warn!("Body unmarshal error, {}", e);
        ApiError::BadRequest(format!("Invalid request body: {}", e))
    })?;

    let batch = BatchRequest::new(urls, state.config().batch.max_urls).map_err(|e| {
        warn!("{}", e);
        ApiError::from(e)
    })?;

    info!(urls = batch.len(), "Starting batch");
    let aggregate = state.dispatcher().dispatch(&batch, &cancel).await?;

    render(&aggregate)
}

fn render(aggregate: &AggregateResponse) -> Result<Response, ApiError> {
    let body = aggregate.to_json()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
