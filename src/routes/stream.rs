use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::models::StreamsResponse;
use crate::telemetry;
use crate::AppState;

/// GET /stream/:type/:id - Streams for an item (`id` carries the `.json` suffix)
pub async fn get_streams(
    State(state): State<Arc<AppState>>,
    Path((content_type, id)): Path<(String, String)>,
) -> Json<StreamsResponse> {
    let item_id = id.strip_suffix(".json").unwrap_or(&id);

    tracing::info!(
        tag = telemetry::API,
        content_type = %content_type,
        item_id = %item_id,
        "Streams requested"
    );

    let streams = state.scrapers.list_streams(item_id).await;
    Json(StreamsResponse { streams })
}
