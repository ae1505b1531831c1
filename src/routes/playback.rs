use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method},
    response::Response,
};
use std::sync::Arc;

use crate::services::relay::{self, RelayError};
use crate::telemetry;
use crate::AppState;

/// GET|HEAD /playback/:prefix/:target - Relay a provider's media URL
///
/// `target` is the base64 media URL, usually with a `.m3u8` suffix.
pub async fn relay_playback(
    State(state): State<Arc<AppState>>,
    Path((prefix, target)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, RelayError> {
    let media_url = relay::decode_target(&target)
        .and_then(|decoded| relay::validate_target(&decoded))
        .map_err(|e| {
            tracing::error!(
                tag = telemetry::STREAM,
                prefix = %prefix,
                target = %target,
                error = %e,
                "Invalid playback target"
            );
            e
        })?;

    tracing::info!(
        tag = telemetry::STREAM,
        prefix = %prefix,
        method = %method,
        url = %media_url,
        "Playback requested"
    );

    let injected = match state.scrapers.provider_for_prefix(&prefix) {
        Some(provider) => provider.relay_headers(),
        None => {
            tracing::debug!(
                tag = telemetry::STREAM,
                prefix = %prefix,
                "Unknown provider prefix, relaying without extra headers"
            );
            Vec::new()
        }
    };

    relay::relay(&method, &media_url, &headers, &injected)
        .await
        .map_err(|e| {
            tracing::error!(
                tag = telemetry::STREAM,
                url = %media_url,
                error = %e,
                "Playback relay failed"
            );
            e
        })
}
