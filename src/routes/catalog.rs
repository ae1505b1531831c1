use axum::{
    extract::{Path, RawPathParams, State},
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use url::form_urlencoded;

use crate::models::MetasResponse;
use crate::telemetry;
use crate::AppState;

const JSON_SUFFIX: &str = ".json";

/// Parse Stremio's raw (still percent-encoded) extra segment, e.g. `search=foo&skip=0`.
///
/// Only literal `&` separates pairs; `%26` inside a value stays part of it.
/// Parts without `=` are ignored.
pub fn parse_extra(raw_extra: &str) -> HashMap<String, String> {
    raw_extra
        .strip_suffix(JSON_SUFFIX)
        .unwrap_or(raw_extra)
        .split('&')
        .filter(|part| part.contains('='))
        .flat_map(|part| form_urlencoded::parse(part.as_bytes()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// GET /catalog/:type/:id/:extra - Search a catalog
pub async fn search_catalog(
    State(state): State<Arc<AppState>>,
    Path((content_type, catalog_id, _)): Path<(String, String, String)>,
    raw_params: RawPathParams,
) -> Json<MetasResponse> {
    // axum's Path has already decoded `%26`, so split the raw segment instead
    let raw_extra = raw_params
        .iter()
        .find(|(key, _)| *key == "extra")
        .map(|(_, value)| value)
        .unwrap_or_default();
    let extra = parse_extra(raw_extra);
    let query = extra
        .get("search")
        .map(|q| q.trim())
        .unwrap_or_default();

    tracing::info!(
        tag = telemetry::API,
        content_type = %content_type,
        catalog_id = %catalog_id,
        query = %query,
        "Catalog requested"
    );

    if query.is_empty() {
        return Json(MetasResponse::default());
    }

    let metas = state.scrapers.search_catalog(&catalog_id, query).await;
    Json(MetasResponse { metas })
}

/// GET /catalog/:type/:id - Catalogs require a search, so this is always empty
pub async fn browse_catalog(
    Path((_content_type, catalog_id)): Path<(String, String)>,
) -> Json<MetasResponse> {
    tracing::debug!(
        tag = telemetry::API,
        catalog_id = %catalog_id.trim_end_matches(JSON_SUFFIX),
        "Catalog requested without search"
    );
    Json(MetasResponse::default())
}
