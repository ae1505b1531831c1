use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::{BehaviorHints, ContentType, Manifest};
use crate::telemetry;
use crate::AppState;

/// GET /manifest.json - Addon descriptor
pub async fn get_manifest(State(state): State<Arc<AppState>>) -> Json<Manifest> {
    tracing::info!(tag = telemetry::API, "Manifest requested");
    Json(build_manifest(&state))
}

/// Identity comes from config, catalogs from the scraper registry
pub fn build_manifest(state: &AppState) -> Manifest {
    let config = &state.config;

    Manifest {
        id: config.addon_id.clone(),
        version: config.addon_version.clone(),
        name: config.addon_name.clone(),
        description: config.addon_description.clone(),
        logo: config.addon_logo.clone(),
        background: config.addon_background.clone(),
        resources: vec!["catalog".to_string(), "stream".to_string()],
        types: vec![ContentType::Movie, ContentType::Series],
        catalogs: state.scrapers.catalogs(),
        behavior_hints: BehaviorHints {
            adult: true,
            configurable: false,
            configuration_required: false,
        },
    }
}
