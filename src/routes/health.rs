use axum::{extract::State, response::Html, response::IntoResponse, Json};
use std::sync::Arc;

use crate::AppState;

/// GET / - Installation page
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(render_install_page(&state))
}

/// GET /health - Always ok while the process serves requests
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn render_install_page(state: &AppState) -> String {
    let config = &state.config;
    let manifest_url = format!("{}/manifest.json", config.public_url());

    // stremio:// links drop the http(s) scheme
    let install_url = format!(
        "stremio://{}",
        manifest_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{name}</title>
  <style>
    body {{ font-family: sans-serif; background: #111 url('{background}') center/cover; color: #eee; text-align: center; padding: 3rem 1rem; }}
    main {{ background: rgba(0, 0, 0, 0.75); display: inline-block; padding: 2rem; border-radius: 12px; max-width: 36rem; }}
    a.button {{ display: inline-block; margin: 1rem 0; padding: 0.75rem 1.5rem; background: #ff4500; color: #fff; border-radius: 8px; text-decoration: none; }}
    code {{ word-break: break-all; }}
  </style>
</head>
<body>
  <main>
    <img src="{logo}" alt="{name}" width="96">
    <h1>{name} <small>v{version}</small></h1>
    <p>{description}</p>
    <a class="button" href="{install_url}">Install in Stremio</a>
    <p>Or add this manifest URL in Stremio's addon search:</p>
    <p><code>{manifest_url}</code></p>
  </main>
</body>
</html>
"#,
        name = config.addon_name,
        version = config.addon_version,
        description = config.addon_description,
        logo = config.addon_logo,
        background = config.addon_background,
        install_url = install_url,
        manifest_url = manifest_url,
    )
}
