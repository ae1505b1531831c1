use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;

pub mod catalog;
pub mod health;
pub mod manifest;
pub mod playback;
pub mod stream;

/// Build the addon router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Landing page & health
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Addon protocol
        .route("/manifest.json", get(manifest::get_manifest))
        .route("/catalog/:type/:id", get(catalog::browse_catalog))
        .route("/catalog/:type/:id/:extra", get(catalog::search_catalog))
        .route("/stream/:type/:id", get(stream::get_streams))
        // Playback relay (GET routes also answer HEAD)
        .route("/playback/:prefix/:target", get(playback::relay_playback))
        // Middleware
        .layer(middleware::from_fn(crate::middleware::log_requests))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{ContentType, MetaPreview, PosterShape, Stream};
    use crate::services::relay;
    use crate::services::scrapers::{MockProvider, ScraperManager};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use mockall::predicate::eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{header, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_provider() -> MockProvider {
        let mut provider = MockProvider::new();
        provider.expect_prefix().return_const("sxyprn");
        provider.expect_name().return_const("SXYPRN");
        provider
    }

    fn app(provider: MockProvider) -> Router {
        let config = Config {
            base_url: "https://addon.example.com".to_string(),
            ..Config::default()
        };
        let state = Arc::new(AppState {
            config,
            scrapers: ScraperManager::new(vec![Arc::new(provider)]),
        });
        create_router(state)
    }

    fn meta(id: &str) -> MetaPreview {
        MetaPreview {
            id: id.to_string(),
            content_type: ContentType::Movie,
            name: id.to_string(),
            poster: Some(format!("https://thumbs.example.com/{}.jpg", id)),
            poster_shape: PosterShape::Landscape,
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_check() {
        let mut provider = mock_provider();
        provider.expect_search().times(0);
        provider.expect_get_streams().times(0);

        let (status, body) = get(app(provider), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_manifest() {
        let (status, body) = get(app(mock_provider()), "/manifest.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resources"], json!(["catalog", "stream"]));
        assert_eq!(body["types"], json!(["movie", "series"]));
        assert_eq!(
            body["catalogs"],
            json!([{
                "type": "movie",
                "id": "goonio-sxyprn",
                "name": "SXYPRN",
                "extra": [{"name": "search", "isRequired": true}]
            }])
        );
        assert_eq!(
            body["behaviorHints"],
            json!({"adult": true, "configurable": false, "configurationRequired": false})
        );
    }

    #[tokio::test]
    async fn test_catalog_search_preserves_provider_order() {
        let mut provider = mock_provider();
        provider
            .expect_search()
            .with(eq("foo"))
            .times(1)
            .returning(|_| vec![meta("sxyprn_a"), meta("sxyprn_b")]);

        let (status, body) =
            get(app(provider), "/catalog/movie/goonio-sxyprn/search=foo.json").await;
        assert_eq!(status, StatusCode::OK);
        let metas = body["metas"].as_array().unwrap();
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0]["id"], "sxyprn_a");
        assert_eq!(metas[0]["type"], "movie");
        assert_eq!(metas[0]["posterShape"], "landscape");
        assert_eq!(metas[1]["id"], "sxyprn_b");
    }

    #[tokio::test]
    async fn test_catalog_percent_encoded_search() {
        let mut provider = mock_provider();
        provider
            .expect_search()
            .with(eq("big scene"))
            .times(1)
            .returning(|_| vec![meta("sxyprn_a")]);

        let uri = "/catalog/movie/goonio-sxyprn/search=big%20scene.json";
        let (_, body) = get(app(provider), uri).await;
        assert_eq!(body["metas"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_encoded_ampersand_reaches_provider() {
        let mut provider = mock_provider();
        provider
            .expect_search()
            .with(eq("rock&roll"))
            .times(1)
            .returning(|_| vec![meta("sxyprn_a")]);

        let uri = "/catalog/movie/goonio-sxyprn/search=rock%26roll.json";
        let (status, body) = get(app(provider), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metas"][0]["id"], "sxyprn_a");
    }

    #[tokio::test]
    async fn test_catalog_empty_search_skips_provider() {
        let mut provider = mock_provider();
        provider.expect_search().times(0);

        let (status, body) = get(app(provider), "/catalog/movie/goonio-sxyprn/search=.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"metas": []}));
    }

    #[tokio::test]
    async fn test_catalog_missing_search_skips_provider() {
        let mut provider = mock_provider();
        provider.expect_search().times(0);

        let (_, body) = get(app(provider), "/catalog/movie/goonio-sxyprn/skip=20.json").await;
        assert_eq!(body, json!({"metas": []}));
    }

    #[tokio::test]
    async fn test_catalog_without_extra() {
        let mut provider = mock_provider();
        provider.expect_search().times(0);

        let (status, body) = get(app(provider), "/catalog/movie/goonio-sxyprn.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"metas": []}));
    }

    #[tokio::test]
    async fn test_catalog_unknown_catalog() {
        let mut provider = mock_provider();
        provider.expect_search().times(0);

        let (status, body) =
            get(app(provider), "/catalog/movie/goonio-other/search=foo.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"metas": []}));
    }

    #[tokio::test]
    async fn test_stream_listing() {
        let mut provider = mock_provider();
        provider
            .expect_get_streams()
            .with(eq("a"))
            .times(1)
            .returning(|_| {
                vec![Stream {
                    name: "SXYPRN".to_string(),
                    title: "Auto Quality".to_string(),
                    url: relay::playback_path("sxyprn", "https://x/video.m3u8"),
                }]
            });

        let (status, body) = get(app(provider), "/stream/movie/sxyprn_a.json").await;
        assert_eq!(status, StatusCode::OK);
        let streams = body["streams"].as_array().unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(
            streams[0]["url"],
            format!("/playback/sxyprn/{}.m3u8", relay::encode_target("https://x/video.m3u8"))
        );
    }

    #[tokio::test]
    async fn test_stream_malformed_id() {
        let mut provider = mock_provider();
        provider.expect_get_streams().times(0);

        let (status, body) = get(app(provider), "/stream/movie/nounderscore.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"streams": []}));
    }

    #[tokio::test]
    async fn test_root_page_references_manifest() {
        let response = app(mock_provider())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("https://addon.example.com/manifest.json"));
        assert!(html.contains("stremio://addon.example.com/manifest.json"));
    }

    #[tokio::test]
    async fn test_playback_invalid_target() {
        let (status, body) = get(app(mock_provider()), "/playback/sxyprn/!!!.m3u8").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_playback_relays_with_provider_headers() {
        let server = MockServer::start().await;
        Mock::given(path("/hls/video.m3u8"))
            .and(header("referer", "https://sxyprn.net/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "#EXTM3U\n#EXT-X-ENDLIST\n",
                "application/vnd.apple.mpegurl",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let mut provider = mock_provider();
        provider
            .expect_relay_headers()
            .returning(|| vec![("Referer", "https://sxyprn.net/")]);

        let media_url = format!("{}/hls/video.m3u8", server.uri());
        let uri = relay::playback_path("sxyprn", &media_url);

        let response = app(provider)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.starts_with(b"#EXTM3U"));
    }

    #[tokio::test]
    async fn test_playback_head_request() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::method("HEAD"))
            .and(path("/v.m3u8"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let media_url = format!("{}/v.m3u8", server.uri());
        let response = app(mock_provider_without_headers())
            .oneshot(
                Request::builder()
                    .method(Method::HEAD)
                    .uri(relay::playback_path("other", &media_url))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    fn mock_provider_without_headers() -> MockProvider {
        let mut provider = mock_provider();
        provider.expect_relay_headers().times(0);
        provider
    }
}
