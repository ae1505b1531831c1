//! Playback relay
//!
//! Stream URLs handed to clients point back at `/playback/<prefix>/<target>.m3u8`,
//! where `<target>` is the base64-encoded upstream media URL. The relay decodes
//! it, adds the provider's headers and streams the upstream body through
//! without buffering.

use axum::{
    body::Body,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD},
    Engine,
};
use reqwest::Client;
use url::Url;

/// Suffix appended to encoded targets so players treat the URL as HLS
pub const PLAYBACK_SUFFIX: &str = ".m3u8";

/// Caller headers passed on to the upstream request
const FORWARDED_REQUEST_HEADERS: &[&str] = &[
    "accept",
    "range",
    "if-range",
    "if-none-match",
    "if-modified-since",
    "user-agent",
];

/// Upstream headers passed back to the caller (content-type is handled separately)
const FORWARDED_RESPONSE_HEADERS: &[&str] = &[
    "content-length",
    "content-range",
    "accept-ranges",
    "etag",
    "last-modified",
];

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid base64 target: {0}")]
    InvalidEncoding(String),

    #[error("Target is not valid UTF-8")]
    InvalidUtf8,

    #[error("Invalid target URL: {0}")]
    InvalidUrl(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::InvalidEncoding(_)
            | RelayError::InvalidUtf8
            | RelayError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Encode a media URL as a path-safe segment
pub fn encode_target(url: &str) -> String {
    URL_SAFE.encode(url.as_bytes())
}

/// Relay path for a provider's media URL
pub fn playback_path(prefix: &str, media_url: &str) -> String {
    format!("/playback/{}/{}{}", prefix, encode_target(media_url), PLAYBACK_SUFFIX)
}

/// Decode a target segment. Accepts URL-safe or standard base64, padded or not,
/// with or without the `.m3u8` suffix.
pub fn decode_target(segment: &str) -> Result<String, RelayError> {
    let encoded = segment.strip_suffix(PLAYBACK_SUFFIX).unwrap_or(segment);

    let mut last_error = None;
    for engine in [&URL_SAFE, &URL_SAFE_NO_PAD, &STANDARD, &STANDARD_NO_PAD] {
        match engine.decode(encoded) {
            Ok(bytes) => return String::from_utf8(bytes).map_err(|_| RelayError::InvalidUtf8),
            Err(e) => last_error = Some(e),
        }
    }

    Err(RelayError::InvalidEncoding(
        last_error.map(|e| e.to_string()).unwrap_or_default(),
    ))
}

/// Only absolute http(s) targets are relayed
pub fn validate_target(target: &str) -> Result<Url, RelayError> {
    let url = Url::parse(target).map_err(|e| RelayError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RelayError::InvalidUrl(format!("unsupported scheme '{}'", other))),
    }
}

/// Guess content type from URL
fn guess_content_type(url: &str) -> &'static str {
    let lower = url.to_lowercase();
    if lower.contains(".m3u8") {
        "application/vnd.apple.mpegurl"
    } else if lower.contains(".mp4") {
        "video/mp4"
    } else if lower.contains(".ts") {
        "video/MP2T"
    } else {
        "application/octet-stream"
    }
}

/// Headers for the upstream request: forwarded caller headers, then injected
/// provider headers (which win on conflict).
pub fn upstream_headers(
    incoming: &HeaderMap,
    injected: &[(&'static str, &'static str)],
) -> reqwest::header::HeaderMap {
    let mut headers = reqwest::header::HeaderMap::new();

    for name in FORWARDED_REQUEST_HEADERS {
        if let Some(value) = incoming.get(*name) {
            if let Ok(value) = reqwest::header::HeaderValue::from_bytes(value.as_bytes()) {
                headers.insert(*name, value);
            }
        }
    }

    for (name, value) in injected {
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::from_bytes(name.as_bytes()),
            reqwest::header::HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }

    headers
}

/// Fetch `target` and stream the upstream response back
pub async fn relay(
    method: &Method,
    target: &Url,
    incoming: &HeaderMap,
    injected: &[(&'static str, &'static str)],
) -> Result<Response, RelayError> {
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| RelayError::Internal(e.to_string()))?;

    let upstream_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| RelayError::Internal(e.to_string()))?;

    let upstream = client
        .request(upstream_method, target.as_str())
        .headers(upstream_headers(incoming, injected))
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                RelayError::Timeout
            } else {
                RelayError::Upstream(e.to_string())
            }
        })?;

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);

    let content_type = upstream
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| guess_content_type(target.as_str()).to_string());

    let mut response = Response::builder()
        .status(status)
        .header("content-type", content_type);

    for name in FORWARDED_RESPONSE_HEADERS {
        if let Some(value) = upstream.headers().get(*name) {
            response = response.header(*name, value.as_bytes());
        }
    }

    let body = Body::from_stream(upstream.bytes_stream());

    response
        .body(body)
        .map_err(|e| RelayError::Internal(e.to_string()))
}
