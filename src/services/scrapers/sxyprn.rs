//! SXYPRN provider
//!
//! Talks to the SXYPRN video API. The upstream contract has changed several
//! times (JSON API, HTML pages), so responses are parsed by content type:
//! JSON payloads are read from `result`, HTML documents are scraped with CSS
//! selectors (search) or scanned for an embedded `.m3u8` URL (streams).

use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{header, Client};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::Provider;
use crate::models::{ContentType, ItemId, MetaPreview, PosterShape, Stream};
use crate::services::relay;
use crate::telemetry;

const PREFIX: &str = "sxyprn";
const DISPLAY_NAME: &str = "SXYPRN";

/// Referer accepted by the site's media hosts
const SITE_REFERER: &str = "https://sxyprn.net/";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

lazy_static! {
    /// Post id inside a link such as `/post/687269d1165a7.html`
    static ref POST_ID_REGEX: Regex = Regex::new(r"/post/([A-Za-z0-9]+)").unwrap();
    /// Absolute HLS playlist URL embedded anywhere in a page
    static ref M3U8_REGEX: Regex =
        Regex::new(r#"https?://[^"'\s<>\\]+\.m3u8(?:\?[^"'\s<>\\]*)?"#).unwrap();
}

/// Errors raised while talking to SXYPRN. Never leave this module.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Upstream response body, classified by content type
#[derive(Debug)]
enum Payload {
    Json(Value),
    Html(String),
}

impl Payload {
    fn from_body(content_type: Option<&str>, body: String) -> Result<Self, ProviderError> {
        let declared_json = content_type
            .map(|ct| ct.to_lowercase().contains("json"))
            .unwrap_or(false);
        let looks_json = body.trim_start().starts_with(['{', '[']);

        if declared_json || looks_json {
            serde_json::from_str(&body)
                .map(Payload::Json)
                .map_err(|e| ProviderError::Parse(e.to_string()))
        } else {
            Ok(Payload::Html(body))
        }
    }
}

pub struct SxyprnProvider {
    http: Client,
    api_url: String,
}

impl SxyprnProvider {
    /// Create a provider against `api_url` (e.g. "https://api.sxyprn.com")
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        // Browser-like headers; the site rejects obvious bots
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(header::REFERER, header::HeaderValue::from_static(SITE_REFERER));

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .gzip(true)
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Payload, ProviderError> {
        let url = format!("{}{}", self.api_url, endpoint);
        debug!(tag = telemetry::SCRAPER, url = %url, "SXYPRN request");

        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        Payload::from_body(content_type.as_deref(), body)
    }

    async fn try_search(&self, query: &str) -> Result<Vec<MetaPreview>, ProviderError> {
        let payload = self
            .fetch("/videos/search", &[("query", query), ("page", "1")])
            .await?;

        Ok(match payload {
            Payload::Json(json) => parse_search_json(&json),
            Payload::Html(html) => parse_search_html(&html),
        })
    }

    async fn try_get_streams(&self, native_id: &str) -> Result<Vec<Stream>, ProviderError> {
        let payload = self.fetch("/video/get", &[("id", native_id)]).await?;

        let media_url = match payload {
            Payload::Json(json) => parse_video_json(&json),
            Payload::Html(html) => extract_media_url(&html),
        };

        Ok(media_url
            .map(|url| {
                vec![Stream {
                    name: DISPLAY_NAME.to_string(),
                    title: "Auto Quality".to_string(),
                    url: relay::playback_path(PREFIX, &url),
                }]
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl Provider for SxyprnProvider {
    fn prefix(&self) -> &'static str {
        PREFIX
    }

    fn name(&self) -> &'static str {
        DISPLAY_NAME
    }

    async fn search(&self, query: &str) -> Vec<MetaPreview> {
        match self.try_search(query).await {
            Ok(metas) => {
                info!(
                    tag = telemetry::SCRAPER,
                    provider = PREFIX,
                    query = %query,
                    results = metas.len(),
                    "Search completed"
                );
                metas
            }
            Err(e) => {
                error!(
                    tag = telemetry::SCRAPER,
                    provider = PREFIX,
                    query = %query,
                    error = %e,
                    "Search failed"
                );
                Vec::new()
            }
        }
    }

    async fn get_streams(&self, native_id: &str) -> Vec<Stream> {
        match self.try_get_streams(native_id).await {
            Ok(streams) if streams.is_empty() => {
                warn!(
                    tag = telemetry::SCRAPER,
                    provider = PREFIX,
                    native_id = %native_id,
                    "No video URL found"
                );
                streams
            }
            Ok(streams) => {
                info!(
                    tag = telemetry::SCRAPER,
                    provider = PREFIX,
                    native_id = %native_id,
                    "Found stream"
                );
                streams
            }
            Err(e) => {
                error!(
                    tag = telemetry::SCRAPER,
                    provider = PREFIX,
                    native_id = %native_id,
                    error = %e,
                    "Stream lookup failed"
                );
                Vec::new()
            }
        }
    }

    fn relay_headers(&self) -> Vec<(&'static str, &'static str)> {
        vec![("Referer", SITE_REFERER)]
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn build_meta(native_id: &str, title: Option<String>, thumb: Option<&str>) -> MetaPreview {
    MetaPreview {
        id: ItemId::new(PREFIX, native_id).to_string(),
        content_type: ContentType::Movie,
        name: title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| native_id.to_string()),
        poster: thumb.and_then(normalize_thumb),
        poster_shape: PosterShape::Landscape,
    }
}

/// Protocol-relative thumbnails become https; anything else non-absolute is dropped
fn normalize_thumb(thumb: &str) -> Option<String> {
    let thumb = thumb.trim();
    if let Some(rest) = thumb.strip_prefix("//") {
        Some(format!("https://{}", rest))
    } else if thumb.starts_with("http://") || thumb.starts_with("https://") {
        Some(thumb.to_string())
    } else {
        None
    }
}

/// Ids come back as strings or numbers depending on the endpoint version
fn json_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `{"result": [{"id", "title", "thumb"}, ...]}`. Entries without an id are skipped.
fn parse_search_json(json: &Value) -> Vec<MetaPreview> {
    let Some(items) = json.get("result").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let native_id = item.get("id").and_then(json_id)?;
            let title = item
                .get("title")
                .and_then(Value::as_str)
                .map(|t| t.trim().to_string());
            let thumb = item.get("thumb").and_then(Value::as_str);
            Some(build_meta(&native_id, title, thumb))
        })
        .collect()
}

/// Search result page: one `.post_el_small` card per video
fn parse_search_html(html: &str) -> Vec<MetaPreview> {
    let document = Html::parse_document(html);
    let (Ok(card_selector), Ok(link_selector), Ok(title_selector), Ok(img_selector)) = (
        Selector::parse(".post_el_small"),
        Selector::parse(r#"a[href*="/post/"]"#),
        Selector::parse(".post_text"),
        Selector::parse("img"),
    ) else {
        return Vec::new();
    };

    document
        .select(&card_selector)
        .filter_map(|card| parse_card(&card, &link_selector, &title_selector, &img_selector))
        .collect()
}

fn parse_card(
    card: &ElementRef,
    link_selector: &Selector,
    title_selector: &Selector,
    img_selector: &Selector,
) -> Option<MetaPreview> {
    let href = card
        .select(link_selector)
        .find_map(|link| link.value().attr("href"))?;
    let native_id = POST_ID_REGEX.captures(href)?.get(1)?.as_str().to_string();

    let title = card
        .select(title_selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "));

    let thumb = card.select(img_selector).find_map(|img| {
        img.value()
            .attr("data-src")
            .or_else(|| img.value().attr("src"))
    });

    Some(build_meta(&native_id, title, thumb))
}

/// `{"result": {"video_url": "..."}}`
fn parse_video_json(json: &Value) -> Option<String> {
    json.get("result")
        .and_then(|result| result.get("video_url"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| url.to_string())
}

/// First `.m3u8` URL embedded in a page, including JSON-escaped (`\/`) ones
fn extract_media_url(html: &str) -> Option<String> {
    let unescaped = html.replace("\\/", "/");
    M3U8_REGEX
        .find(&unescaped)
        .map(|m| m.as_str().replace("&amp;", "&"))
}
