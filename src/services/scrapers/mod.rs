//! Scraper registry
//!
//! Each external site is a [`Provider`]. The [`ScraperManager`] owns the
//! registered providers and routes catalog searches and stream lookups to
//! them by catalog id (`goonio-<prefix>`) or item id prefix (`<prefix>_...`).
//!
//! Adding a site means writing one more `Provider` and registering it in
//! `main`; nothing here changes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::models::{CatalogDescriptor, ContentType, ExtraField, ItemId, MetaPreview, Stream};
use crate::telemetry;

pub mod sxyprn;

pub use sxyprn::SxyprnProvider;

/// Prefix shared by every catalog id this addon exposes
pub const CATALOG_PREFIX: &str = "goonio";

/// Build the catalog id for a provider prefix
pub fn catalog_id(prefix: &str) -> String {
    format!("{}-{}", CATALOG_PREFIX, prefix)
}

/// A scraped content source
///
/// Implementations never fail outward: transport and parse errors are logged
/// and turned into an empty list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Item id prefix, e.g. `sxyprn`
    fn prefix(&self) -> &'static str;

    /// Display name used for the catalog
    fn name(&self) -> &'static str;

    /// Search the source and return catalog entries in source order
    async fn search(&self, query: &str) -> Vec<MetaPreview>;

    /// Resolve playable streams for a provider-native id
    async fn get_streams(&self, native_id: &str) -> Vec<Stream>;

    /// Extra headers the relay must send when fetching this source's media
    fn relay_headers(&self) -> Vec<(&'static str, &'static str)>;
}

/// Routes requests to registered providers. Immutable after construction.
pub struct ScraperManager {
    providers: Vec<(String, Arc<dyn Provider>)>,
}

impl ScraperManager {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        let providers: Vec<(String, Arc<dyn Provider>)> = providers
            .into_iter()
            .map(|provider| (catalog_id(provider.prefix()), provider))
            .collect();

        let catalog_ids: Vec<&str> = providers.iter().map(|(id, _)| id.as_str()).collect();
        info!(
            tag = telemetry::SCRAPER,
            providers = ?catalog_ids,
            "ScraperManager initialized"
        );

        Self { providers }
    }

    /// Look up a provider by catalog id
    pub fn provider_for_catalog(&self, catalog_id: &str) -> Option<&Arc<dyn Provider>> {
        self.providers
            .iter()
            .find(|(id, _)| id == catalog_id)
            .map(|(_, provider)| provider)
    }

    /// Look up a provider by item id prefix
    pub fn provider_for_prefix(&self, prefix: &str) -> Option<&Arc<dyn Provider>> {
        self.provider_for_catalog(&catalog_id(prefix))
    }

    /// Catalog descriptors for the manifest, in registration order
    pub fn catalogs(&self) -> Vec<CatalogDescriptor> {
        self.providers
            .iter()
            .map(|(id, provider)| CatalogDescriptor {
                content_type: ContentType::Movie,
                id: id.clone(),
                name: provider.name().to_string(),
                extra: vec![ExtraField {
                    name: "search".to_string(),
                    is_required: true,
                }],
            })
            .collect()
    }

    /// Search a catalog. Unknown catalogs yield an empty list.
    pub async fn search_catalog(&self, catalog_id: &str, query: &str) -> Vec<MetaPreview> {
        match self.provider_for_catalog(catalog_id) {
            Some(provider) => provider.search(query).await,
            None => {
                warn!(
                    tag = telemetry::SCRAPER,
                    catalog_id = %catalog_id,
                    "No scraper found for catalog ID"
                );
                Vec::new()
            }
        }
    }

    /// List streams for an item id. Malformed ids and unknown prefixes yield an empty list.
    pub async fn list_streams(&self, item_id: &str) -> Vec<Stream> {
        let Some(id) = ItemId::parse(item_id) else {
            warn!(
                tag = telemetry::SCRAPER,
                item_id = %item_id,
                "Item ID has no provider prefix"
            );
            return Vec::new();
        };

        match self.provider_for_prefix(&id.prefix) {
            Some(provider) => provider.get_streams(&id.native_id).await,
            None => {
                warn!(
                    tag = telemetry::SCRAPER,
                    prefix = %id.prefix,
                    "No scraper found for item ID prefix"
                );
                Vec::new()
            }
        }
    }
}
