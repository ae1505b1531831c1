use serde::{Deserialize, Serialize};

/// Separator between the provider prefix and the provider-native id
pub const ITEM_ID_SEPARATOR: char = '_';

/// Content type understood by Stremio clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Movie => write!(f, "movie"),
            ContentType::Series => write!(f, "series"),
        }
    }
}

/// Poster aspect hint for catalog rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosterShape {
    Poster,
    Landscape,
    Square,
}

/// Catalog entry returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaPreview {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub poster_shape: PosterShape,
}

/// Playable stream for an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub name: String,
    pub title: String,
    pub url: String,
}

/// Composite item id: `<provider-prefix>_<native-id>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemId {
    pub prefix: String,
    pub native_id: String,
}

impl ItemId {
    pub fn new(prefix: impl Into<String>, native_id: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            native_id: native_id.into(),
        }
    }

    /// Split on the first separator. The native id may contain more separators.
    pub fn parse(raw: &str) -> Option<Self> {
        let (prefix, native_id) = raw.split_once(ITEM_ID_SEPARATOR)?;
        if prefix.is_empty() || native_id.is_empty() {
            return None;
        }
        Some(Self::new(prefix, native_id))
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.prefix, ITEM_ID_SEPARATOR, self.native_id)
    }
}

// ============================================================================
// Manifest
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraField {
    pub name: String,
    pub is_required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogDescriptor {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub id: String,
    pub name: String,
    pub extra: Vec<ExtraField>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub adult: bool,
    pub configurable: bool,
    pub configuration_required: bool,
}

/// Addon descriptor served at `/manifest.json`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub background: String,
    pub resources: Vec<String>,
    pub types: Vec<ContentType>,
    pub catalogs: Vec<CatalogDescriptor>,
    pub behavior_hints: BehaviorHints,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Default, Serialize)]
pub struct MetasResponse {
    pub metas: Vec<MetaPreview>,
}

#[derive(Debug, Default, Serialize)]
pub struct StreamsResponse {
    pub streams: Vec<Stream>,
}
