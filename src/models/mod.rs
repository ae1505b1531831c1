pub mod stremio;

pub use stremio::{
    BehaviorHints, CatalogDescriptor, ContentType, ExtraField, ItemId, Manifest, MetaPreview,
    MetasResponse, PosterShape, Stream, StreamsResponse,
};
