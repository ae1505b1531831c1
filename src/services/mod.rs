pub mod relay;
pub mod scrapers;
