use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Addon identity
    pub addon_id: String,
    pub addon_name: String,
    pub addon_version: String,
    pub addon_description: String,
    pub addon_logo: String,
    pub addon_background: String,

    // Server
    pub host: String,
    pub port: u16,
    pub base_url: String,

    // Logging
    pub log_level: String,

    // Scrapers
    pub scraper_timeout_ms: u64,
    pub sxyprn_api_url: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Addon identity
            addon_id: env::var("ADDON_ID").unwrap_or_else(|_| "org.goonio.adult".to_string()),
            addon_name: env::var("ADDON_NAME").unwrap_or_else(|_| "Goonio".to_string()),
            addon_version: env::var("ADDON_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            addon_description: env::var("ADDON_DESCRIPTION").unwrap_or_else(|_| {
                "Stremio's finest adult catalog and stream provider.".to_string()
            }),
            addon_logo: env::var("ADDON_LOGO")
                .unwrap_or_else(|_| "https://i.imgur.com/83942T5.png".to_string()),
            addon_background: env::var("ADDON_BACKGROUND")
                .unwrap_or_else(|_| "https://i.imgur.com/WwnXB3k.jpeg".to_string()),

            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),

            // Logging
            log_level: env::var("LOG_LEVEL")
                .map(|level| level.to_lowercase())
                .unwrap_or_else(|_| "info".to_string()),

            // Scrapers
            scraper_timeout_ms: env::var("SCRAPER_TIMEOUT_MS")
                .unwrap_or_else(|_| "15000".to_string())
                .parse()
                .unwrap_or(15_000), // 15 seconds
            sxyprn_api_url: env::var("SXYPRN_API_URL")
                .unwrap_or_else(|_| "https://api.sxyprn.com".to_string()),
        }
    }

    /// Base URL without a trailing slash, used to build absolute links
    pub fn public_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_trims_trailing_slash() {
        let config = Config {
            base_url: "https://addon.example.com/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.public_url(), "https://addon.example.com");
    }
}
