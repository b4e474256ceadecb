//! Zoocrawl: a catalog crawler for a single pet-supplies store
//!
//! This crate walks the store's category tree and its paginated product
//! listings, extracting structured records and writing them as delimited
//! CSV output. Fetching is strictly serial with a configurable random
//! delay between requests.

pub mod config;
pub mod crawler;
pub mod output;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid request header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Page structure missing {what} at {url}")]
    MissingStructure { url: String, what: String },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CategoryRecord, CategoryWalker, DedupFilter, ProductRecord, ProductWalker};
