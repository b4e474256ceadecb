//! Configuration module for zoocrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use zoocrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Fetch attempts per page: {}", config.crawler.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, LogsConfig, OutputConfig, RequestConfig, RestartConfig, SiteConfig,
};

// Re-export parser functions
pub use parser::load_config;
