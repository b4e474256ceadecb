use crate::config::types::{Config, CrawlerConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_directories(config)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    config
        .delay_range()
        .map_err(|e| ConfigError::Validation(format!("delay-range-s: {}", e)))?;

    Ok(())
}

/// Validates target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    if config.base_url.ends_with('/') {
        return Err(ConfigError::Validation(
            "base-url must not end with a slash; paths supply their own".to_string(),
        ));
    }

    if !config.catalog_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "catalog-path must start with '/', got '{}'",
            config.catalog_path
        )));
    }

    if !config.product_pages_path.contains("{page}") {
        return Err(ConfigError::Validation(
            "product-pages-path must contain the {page} placeholder".to_string(),
        ));
    }

    Ok(())
}

/// Validates output and log directories
fn validate_directories(config: &Config) -> Result<(), ConfigError> {
    if config.output.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.logs.directory.is_empty() {
        return Err(ConfigError::Validation(
            "logs directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Config;

    fn base_config() -> Config {
        toml::from_str("").unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = base_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_max_retries_rejected() {
        let mut config = base_config();
        config.crawler.max_retries = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_delay_range_rejected() {
        let mut config = base_config();
        config.crawler.delay_range_s = "3-1".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unparseable_base_url_rejected() {
        let mut config = base_config();
        config.site.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_base_url_with_trailing_slash_rejected() {
        let mut config = base_config();
        config.site.base_url = "https://zootovary.ru/".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_pages_path_without_placeholder_rejected() {
        let mut config = base_config();
        config.site.product_pages_path = "/catalog/?PAGEN_1=1".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_output_directory_rejected() {
        let mut config = base_config();
        config.output.directory = String::new();
        assert!(validate(&config).is_err());
    }
}
