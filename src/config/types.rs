use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure for zoocrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub restart: RestartConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of attempts for a single fetch before giving up
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Artificial per-request delay range in seconds, "min-max".
    /// An empty string disables the delay.
    #[serde(rename = "delay-range-s", default = "default_delay_range")]
    pub delay_range_s: String,

    /// Comma-separated category ids to scope the crawl to.
    /// Accepted and surfaced but not yet consumed by the traversal.
    #[serde(default)]
    pub categories: String,
}

/// Target site layout configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme + host of the store, no trailing slash
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Path of the catalog root; also the marker stripped from category
    /// hrefs to obtain relative ids
    #[serde(rename = "catalog-path", default = "default_catalog_path")]
    pub catalog_path: String,

    /// Path template for paginated listings; `{page}` is replaced with the
    /// page number
    #[serde(rename = "product-pages-path", default = "default_pages_path")]
    pub product_pages_path: String,
}

/// HTTP request configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// User-Agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Extra request headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the CSV files are written into
    #[serde(default = "default_out_dir")]
    pub directory: String,
}

/// Log file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    /// Directory the log files are written into
    #[serde(default = "default_logs_dir")]
    pub directory: String,
}

/// Restart policy applied by the entry point when a walk fails
#[derive(Debug, Clone, Deserialize)]
pub struct RestartConfig {
    /// Number of retries of the whole operation after a failure.
    /// Zero means run exactly once.
    #[serde(rename = "restart-count", default)]
    pub restart_count: u32,

    /// Minutes to wait between restart attempts
    #[serde(rename = "interval-m", default)]
    pub interval_m: u64,
}

impl CrawlerConfig {
    /// Parses `delay_range_s` into an inclusive `(min, max)` second range.
    /// `Ok(None)` means the delay is disabled.
    pub fn delay_range(&self) -> Result<Option<(u64, u64)>, String> {
        let raw = self.delay_range_s.trim();
        if raw.is_empty() || raw == "0" {
            return Ok(None);
        }

        let (min, max) = raw
            .split_once('-')
            .ok_or_else(|| format!("expected \"min-max\", got '{}'", raw))?;
        let min: u64 = min
            .trim()
            .parse()
            .map_err(|_| format!("invalid delay minimum '{}'", min))?;
        let max: u64 = max
            .trim()
            .parse()
            .map_err(|_| format!("invalid delay maximum '{}'", max))?;

        if min > max {
            return Err(format!("delay range {}-{} is inverted", min, max));
        }

        Ok(Some((min, max)))
    }

    /// Category ids from the comma-separated scope filter
    pub fn category_filter(&self) -> Vec<String> {
        self.categories
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl SiteConfig {
    /// Absolute URL of the catalog root page
    pub fn catalog_url(&self) -> String {
        format!("{}{}", self.base_url, self.catalog_path)
    }

    /// Absolute URL of the n-th product listing page
    pub fn listing_url(&self, page: u32) -> String {
        format!(
            "{}{}",
            self.base_url,
            self.product_pages_path.replace("{page}", &page.to_string())
        )
    }
}

fn default_max_retries() -> u32 {
    1
}

fn default_delay_range() -> String {
    "1-3".to_string()
}

fn default_base_url() -> String {
    "https://zootovary.ru".to_string()
}

fn default_catalog_path() -> String {
    "/catalog/".to_string()
}

fn default_pages_path() -> String {
    "/catalog/?PAGEN_1={page}".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string()
}

fn default_out_dir() -> String {
    "out".to_string()
}

fn default_logs_dir() -> String {
    "logs".to_string()
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_range_s: default_delay_range(),
            categories: String::new(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            catalog_path: default_catalog_path(),
            product_pages_path: default_pages_path(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            headers: HashMap::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_out_dir(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            directory: default_logs_dir(),
        }
    }
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            restart_count: 0,
            interval_m: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_range_default() {
        let config = CrawlerConfig::default();
        assert_eq!(config.delay_range().unwrap(), Some((1, 3)));
    }

    #[test]
    fn test_delay_range_disabled_by_empty_string() {
        let config = CrawlerConfig {
            delay_range_s: String::new(),
            ..CrawlerConfig::default()
        };
        assert_eq!(config.delay_range().unwrap(), None);
    }

    #[test]
    fn test_delay_range_disabled_by_zero() {
        let config = CrawlerConfig {
            delay_range_s: "0".to_string(),
            ..CrawlerConfig::default()
        };
        assert_eq!(config.delay_range().unwrap(), None);
    }

    #[test]
    fn test_delay_range_inverted() {
        let config = CrawlerConfig {
            delay_range_s: "5-2".to_string(),
            ..CrawlerConfig::default()
        };
        assert!(config.delay_range().is_err());
    }

    #[test]
    fn test_delay_range_garbage() {
        let config = CrawlerConfig {
            delay_range_s: "fast".to_string(),
            ..CrawlerConfig::default()
        };
        assert!(config.delay_range().is_err());
    }

    #[test]
    fn test_category_filter_splits_and_trims() {
        let config = CrawlerConfig {
            categories: "cats, dogs ,birds".to_string(),
            ..CrawlerConfig::default()
        };
        assert_eq!(config.category_filter(), vec!["cats", "dogs", "birds"]);
    }

    #[test]
    fn test_category_filter_empty() {
        let config = CrawlerConfig::default();
        assert!(config.category_filter().is_empty());
    }

    #[test]
    fn test_listing_url_substitutes_page_number() {
        let site = SiteConfig::default();
        assert_eq!(
            site.listing_url(7),
            "https://zootovary.ru/catalog/?PAGEN_1=7"
        );
    }

    #[test]
    fn test_catalog_url() {
        let site = SiteConfig::default();
        assert_eq!(site.catalog_url(), "https://zootovary.ru/catalog/");
    }
}
