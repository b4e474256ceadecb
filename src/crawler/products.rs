//! Paginated product walker
//!
//! Walks the store's product listing pages in page-number order and each
//! page's product cards in document order, fetching every product page and
//! handing it to the field extractor. Records suppressed by the dedup
//! filter are skipped without further extraction work.

use crate::config::{Config, SiteConfig};
use crate::crawler::dedup::DedupFilter;
use crate::crawler::extract::{FieldExtractor, ProductRecord};
use crate::crawler::page::{class_selector, element_children, PageFetcher};
use crate::{CrawlError, Result};
use regex::Regex;
use scraper::Selector;
use std::collections::VecDeque;
use url::Url;

/// Final page number inside the last pagination link's href
const PAGE_NUMBER_PATTERN: &str = r"PAGEN_\d+=(\d+)";

/// Lazy pull-based walker over paginated product listings
///
/// Pagination discovery happens on the first `next_record` call: the last
/// pagination link of the catalog root names the final page, and the walk
/// visits pages `1..last_page` - the upper bound is exclusive, the final
/// page is never requested. This mirrors the confirmed behavior of the
/// source site's crawl, not an off-by-one to repair.
pub struct ProductWalker {
    fetcher: PageFetcher,
    extractor: FieldExtractor,
    dedup: DedupFilter,
    base_url: Url,
    site: SiteConfig,
    navigation: Selector,
    card: Selector,
    anchor: Selector,
    page_number: Regex,
    started: bool,
    done: bool,
    last_page: u32,
    next_page: u32,
    queue: VecDeque<String>,
}

impl ProductWalker {
    /// Creates a walker owning the given dedup filter for its lifetime
    pub fn new(config: &Config, dedup: DedupFilter) -> Result<Self> {
        Ok(Self {
            fetcher: PageFetcher::new(config)?,
            extractor: FieldExtractor::new(&config.site.base_url)?,
            dedup,
            base_url: Url::parse(&config.site.base_url)?,
            site: config.site.clone(),
            navigation: class_selector("div", "navigation")?,
            card: class_selector("div", "catalog-content-info")?,
            anchor: Selector::parse("a").map_err(|_| CrawlError::Selector("a".to_string()))?,
            page_number: Regex::new(PAGE_NUMBER_PATTERN)?,
            started: false,
            done: false,
            last_page: 0,
            next_page: 1,
            queue: VecDeque::new(),
        })
    }

    /// Advances the walk and returns the next product record, or `None`
    /// when every listing page has been visited
    pub async fn next_record(&mut self) -> Result<Option<ProductRecord>> {
        loop {
            if self.done {
                return Ok(None);
            }

            if !self.started {
                self.discover_pagination().await?;
                continue;
            }

            // Drain the current page's product URLs first
            if let Some(product_url) = self.queue.pop_front() {
                let Some(page) = self.fetcher.fetch(&product_url).await else {
                    tracing::warn!("skipping product, page unavailable: {}", product_url);
                    continue;
                };

                match self.extractor.extract(&page, &product_url, &mut self.dedup) {
                    Some(record) => {
                        tracing::info!("processing product: {}", record.sku_name);
                        return Ok(Some(record));
                    }
                    None => continue,
                }
            }

            // Upper bound exclusive: the final page is never visited
            if self.next_page >= self.last_page {
                self.done = true;
                return Ok(None);
            }

            let page_num = self.next_page;
            self.next_page += 1;
            self.load_listing(page_num).await;
        }
    }

    /// Reads the final page number off the catalog root's pagination block.
    /// Fail-fast: without it the walk has no bound.
    async fn discover_pagination(&mut self) -> Result<()> {
        self.started = true;
        let catalog_url = self.site.catalog_url();

        let page = self
            .fetcher
            .fetch(&catalog_url)
            .await
            .ok_or_else(|| self.missing(&catalog_url, "catalog root page"))?;

        let navigation = page
            .select_first(&self.navigation)
            .ok_or_else(|| self.missing(&catalog_url, "pagination block"))?;

        let last_href = navigation
            .select(&self.anchor)
            .last()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| self.missing(&catalog_url, "last pagination link"))?;

        self.last_page = self
            .page_number
            .captures(last_href)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(|| self.missing(last_href, "page number in pagination href"))?;

        tracing::info!("pagination discovered: {} pages", self.last_page);
        Ok(())
    }

    /// Fetches one listing page and queues its product URLs.
    /// An unavailable listing skips the page; the walk continues.
    async fn load_listing(&mut self, page_num: u32) {
        let url = self.site.listing_url(page_num);
        tracing::info!("processing page {} of {}", page_num, self.last_page);

        let Some(page) = self.fetcher.fetch(&url).await else {
            tracing::warn!("skipping listing page {}: unavailable", page_num);
            return;
        };

        for card in page.select(&self.card) {
            let href = element_children(card)
                .find_map(|child| child.value().attr("href").map(str::to_string));

            let Some(href) = href else {
                tracing::warn!("product card without a link on page {}, skipping", page_num);
                continue;
            };

            match self.base_url.join(&href) {
                Ok(product_url) => self.queue.push_back(product_url.to_string()),
                Err(e) => {
                    tracing::warn!("unresolvable product href '{}': {}", href, e);
                }
            }
        }
    }

    /// Distinct `(barcode, article)` pairs seen so far
    pub fn seen_products(&self) -> usize {
        self.dedup.len()
    }

    fn missing(&self, url: &str, what: &str) -> CrawlError {
        CrawlError::MissingStructure {
            url: url.to_string(),
            what: what.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_pattern() {
        let re = Regex::new(PAGE_NUMBER_PATTERN).unwrap();
        let captures = re
            .captures("/catalog/?PAGEN_1=24")
            .expect("pattern should match");
        assert_eq!(&captures[1], "24");
    }

    #[test]
    fn test_page_number_pattern_ignores_other_params() {
        let re = Regex::new(PAGE_NUMBER_PATTERN).unwrap();
        let captures = re.captures("/catalog/?sort=price&PAGEN_2=7&view=list").unwrap();
        assert_eq!(&captures[1], "7");
    }

    #[test]
    fn test_page_number_pattern_no_match() {
        let re = Regex::new(PAGE_NUMBER_PATTERN).unwrap();
        assert!(re.captures("/catalog/?page=3").is_none());
    }
}
