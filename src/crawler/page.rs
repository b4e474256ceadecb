//! Parsed page access
//!
//! Wraps `scraper::Html` behind a small API the walkers share: fetch a URL
//! (with the per-call random delay), parse it into a document tree, and
//! select node-sets by element name + class. Callers keep the whole `Page`
//! for the duration of one visit so nested lookups against the full tree
//! stay possible next to the matched set.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_text};
use crate::{CrawlError, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

/// A fetched and parsed HTML page
pub struct Page {
    html: Html,
}

impl Page {
    /// Parses body text into a page. Parsing is lenient and never fails;
    /// structurally broken markup simply matches nothing later.
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// All nodes matching the selector, in document order
    pub fn select<'a>(&'a self, selector: &Selector) -> Vec<ElementRef<'a>> {
        self.html.select(selector).collect()
    }

    /// First node matching the selector
    pub fn select_first<'a>(&'a self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.html.select(selector).next()
    }
}

/// Compiles an `element.class` selector, mapping the parse error into
/// a constructor-time failure
pub fn class_selector(element: &str, class: &str) -> Result<Selector> {
    let source = format!("{}.{}", element, class);
    let parsed = Selector::parse(&source).map_err(|_| ());
    match parsed {
        Ok(selector) => Ok(selector),
        Err(_) => Err(CrawlError::Selector(source)),
    }
}

/// Element children of a node, text nodes skipped
pub fn element_children<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// The n-th element child of a node (0-based, text nodes skipped)
pub fn nth_element_child(element: ElementRef<'_>, n: usize) -> Option<ElementRef<'_>> {
    element_children(element).nth(n)
}

/// Concatenated text content of a node, trimmed
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Serial page fetcher shared by both walkers
///
/// Owns the HTTP client, the retry budget, and the delay range; draws a
/// fresh random delay for every call. An absent result means the page (or
/// its subtree of work) should be skipped, never that the walk must stop.
pub struct PageFetcher {
    client: Client,
    max_retries: u32,
    delay_range: Option<(u64, u64)>,
}

impl PageFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = build_http_client(&config.request)?;
        let delay_range = config
            .crawler
            .delay_range()
            .map_err(|e| CrawlError::Config(crate::ConfigError::Validation(e)))?;

        Ok(Self {
            client,
            max_retries: config.crawler.max_retries,
            delay_range,
        })
    }

    /// Fetches and parses one page, or `None` after the fetcher has logged
    /// the failure
    pub async fn fetch(&self, url: &str) -> Option<Page> {
        let body = fetch_text(&self.client, url, self.next_delay(), self.max_retries).await?;
        Some(Page::parse(&body))
    }

    /// Draws the artificial delay for the next request
    fn next_delay(&self) -> Duration {
        match self.delay_range {
            Some((min, max)) => Duration::from_secs(fastrand::u64(min..=max)),
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_selector_valid() {
        assert!(class_selector("ul", "catalog-menu-left-1").is_ok());
    }

    #[test]
    fn test_class_selector_invalid() {
        assert!(matches!(
            class_selector("ul", "??"),
            Err(CrawlError::Selector(_))
        ));
    }

    #[test]
    fn test_select_matches_tag_and_class() {
        let page = Page::parse(
            r#"<div class="a">one</div><span class="a">two</span><div class="b">three</div>"#,
        );
        let selector = class_selector("div", "a").unwrap();
        let matched = page.select(&selector);
        assert_eq!(matched.len(), 1);
        assert_eq!(text_of(matched[0]), "one");
    }

    #[test]
    fn test_element_children_skip_text_nodes() {
        let page = Page::parse(r#"<div class="c">  <p>x</p> text <span>y</span>  </div>"#);
        let selector = class_selector("div", "c").unwrap();
        let div = page.select_first(&selector).unwrap();

        let children: Vec<_> = element_children(div).collect();
        assert_eq!(children.len(), 2);
        assert_eq!(text_of(children[0]), "x");
        assert_eq!(text_of(children[1]), "y");
    }

    #[test]
    fn test_nth_element_child_out_of_bounds() {
        let page = Page::parse(r#"<div class="c"><p>x</p></div>"#);
        let selector = class_selector("div", "c").unwrap();
        let div = page.select_first(&selector).unwrap();
        assert!(nth_element_child(div, 3).is_none());
    }

    #[test]
    fn test_text_of_trims_and_concatenates() {
        let page = Page::parse(r#"<div class="c">  a <b>b</b> c  </div>"#);
        let selector = class_selector("div", "c").unwrap();
        let div = page.select_first(&selector).unwrap();
        assert_eq!(text_of(div), "a b c");
    }
}
