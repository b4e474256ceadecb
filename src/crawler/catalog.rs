//! Category tree walker
//!
//! Walks the store's category menu two levels deep and yields one record
//! per category node, in discovery order: the synthetic root, then each
//! top-level category followed by its children (depth-first).
//!
//! Category pages come in two structural variants. Pages with "opener"
//! spans render each child category behind its opener node (Layout A);
//! pages without openers render a flat submenu list instead (Layout B).
//! The walker tries Layout A and falls back to Layout B when no opener
//! nodes exist - a structural variant, not an error.

use crate::config::Config;
use crate::crawler::page::{class_selector, text_of, Page, PageFetcher};
use crate::{CrawlError, Result};
use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::Serialize;
use std::collections::VecDeque;

/// CSV header row for category output
pub const CATEGORY_HEADERS: [&str; 3] = ["name", "id", "parent_id"];

/// Display name of the synthetic root record
const ROOT_CATEGORY_NAME: &str = "Каталог";

/// Last two path segments of a category href: `.../parent/child/`
const ID_PATTERN: &str = r".+/(.+)/(.+)/$";

/// One node of the category tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRecord {
    pub name: String,
    pub id: String,
    pub parent_id: String,
}

/// How a category page renders its submenu
#[derive(Debug)]
enum SubmenuLayout {
    /// Layout A: one opener span per child, anchor next to it
    Openers(Vec<(String, String)>),
    /// Layout B: flat anchor list inside the submenu block
    Flat(Vec<(String, String)>),
}

/// A top-level category awaiting expansion
#[derive(Debug, Clone)]
struct TopCategory {
    title: String,
    id: String,
}

/// Lazy pull-based walker over the category tree
///
/// `next_record` drives the walk one record at a time; fetches happen only
/// when the next record requires them. A failed child-page fetch skips that
/// subtree and continues (the top-level record is still emitted); a missing
/// root structure fails the whole walk.
pub struct CategoryWalker {
    fetcher: PageFetcher,
    catalog_url: String,
    catalog_path: String,
    menu: Selector,
    opener: Selector,
    anchor: Selector,
    id_pattern: Regex,
    started: bool,
    tops: VecDeque<TopCategory>,
    total: usize,
    pending: VecDeque<CategoryRecord>,
    expand: Option<TopCategory>,
}

impl CategoryWalker {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            fetcher: PageFetcher::new(config)?,
            catalog_url: config.site.catalog_url(),
            catalog_path: config.site.catalog_path.clone(),
            menu: class_selector("ul", "catalog-menu-left-1")?,
            opener: class_selector("span", "catalog-menu-opener-blank")?,
            anchor: Selector::parse("a").map_err(|_| CrawlError::Selector("a".to_string()))?,
            id_pattern: Regex::new(ID_PATTERN)?,
            started: false,
            tops: VecDeque::new(),
            total: 0,
            pending: VecDeque::new(),
            expand: None,
        })
    }

    /// Advances the walk and returns the next category record, or `None`
    /// when the tree is exhausted
    pub async fn next_record(&mut self) -> Result<Option<CategoryRecord>> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Ok(Some(record));
            }

            if let Some(top) = self.expand.take() {
                self.load_children(&top).await;
                continue;
            }

            if !self.started {
                self.start().await?;
                continue;
            }

            match self.tops.pop_front() {
                Some(top) => {
                    tracing::info!(
                        "processing category: {} ({} top-level total)",
                        top.title,
                        self.total
                    );
                    let record = CategoryRecord {
                        name: top.title.clone(),
                        id: top.id.clone(),
                        parent_id: self.catalog_path.clone(),
                    };
                    self.expand = Some(top);
                    return Ok(Some(record));
                }
                None => return Ok(None),
            }
        }
    }

    /// Fetches the catalog root, collects the top-level categories, and
    /// queues the synthetic root record. Fail-fast: without the root menu
    /// there is nothing to walk.
    async fn start(&mut self) -> Result<()> {
        self.started = true;

        let page = self
            .fetcher
            .fetch(&self.catalog_url)
            .await
            .ok_or_else(|| self.missing("catalog root page"))?;

        let menu = page
            .select_first(&self.menu)
            .ok_or_else(|| self.missing("top-level category menu"))?;

        for anchor in menu.select(&self.anchor) {
            let title = text_of(anchor);
            if title.is_empty() {
                continue;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            self.tops.push_back(TopCategory {
                title,
                id: href.replace(&self.catalog_path, ""),
            });
        }

        self.total = self.tops.len();
        self.pending.push_back(CategoryRecord {
            name: ROOT_CATEGORY_NAME.to_string(),
            id: self.catalog_path.clone(),
            parent_id: String::new(),
        });

        Ok(())
    }

    /// Fetches a top-level category's page and queues its child records.
    /// An unavailable page skips the subtree; the walk continues.
    async fn load_children(&mut self, top: &TopCategory) {
        let url = format!("{}{}", self.catalog_url, top.id);

        let Some(page) = self.fetcher.fetch(&url).await else {
            tracing::warn!(
                "skipping subtree of '{}': category page unavailable at {}",
                top.title,
                url
            );
            return;
        };

        let anchors = match self.submenu_layout(&page) {
            SubmenuLayout::Openers(anchors) => anchors,
            SubmenuLayout::Flat(anchors) => anchors,
        };

        for (name, href) in anchors {
            match self.find_ids(&href) {
                Some((child_id, parent_id)) => self.pending.push_back(CategoryRecord {
                    name,
                    id: child_id,
                    parent_id,
                }),
                None => {
                    tracing::warn!("submenu link with unexpected href '{}', skipping", href)
                }
            }
        }
    }

    /// Detects which submenu variant the category page uses and collects
    /// its `(name, href)` anchors
    fn submenu_layout(&self, page: &Page) -> SubmenuLayout {
        let openers = page.select(&self.opener);

        if !openers.is_empty() {
            let mut anchors = Vec::new();
            for opener in openers {
                let Some(container) = opener.parent().and_then(ElementRef::wrap) else {
                    continue;
                };
                let Some(anchor) = container.select(&self.anchor).next() else {
                    continue;
                };
                if let Some(href) = anchor.value().attr("href") {
                    anchors.push((text_of(anchor), href.to_string()));
                }
            }
            return SubmenuLayout::Openers(anchors);
        }

        let mut anchors = Vec::new();
        if let Some(menu) = page.select_first(&self.menu) {
            for anchor in menu.select(&self.anchor) {
                if let Some(href) = anchor.value().attr("href") {
                    anchors.push((text_of(anchor), href.to_string()));
                }
            }
        }
        SubmenuLayout::Flat(anchors)
    }

    /// Extracts `(child_id, parent_id)` from the last two path segments of
    /// a category href
    fn find_ids(&self, href: &str) -> Option<(String, String)> {
        let captures = self.id_pattern.captures(href)?;
        let parent = captures.get(1)?.as_str().to_string();
        let child = captures.get(2)?.as_str().to_string();
        Some((child, parent))
    }

    fn missing(&self, what: &str) -> CrawlError {
        CrawlError::MissingStructure {
            url: self.catalog_url.clone(),
            what: what.to_string(),
        }
    }
}
