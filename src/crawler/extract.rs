//! Product field extraction
//!
//! Recovers the product attributes from a fetched product page. Every
//! field is read by its own extraction function over a shared read-only
//! page context; a failure in one function logs the gap and leaves that
//! column empty, never aborting the record. The only way a page yields no
//! record at all is the dedup check, which runs right after the key fields
//! so suppressed duplicates cost no further extraction work.

use crate::crawler::dedup::DedupFilter;
use crate::crawler::page::{class_selector, nth_element_child, text_of, Page};
use crate::{CrawlError, Result};
use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::Serialize;

/// CSV header row for product output
pub const PRODUCT_HEADERS: [&str; 14] = [
    "price_datetime",
    "price",
    "price_promo",
    "sku_status",
    "sku_barcode",
    "sku_article",
    "sku_name",
    "sku_category",
    "sku_country",
    "sku_weight_min",
    "sku_volume_min",
    "short_product_url",
    "sku_quantity_min",
    "sku_images",
];

/// One extracted product, column order matching [`PRODUCT_HEADERS`]
///
/// Always full arity: optional fields degrade to empty strings, never to a
/// shorter record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub price_datetime: String,
    pub price: String,
    pub price_promo: String,
    pub sku_status: u8,
    pub sku_barcode: String,
    pub sku_article: String,
    pub sku_name: String,
    pub sku_category: String,
    pub sku_country: String,
    pub sku_weight_min: String,
    pub sku_volume_min: String,
    pub short_product_url: String,
    pub sku_quantity_min: String,
    pub sku_images: String,
}

/// Extracts product fields from product pages
///
/// Selectors and unit patterns are compiled once per walker. Positions are
/// element-child positions within the page's info table and header block;
/// text nodes between elements do not count.
pub struct FieldExtractor {
    base_url: String,
    info_cell: Selector,
    header_block: Selector,
    breadcrumb: Selector,
    zoom: Selector,
    anchor: Selector,
    weight: Regex,
    volume: Regex,
    quantity: Regex,
}

impl FieldExtractor {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.to_string(),
            info_cell: class_selector("td", "tg-yw4l22")?,
            header_block: class_selector("div", "catalog-element-right")?,
            breadcrumb: class_selector("ul", "breadcrumb-navigation")?,
            zoom: class_selector("a", "cloud-zoom")?,
            anchor: Selector::parse("a").map_err(|_| CrawlError::Selector("a".to_string()))?,
            weight: Regex::new(r"(\d+)гр")?,
            volume: Regex::new(r"(\d+)\s?мл")?,
            quantity: Regex::new(r"(\d+)\s?шт")?,
        })
    }

    /// Extracts one product record, or `None` when the `(barcode, article)`
    /// pair was already seen this run
    pub fn extract(
        &self,
        page: &Page,
        product_url: &str,
        dedup: &mut DedupFilter,
    ) -> Option<ProductRecord> {
        let cells = page.select(&self.info_cell);

        let barcode = self.field(product_url, "sku_barcode", barcode_in(&cells));
        let article = self.field(product_url, "sku_article", article_in(&cells));

        if dedup.check_and_insert(&barcode, &article) {
            tracing::debug!(
                "duplicate product suppressed: barcode={} article={}",
                barcode,
                article
            );
            return None;
        }

        // Both prices come from one cell; a positional miss empties both
        let (price, price_promo) = price_pair_in(&cells).unwrap_or_else(|| {
            tracing::warn!("price positions missing at {}", product_url);
            (String::new(), String::new())
        });
        let sku_status = u8::from(!price.is_empty());

        let header = page.select_first(&self.header_block);
        let name = self.field(
            product_url,
            "sku_name",
            header.and_then(|h| nth_element_child(h, 0)).map(text_of),
        );

        let category = self.field(
            product_url,
            "sku_category",
            page.select_first(&self.breadcrumb).map(|nav| {
                nav.select(&self.anchor)
                    .map(text_of)
                    .collect::<Vec<_>>()
                    .join("|")
            }),
        );

        let country = self.field(
            product_url,
            "sku_country",
            header.and_then(country_under_header).map(text_of),
        );

        // Units are recovered from the name; units mentioned only elsewhere
        // on the page are missed. Accepted gap carried from the source data.
        let weight = first_capture(&self.weight, &name);
        let volume = first_capture(&self.volume, &name);
        let quantity = first_capture(&self.quantity, &name);

        let images = page
            .select(&self.zoom)
            .iter()
            .filter_map(|a| a.value().attr("href"))
            .map(|href| format!("{}{}", self.base_url, href))
            .collect::<Vec<_>>()
            .join(",");

        Some(ProductRecord {
            price_datetime: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            price,
            price_promo,
            sku_status,
            sku_barcode: barcode,
            sku_article: article,
            sku_name: name,
            sku_category: category,
            sku_country: country,
            sku_weight_min: weight,
            sku_volume_min: volume,
            short_product_url: product_url.to_string(),
            sku_quantity_min: quantity,
            sku_images: images,
        })
    }

    /// Converts a failed field read into an empty value, with a log entry
    fn field(&self, url: &str, name: &str, value: Option<String>) -> String {
        match value {
            Some(value) => value,
            None => {
                tracing::warn!("field '{}' not found at {}", name, url);
                String::new()
            }
        }
    }
}

/// Article: first info cell, first element child
fn article_in(cells: &[ElementRef<'_>]) -> Option<String> {
    let cell = nth_element_child(*cells.first()?, 0)?;
    Some(text_of(cell).replace('\n', ""))
}

/// Barcode: second info cell, first element child of its first element child
fn barcode_in(cells: &[ElementRef<'_>]) -> Option<String> {
    let outer = nth_element_child(*cells.get(1)?, 0)?;
    let inner = nth_element_child(outer, 0)?;
    Some(text_of(inner))
}

/// Price and promo price: fifth info cell, element children 1 and 3,
/// with the ruble suffix removed
fn price_pair_in(cells: &[ElementRef<'_>]) -> Option<(String, String)> {
    let cell = *cells.get(4)?;
    let price = nth_element_child(cell, 1)?;
    let promo = nth_element_child(cell, 3)?;
    Some((
        text_of(price).replace(" р", ""),
        text_of(promo).replace(" р", ""),
    ))
}

/// Country: header block -> child 1 -> child 0 -> child 1
fn country_under_header(header: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let block = nth_element_child(header, 1)?;
    let row = nth_element_child(block, 0)?;
    nth_element_child(row, 1)
}

/// First capture group of `pattern` in `text`, empty string when absent
fn first_capture(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
