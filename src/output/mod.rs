//! Output module for writing crawl records to durable CSV files
//!
//! Each run writes a fresh timestamped file into the configured output
//! directory: `catalog_out_<timestamp>.csv` for category walks,
//! `products_out_<timestamp>.csv` for product walks.

mod csv_sink;

pub use csv_sink::CsvSink;

use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
