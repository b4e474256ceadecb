//! CSV record sink

use crate::output::OutputResult;
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Writes fixed-arity records to a timestamped `;`-delimited CSV file
///
/// The header row is written on creation; after that the sink consumes a
/// walker's records one at a time, in emission order.
pub struct CsvSink {
    writer: Writer<File>,
    path: PathBuf,
}

impl CsvSink {
    /// Creates the output directory if needed and opens a new file named
    /// `<prefix><YYYY-MM-DD_HH-MM-SS>.csv` with the given header row
    ///
    /// # Arguments
    ///
    /// * `directory` - Output directory
    /// * `prefix` - File name prefix, e.g. `products_out_`
    /// * `headers` - Fixed header row written first
    pub fn create(directory: &Path, prefix: &str, headers: &[&str]) -> OutputResult<Self> {
        std::fs::create_dir_all(directory)?;

        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = directory.join(format!("{}{}.csv", prefix, timestamp));

        let mut writer = WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(headers)?;

        Ok(Self { writer, path })
    }

    /// Appends one record
    pub fn write<R: Serialize>(&mut self, record: &R) -> OutputResult<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    /// Flushes buffered rows to disk
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Path of the file being written
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{CategoryRecord, CATEGORY_HEADERS};
    use tempfile::TempDir;

    #[test]
    fn test_creates_directory_and_file() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out");

        let sink = CsvSink::create(&nested, "catalog_out_", &CATEGORY_HEADERS).unwrap();
        assert!(sink.path().exists());
        assert!(sink
            .path()
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("catalog_out_"));
    }

    #[test]
    fn test_header_then_rows_with_semicolon_delimiter() {
        let dir = TempDir::new().unwrap();
        let mut sink = CsvSink::create(dir.path(), "catalog_out_", &CATEGORY_HEADERS).unwrap();

        sink.write(&CategoryRecord {
            name: "Каталог".to_string(),
            id: "/catalog/".to_string(),
            parent_id: String::new(),
        })
        .unwrap();
        sink.write(&CategoryRecord {
            name: "Кошки".to_string(),
            id: "cats/".to_string(),
            parent_id: "/catalog/".to_string(),
        })
        .unwrap();
        sink.finish().unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "name;id;parent_id");
        assert_eq!(lines[1], "Каталог;/catalog/;");
        assert_eq!(lines[2], "Кошки;cats/;/catalog/");
    }
}
