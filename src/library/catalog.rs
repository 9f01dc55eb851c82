//! Catalog service
//!
//! Builds the `/api/pdfs` listing. The listing is never cached: every call
//! re-walks the library and re-reads file sizes. Covers are referenced by URL
//! only, so a cover that failed to generate still shows up and 404s.

use std::path::PathBuf;

use crate::error::LibraryError;

use super::entry::CatalogRecord;
use super::scanner::LibraryScanner;

#[derive(Debug, Clone)]
pub struct Catalog {
    scanner: LibraryScanner,
}

impl Catalog {
    pub fn new(pdf_dir: impl Into<PathBuf>) -> Self {
        Self {
            scanner: LibraryScanner::new(pdf_dir),
        }
    }

    pub fn scanner(&self) -> &LibraryScanner {
        &self.scanner
    }

    /// Scan the library and describe every PDF, in scan order
    pub async fn list(&self) -> Result<Vec<CatalogRecord>, LibraryError> {
        let scanner = self.scanner.clone();
        tokio::task::spawn_blocking(move || list_blocking(&scanner)).await?
    }
}

fn list_blocking(scanner: &LibraryScanner) -> Result<Vec<CatalogRecord>, LibraryError> {
    scanner
        .scan()
        .map(|entry| {
            let entry = entry?;
            let size = std::fs::metadata(&entry.full_path)
                .map_err(|source| LibraryError::Metadata {
                    path: entry.relative_pdf_path.clone(),
                    source,
                })?
                .len();
            Ok(CatalogRecord::new(&entry, size))
        })
        .collect()
}
