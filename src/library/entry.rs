//! Document types produced by the scanner

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Category assigned to PDFs sitting directly in the library root
pub const ROOT_CATEGORY: &str = "general";

/// One PDF discovered during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfEntry {
    /// File name including extension
    pub name: String,
    /// Relative folder path (`/`-separated), or "general" at the root
    pub category: String,
    /// Path of the source PDF, joined onto the configured library root
    pub full_path: PathBuf,
    /// Path relative to the library root (`/`-separated)
    pub relative_pdf_path: String,
}

impl PdfEntry {
    /// File name without a lowercase `.pdf` suffix
    ///
    /// Other spellings (`.PDF`, `.Pdf`) are kept so that `Notes.pdf` and
    /// `Notes.PDF` in one folder get distinct covers.
    pub fn stem(&self) -> &str {
        self.name.strip_suffix(".pdf").unwrap_or(&self.name)
    }

    /// Folder part of `relative_pdf_path`, `None` at the root
    pub fn directory(&self) -> Option<&str> {
        self.relative_pdf_path.rsplit_once('/').map(|(dir, _)| dir)
    }

    /// Cover location relative to the covers root, mirroring the PDF's folder
    pub fn cover_relative(&self) -> String {
        match self.directory() {
            Some(dir) => format!("{}/{}.jpg", dir, self.stem()),
            None => format!("{}.jpg", self.stem()),
        }
    }

    /// Cover path under `covers_root`
    pub fn cover_path(&self, covers_root: &Path) -> PathBuf {
        self.cover_relative()
            .split('/')
            .fold(covers_root.to_path_buf(), |path, part| path.join(part))
    }

    /// Public URL of the cover image
    pub fn cover_url(&self) -> String {
        format!("/covers/{}", self.cover_relative())
    }

    /// Public URL of the PDF download
    pub fn pdf_url(&self) -> String {
        format!("/pdfs/{}", self.relative_pdf_path)
    }
}

/// Flat listing record returned by `/api/pdfs`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CatalogRecord {
    pub name: String,
    pub category: String,
    pub size: u64,
    pub cover: String,
    pub pdf: String,
}

impl CatalogRecord {
    pub fn new(entry: &PdfEntry, size: u64) -> Self {
        Self {
            name: entry.name.clone(),
            category: entry.category.clone(),
            size,
            cover: entry.cover_url(),
            pdf: entry.pdf_url(),
        }
    }
}
