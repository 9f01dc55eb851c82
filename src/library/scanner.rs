//! Library scanner for nested PDF folders
//!
//! Walks the PDF root and yields one [`PdfEntry`] per `.pdf` file. The folder
//! path below the root becomes the entry's category. Each call re-walks the
//! tree from scratch; nothing is cached between scans.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::LibraryError;

use super::entry::{PdfEntry, ROOT_CATEGORY};

/// Scanner for a folder tree of PDFs
#[derive(Debug, Clone)]
pub struct LibraryScanner {
    root: PathBuf,
}

impl LibraryScanner {
    /// Create a new library scanner
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Lazily walk the library, in directory-listing order
    ///
    /// Symlinks are followed. Filesystem loops are logged and skipped; every
    /// other walk error is yielded to the caller.
    pub fn scan(&self) -> impl Iterator<Item = Result<PdfEntry, LibraryError>> {
        let root = self.root.clone();

        WalkDir::new(&self.root)
            .follow_links(true)
            .min_depth(1)
            .into_iter()
            .filter_map(move |item| match item {
                Ok(entry) => to_pdf_entry(&root, &entry).map(Ok),
                Err(e) if e.loop_ancestor().is_some() => {
                    tracing::warn!(
                        "Skipping filesystem loop at {}",
                        e.path().map(|p| p.display().to_string()).unwrap_or_default()
                    );
                    None
                }
                Err(e) => {
                    let path = e.path().unwrap_or(root.as_path()).display().to_string();
                    Some(Err(LibraryError::Walk { path, source: e }))
                }
            })
    }

    /// Scan the entire library, failing on the first walk error
    pub fn scan_all(&self) -> Result<Vec<PdfEntry>, LibraryError> {
        tracing::debug!("Scanning PDF library at {}", self.root.display());
        let entries = self.scan().collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("Found {} PDFs", entries.len());
        Ok(entries)
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn to_pdf_entry(root: &Path, entry: &DirEntry) -> Option<PdfEntry> {
    if !entry.file_type().is_file() || !is_pdf(entry.path()) {
        return None;
    }

    let relative = entry.path().strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let (name, folders) = parts.split_last()?;

    let category = if folders.is_empty() {
        ROOT_CATEGORY.to_string()
    } else {
        folders.join("/")
    };

    Some(PdfEntry {
        name: name.clone(),
        category,
        full_path: entry.path().to_path_buf(),
        relative_pdf_path: parts.join("/"),
    })
}
