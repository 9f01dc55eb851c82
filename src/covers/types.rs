//! Cover generation types

use std::path::PathBuf;

use thiserror::Error;

/// Thumbnail tuning applied by the rasterizer pipeline
///
/// Each option only takes effect when set. The defaults shrink covers to
/// 200px wide at JPEG quality 30.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverOptions {
    /// Target width in pixels; height follows the page aspect ratio
    pub resize_width: Option<u32>,
    /// JPEG quality, 1-100
    pub jpeg_quality: Option<u8>,
}

impl Default for CoverOptions {
    fn default() -> Self {
        Self {
            resize_width: Some(200),
            jpeg_quality: Some(30),
        }
    }
}

impl CoverOptions {
    /// Plain rasterization with the tool's own defaults
    pub fn unscaled() -> Self {
        Self {
            resize_width: None,
            jpeg_quality: None,
        }
    }
}

/// Result of a successful `ensure_cover` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverOutcome {
    /// Target already existed; nothing was run
    Cached,
    /// Rasterizer produced the target
    Generated,
}

/// Summary of a batch cover pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoverReport {
    pub generated: usize,
    pub cached: usize,
    /// Library-relative paths of PDFs whose cover could not be built
    pub failed: Vec<String>,
}

impl CoverReport {
    pub fn total(&self) -> usize {
        self.generated + self.cached + self.failed.len()
    }
}

#[derive(Error, Debug)]
pub enum CoverError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed ({status}): {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("No cover was produced at {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("Failed to create cover directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
