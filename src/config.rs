//! Configuration management for PDF Shelf Server

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::covers::CoverOptions;

/// Default listening port when `PORT` is unset or invalid
pub const DEFAULT_PORT: u16 = 10000;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub library: LibraryConfig,
    pub covers: CoverConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Filesystem roots, all resolved beside the executable by default
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    pub pdf_dir: PathBuf,
    pub covers_dir: PathBuf,
    pub public_dir: PathBuf,
    /// Log every access under `/pdfs`
    pub log_downloads: bool,
}

#[derive(Debug, Clone)]
pub struct CoverConfig {
    /// Rasterizer executable (default: "pdftoppm" - uses PATH)
    pub pdftoppm_path: String,
    /// Resize executable (default: "convert" - uses PATH)
    pub convert_path: String,
    pub options: CoverOptions,
    /// Number of covers built at once during the startup pass
    pub concurrency: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("JPEG quality must be between 1 and 100, got {0}")]
    QualityOutOfRange(u32),
}

impl Default for CoverConfig {
    fn default() -> Self {
        CoverConfig {
            pdftoppm_path: "pdftoppm".to_string(),
            convert_path: "convert".to_string(),
            options: CoverOptions::default(),
            concurrency: 1,
        }
    }
}

impl LibraryConfig {
    /// Lay out `pdfs/`, `covers/` and `public/` under one root
    pub fn under(root: &Path) -> Self {
        LibraryConfig {
            pdf_dir: root.join("pdfs"),
            covers_dir: root.join("covers"),
            public_dir: root.join("public"),
            log_downloads: true,
        }
    }
}

impl Config {
    /// Default configuration with every directory under `root`
    pub fn with_root(root: &Path) -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
            },
            library: LibraryConfig::under(root),
            covers: CoverConfig::default(),
        }
    }

    /// Load from the process environment
    ///
    /// An unparseable value is logged and only that field keeps its default.
    pub fn from_env() -> Self {
        let (config, errors) = Self::from_vars(|key| env::var(key).ok());
        for error in &errors {
            tracing::warn!("Ignoring config value: {}, keeping the default", error);
        }
        config
    }

    /// Build a config from `lookup`, collecting one error per rejected field
    pub fn from_vars<F>(lookup: F) -> (Self, Vec<ConfigError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = lookup("APP_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(default_app_root);
        let mut config = Config::with_root(&root);
        let mut errors = Vec::new();

        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(value) = lookup("PORT") {
            match value.trim().parse() {
                Ok(port) => config.server.port = port,
                Err(_) => errors.push(ConfigError::InvalidValue {
                    key: "PORT",
                    value,
                }),
            }
        }

        if let Some(dir) = lookup("PDF_DIR") {
            config.library.pdf_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("COVERS_DIR") {
            config.library.covers_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("PUBLIC_DIR") {
            config.library.public_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("LOG_DOWNLOADS") {
            match parse_bool("LOG_DOWNLOADS", &value) {
                Ok(enabled) => config.library.log_downloads = enabled,
                Err(e) => errors.push(e),
            }
        }

        if let Some(path) = lookup("PDFTOPPM_PATH") {
            config.covers.pdftoppm_path = path;
        }
        if let Some(path) = lookup("CONVERT_PATH") {
            config.covers.convert_path = path;
        }
        if let Some(value) = lookup("COVER_WIDTH") {
            match parse_width(&value) {
                Ok(width) => config.covers.options.resize_width = width,
                Err(e) => errors.push(e),
            }
        }
        if let Some(value) = lookup("COVER_QUALITY") {
            match parse_quality(&value) {
                Ok(quality) => config.covers.options.jpeg_quality = quality,
                Err(e) => errors.push(e),
            }
        }
        if let Some(value) = lookup("COVER_CONCURRENCY") {
            match value.trim().parse::<usize>() {
                Ok(n) => config.covers.concurrency = n.max(1),
                Err(_) => errors.push(ConfigError::InvalidValue {
                    key: "COVER_CONCURRENCY",
                    value,
                }),
            }
        }

        (config, errors)
    }
}

/// Directory holding the running executable, or the working directory
fn default_app_root() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn is_disabled(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("off")
}

fn parse_width(value: &str) -> Result<Option<u32>, ConfigError> {
    if is_disabled(value) {
        return Ok(None);
    }
    match value.trim().parse::<u32>() {
        Ok(0) => Ok(None),
        Ok(width) => Ok(Some(width)),
        Err(_) => Err(ConfigError::InvalidValue {
            key: "COVER_WIDTH",
            value: value.to_string(),
        }),
    }
}

fn parse_quality(value: &str) -> Result<Option<u8>, ConfigError> {
    if is_disabled(value) {
        return Ok(None);
    }
    let quality = value
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidValue {
            key: "COVER_QUALITY",
            value: value.to_string(),
        })?;
    match u8::try_from(quality) {
        Ok(q) if (1..=100).contains(&q) => Ok(Some(q)),
        _ => Err(ConfigError::QualityOutOfRange(quality)),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
