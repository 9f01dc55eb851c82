//! PDF rasterizers
//!
//! The default pipeline shells out to poppler's `pdftoppm` for the first page
//! and, when a width is configured, to ImageMagick's `convert` for the resize.
//!
//! ## Requirements
//!
//! - `pdftoppm` must be installed and available in PATH (or configured)
//! - `convert` is only needed when a resize width is set

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::types::{CoverError, CoverOptions};

/// Renders the first page of a PDF as a JPEG
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Write page 1 of `pdf` to `target` (a `.jpg` path)
    async fn render_first_page(
        &self,
        pdf: &Path,
        target: &Path,
        options: &CoverOptions,
    ) -> Result<(), CoverError>;
}

/// `pdftoppm` + `convert` pipeline
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    pdftoppm_path: String,
    convert_path: String,
}

impl PopplerRasterizer {
    pub fn new(pdftoppm_path: impl Into<String>, convert_path: impl Into<String>) -> Self {
        Self {
            pdftoppm_path: pdftoppm_path.into(),
            convert_path: convert_path.into(),
        }
    }

    async fn run(&self, program: &str, args: Vec<OsString>) -> Result<(), CoverError> {
        tracing::debug!("Running {} {:?}", program, args);

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CoverError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CoverError::CommandFailed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Rasterizer for PopplerRasterizer {
    async fn render_first_page(
        &self,
        pdf: &Path,
        target: &Path,
        options: &CoverOptions,
    ) -> Result<(), CoverError> {
        // pdftoppm appends ".jpg" itself in -singlefile mode
        let output_base = target.with_extension("");
        self.run(&self.pdftoppm_path, pdftoppm_args(pdf, &output_base, options))
            .await?;

        if let Some(width) = options.resize_width {
            self.run(&self.convert_path, convert_args(target, width, options.jpeg_quality))
                .await?;
        }

        Ok(())
    }
}

fn pdftoppm_args(pdf: &Path, output_base: &Path, options: &CoverOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-jpeg".into()];
    if let Some(quality) = options.jpeg_quality {
        args.push("-jpegopt".into());
        args.push(format!("quality={}", quality).into());
    }
    args.extend(["-singlefile", "-f", "1", "-l", "1"].map(OsString::from));
    args.push(pdf.as_os_str().to_owned());
    args.push(output_base.as_os_str().to_owned());
    args
}

/// Resize in place, keeping the aspect ratio
fn convert_args(target: &Path, width: u32, quality: Option<u8>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        target.as_os_str().to_owned(),
        "-resize".into(),
        width.to_string().into(),
    ];
    if let Some(quality) = quality {
        args.push("-quality".into());
        args.push(quality.to_string().into());
    }
    args.push(target.as_os_str().to_owned());
    args
}
