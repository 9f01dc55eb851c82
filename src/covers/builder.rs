//! Cover builder
//!
//! A cover is considered built as soon as its JPEG exists on disk. There is no
//! hashing or mtime check, so a stale cover stays until someone deletes it.
//!
//! # Thread Safety
//!
//! The existence check and the build for one target run under a per-path
//! `tokio::sync::Mutex`, so two workers never rasterize the same cover.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;

use crate::config::CoverConfig;
use crate::library::PdfEntry;

use super::rasterizer::{PopplerRasterizer, Rasterizer};
use super::types::{CoverError, CoverOptions, CoverOutcome, CoverReport};

pub struct CoverBuilder {
    rasterizer: Arc<dyn Rasterizer>,
    options: CoverOptions,
    /// In-flight targets
    locks: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl std::fmt::Debug for CoverBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverBuilder")
            .field("options", &self.options)
            .field("in_flight", &self.locks.lock().len())
            .finish()
    }
}

impl CoverBuilder {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, options: CoverOptions) -> Self {
        Self {
            rasterizer,
            options,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Builder backed by the configured `pdftoppm`/`convert` binaries
    pub fn from_config(config: &CoverConfig) -> Self {
        let rasterizer = PopplerRasterizer::new(&config.pdftoppm_path, &config.convert_path);
        Self::new(Arc::new(rasterizer), config.options)
    }

    /// Make sure a JPEG cover for `pdf` exists at `target`
    ///
    /// Returns immediately when `target` is already on disk. Otherwise the
    /// parent folder is created and the rasterizer is run; the target must
    /// exist afterwards or the call fails with [`CoverError::MissingOutput`].
    pub async fn ensure_cover(&self, pdf: &Path, target: &Path) -> Result<CoverOutcome, CoverError> {
        let lock = self.lock_for(target);
        let result = {
            let _guard = lock.lock().await;
            self.ensure_locked(pdf, target).await
        };
        self.release(target, &lock);

        if let Err(ref e) = result {
            tracing::error!("Error generating cover for {}: {}", pdf.display(), e);
        }
        result
    }

    async fn ensure_locked(&self, pdf: &Path, target: &Path) -> Result<CoverOutcome, CoverError> {
        if file_exists(target).await {
            return Ok(CoverOutcome::Cached);
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CoverError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tracing::info!("Generating cover for {}", pdf.display());
        self.rasterizer
            .render_first_page(pdf, target, &self.options)
            .await?;

        // Some rasterizers exit cleanly on malformed input without writing anything
        if !file_exists(target).await {
            return Err(CoverError::MissingOutput(target.to_path_buf()));
        }

        Ok(CoverOutcome::Generated)
    }

    /// Ensure a cover for every entry, `concurrency` at a time
    ///
    /// With a concurrency of 1 covers are built strictly in scan order.
    /// Individual failures are counted and never stop the batch.
    pub async fn build_all(
        &self,
        entries: &[PdfEntry],
        covers_root: &Path,
        concurrency: usize,
    ) -> CoverReport {
        let mut tasks = stream::iter(entries)
            .map(|entry| async move {
                let target = entry.cover_path(covers_root);
                let outcome = self.ensure_cover(&entry.full_path, &target).await;
                (entry, outcome)
            })
            .buffer_unordered(concurrency.max(1));

        let mut report = CoverReport::default();
        while let Some((entry, outcome)) = tasks.next().await {
            match outcome {
                Ok(CoverOutcome::Generated) => report.generated += 1,
                Ok(CoverOutcome::Cached) => report.cached += 1,
                Err(_) => report.failed.push(entry.relative_pdf_path.clone()),
            }
        }

        tracing::info!(
            "Cover pass complete: {} generated, {} cached, {} failed",
            report.generated,
            report.cached,
            report.failed.len()
        );
        report
    }

    fn lock_for(&self, target: &Path) -> Arc<AsyncMutex<()>> {
        self.locks
            .lock()
            .entry(target.to_path_buf())
            .or_default()
            .clone()
    }

    fn release(&self, target: &Path, lock: &Arc<AsyncMutex<()>>) {
        let mut locks = self.locks.lock();
        // Only the table and this caller still hold it
        if Arc::strong_count(lock) <= 2
            && locks.get(target).is_some_and(|held| Arc::ptr_eq(held, lock))
        {
            locks.remove(target);
        }
    }
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::LibraryScanner;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Copy)]
    enum Behavior {
        /// Write a JPEG at the target
        Write,
        /// Exit cleanly without writing
        Silent,
        /// Report a command failure
        Fail,
    }

    struct FakeRasterizer {
        behavior: Behavior,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl FakeRasterizer {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            })
        }

        fn slow(behavior: Behavior, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Rasterizer for FakeRasterizer {
        async fn render_first_page(
            &self,
            _pdf: &Path,
            target: &Path,
            _options: &CoverOptions,
        ) -> Result<(), CoverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.behavior {
                Behavior::Write => {
                    tokio::fs::write(target, b"\xFF\xD8\xFF").await.unwrap();
                    Ok(())
                }
                Behavior::Silent => Ok(()),
                Behavior::Fail => Err(CoverError::CommandFailed {
                    program: "pdftoppm".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "Syntax Error: Couldn't find trailer dictionary".to_string(),
                }),
            }
        }
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"%PDF-1.4").unwrap();
    }

    #[tokio::test]
    async fn test_generates_missing_cover_with_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let fake = FakeRasterizer::new(Behavior::Write);
        let builder = CoverBuilder::new(fake.clone(), CoverOptions::default());

        let target = temp_dir.path().join("covers/physics/b.jpg");
        let outcome = builder
            .ensure_cover(Path::new("/pdfs/physics/b.pdf"), &target)
            .await
            .unwrap();

        assert_eq!(outcome, CoverOutcome::Generated);
        assert!(target.exists());
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_second_call_is_cached() {
        let temp_dir = TempDir::new().unwrap();
        let fake = FakeRasterizer::new(Behavior::Write);
        let builder = CoverBuilder::new(fake.clone(), CoverOptions::default());
        let target = temp_dir.path().join("a.jpg");

        let first = builder.ensure_cover(Path::new("a.pdf"), &target).await.unwrap();
        let second = builder.ensure_cover(Path::new("a.pdf"), &target).await.unwrap();

        assert_eq!(first, CoverOutcome::Generated);
        assert_eq!(second, CoverOutcome::Cached);
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_existing_cover_never_runs_rasterizer() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("physics/b.jpg");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, b"old cover").unwrap();

        let fake = FakeRasterizer::new(Behavior::Fail);
        let builder = CoverBuilder::new(fake.clone(), CoverOptions::default());
        let outcome = builder.ensure_cover(Path::new("b.pdf"), &target).await.unwrap();

        assert_eq!(outcome, CoverOutcome::Cached);
        assert_eq!(fake.calls(), 0);
        assert_eq!(fs::read(&target).unwrap(), b"old cover");
    }

    #[tokio::test]
    async fn test_silent_rasterizer_is_missing_output() {
        let temp_dir = TempDir::new().unwrap();
        let builder = CoverBuilder::new(FakeRasterizer::new(Behavior::Silent), CoverOptions::default());
        let target = temp_dir.path().join("broken.jpg");

        let result = builder.ensure_cover(Path::new("broken.pdf"), &target).await;
        assert!(matches!(result, Err(CoverError::MissingOutput(ref p)) if *p == target));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_failed_rasterizer_leaves_no_target() {
        let temp_dir = TempDir::new().unwrap();
        let fake = FakeRasterizer::new(Behavior::Fail);
        let builder = CoverBuilder::new(fake.clone(), CoverOptions::default());
        let target = temp_dir.path().join("broken.jpg");

        let result = builder.ensure_cover(Path::new("broken.pdf"), &target).await;
        assert!(matches!(result, Err(CoverError::CommandFailed { .. })));
        assert!(!target.exists());

        // Failures are not remembered; the next call tries again
        let _ = builder.ensure_cover(Path::new("broken.pdf"), &target).await;
        assert_eq!(fake.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_calls_build_once() {
        let temp_dir = TempDir::new().unwrap();
        let fake = FakeRasterizer::slow(Behavior::Write, Duration::from_millis(50));
        let builder = CoverBuilder::new(fake.clone(), CoverOptions::default());
        let target = temp_dir.path().join("shared.jpg");

        let (a, b) = tokio::join!(
            builder.ensure_cover(Path::new("shared.pdf"), &target),
            builder.ensure_cover(Path::new("shared.pdf"), &target),
        );

        let mut outcomes = vec![a.unwrap(), b.unwrap()];
        outcomes.sort_by_key(|o| matches!(o, CoverOutcome::Generated));
        assert_eq!(outcomes, vec![CoverOutcome::Cached, CoverOutcome::Generated]);
        assert_eq!(fake.calls(), 1);
        assert!(builder.locks.lock().is_empty());
    }

    #[tokio::test]
    async fn test_build_all_continues_after_failures() {
        let temp_dir = TempDir::new().unwrap();
        let pdfs = temp_dir.path().join("pdfs");
        let covers = temp_dir.path().join("covers");
        touch(&pdfs, "a.pdf");
        touch(&pdfs, "physics/b.pdf");
        touch(&pdfs, "physics/c.pdf");

        let entries = LibraryScanner::new(&pdfs).scan_all().unwrap();
        let fake = FakeRasterizer::new(Behavior::Silent);
        let builder = CoverBuilder::new(fake.clone(), CoverOptions::default());

        let report = builder.build_all(&entries, &covers, 1).await;
        assert_eq!(report.generated, 0);
        assert_eq!(report.failed.len(), 3);
        assert_eq!(report.total(), 3);
        assert_eq!(fake.calls(), 3);
    }

    #[tokio::test]
    async fn test_build_all_skips_existing_covers() {
        let temp_dir = TempDir::new().unwrap();
        let pdfs = temp_dir.path().join("pdfs");
        let covers = temp_dir.path().join("covers");
        touch(&pdfs, "a.pdf");
        touch(&pdfs, "physics/b.pdf");
        fs::create_dir_all(covers.join("physics")).unwrap();
        fs::write(covers.join("physics/b.jpg"), b"cover").unwrap();

        let entries = LibraryScanner::new(&pdfs).scan_all().unwrap();
        let fake = FakeRasterizer::new(Behavior::Write);
        let builder = CoverBuilder::new(fake.clone(), CoverOptions::default());

        let report = builder.build_all(&entries, &covers, 4).await;
        assert_eq!(report.generated, 1);
        assert_eq!(report.cached, 1);
        assert!(report.failed.is_empty());
        assert_eq!(fake.calls(), 1);
        assert!(covers.join("a.jpg").exists());

        let again = builder.build_all(&entries, &covers, 1).await;
        assert_eq!(again.cached, 2);
        assert_eq!(fake.calls(), 1);
    }

    // Needs a case-sensitive filesystem for both spellings to coexist
    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_extension_case_variants_each_get_a_cover() {
        let temp_dir = TempDir::new().unwrap();
        let pdfs = temp_dir.path().join("pdfs");
        let covers = temp_dir.path().join("covers");
        touch(&pdfs, "Notes.pdf");
        touch(&pdfs, "Notes.PDF");

        let entries = LibraryScanner::new(&pdfs).scan_all().unwrap();
        let fake = FakeRasterizer::new(Behavior::Write);
        let builder = CoverBuilder::new(fake.clone(), CoverOptions::default());

        let report = builder.build_all(&entries, &covers, 1).await;
        assert_eq!(report.generated, 2);
        assert_eq!(report.cached, 0);
        assert_eq!(fake.calls(), 2);
        assert!(covers.join("Notes.jpg").exists());
        assert!(covers.join("Notes.PDF.jpg").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pdftoppm_contract_with_stub_binary() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let stub = temp_dir.path().join("pdftoppm");
        // Writes "<last arg>.jpg" like pdftoppm -singlefile
        fs::write(&stub, "#!/bin/sh\nfor last; do :; done\nprintf 'jpeg' > \"$last.jpg\"\n").unwrap();
        fs::set_permissions(&stub, fs::Permissions::from_mode(0o755)).unwrap();

        let config = CoverConfig {
            pdftoppm_path: stub.display().to_string(),
            convert_path: "/nonexistent/convert".to_string(),
            options: CoverOptions::unscaled(),
            concurrency: 1,
        };
        let builder = CoverBuilder::from_config(&config);
        let target = temp_dir.path().join("covers/physics/b.jpg");

        let outcome = builder
            .ensure_cover(Path::new("b.pdf"), &target)
            .await
            .unwrap();
        assert_eq!(outcome, CoverOutcome::Generated);
        assert_eq!(fs::read(&target).unwrap(), b"jpeg");
    }
}
