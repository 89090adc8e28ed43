//! Building a coverage map from a V8 coverage directory
//!
//! Discovery and validation run up front on the blocking pool and are
//! fatal. Script conversion then fans out over tokio tasks, at most `jobs`
//! in flight, and every result that converts cleanly is merged into one
//! [`CoverageMap`].

use crate::convert::convert_script;
use crate::discover::find_coverage_files;
use crate::exclude::ExcludeSet;
use crate::istanbul::CoverageMap;
use crate::result::{V8CovError, V8CovResult};
use crate::v8::{load_process_coverage, FunctionCoverage};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinError;

/// Callbacks fired while scripts are converted
pub trait ConversionObserver: Send + Sync {
    /// Conversion is about to start for `total` scripts
    fn on_start(&self, _total: usize) {}

    /// A script converted successfully
    fn on_converted(&self, _path: &str) {}

    /// A script failed and was skipped
    fn on_failed(&self, _path: &str, _error: &V8CovError) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {}

/// Counters gathered during a collection run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Coverage files read
    pub files_read: usize,
    /// Script entries seen across all files
    pub scripts_total: usize,
    /// Scripts dropped by exclude patterns
    pub scripts_excluded: usize,
    /// Scripts without a `file://` URL
    pub scripts_skipped_non_file: usize,
    /// Scripts converted
    pub scripts_converted: usize,
    /// Scripts that failed to convert
    pub scripts_failed: usize,
}

/// Collects V8 coverage into an Istanbul coverage map
#[derive(Clone)]
pub struct CoverageCollector {
    coverage_path: PathBuf,
    exclude: ExcludeSet,
    jobs: usize,
    observer: Arc<dyn ConversionObserver>,
}

impl std::fmt::Debug for CoverageCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverageCollector")
            .field("coverage_path", &self.coverage_path)
            .field("exclude", &self.exclude)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

impl CoverageCollector {
    /// Collector for a coverage file or directory, with the default excludes
    #[must_use]
    pub fn new(coverage_path: impl Into<PathBuf>) -> Self {
        Self {
            coverage_path: coverage_path.into(),
            exclude: ExcludeSet::default_set(),
            jobs: default_jobs(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Replace the exclude patterns
    #[must_use]
    pub fn with_exclude(mut self, exclude: ExcludeSet) -> Self {
        self.exclude = exclude;
        self
    }

    /// Maximum conversions in flight; `0` means available parallelism
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = if jobs == 0 { default_jobs() } else { jobs };
        self
    }

    /// Receive progress events
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ConversionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Coverage path being read
    #[must_use]
    pub fn coverage_path(&self) -> &Path {
        &self.coverage_path
    }

    /// Concurrency limit
    #[must_use]
    pub const fn jobs(&self) -> usize {
        self.jobs
    }

    /// Read, filter and convert every script, merging the results
    pub async fn collect(&self) -> V8CovResult<(CoverageMap, CollectStats)> {
        let scanner = self.clone();
        let (pending, mut stats) = tokio::task::spawn_blocking(move || {
            let mut stats = CollectStats::default();
            scanner.pending_scripts(&mut stats).map(|p| (p, stats))
        })
        .await
        .map_err(join_error)??;

        tracing::info!(
            scripts = pending.len(),
            excluded = stats.scripts_excluded,
            jobs = self.jobs,
            "converting scripts"
        );
        self.observer.on_start(pending.len());

        let mut results = stream::iter(pending)
            .map(|(path, functions)| {
                let task_path = path.clone();
                let handle =
                    tokio::spawn(async move { convert_script(task_path, &functions).await });
                async move { (path, handle.await) }
            })
            .buffer_unordered(self.jobs);

        let mut map = CoverageMap::new();
        while let Some((path, joined)) = results.next().await {
            let outcome = joined.unwrap_or_else(|e| Err(join_error(e)));
            match outcome {
                Ok(coverage) => {
                    stats.scripts_converted += 1;
                    self.observer.on_converted(&path);
                    map.add_file_coverage(coverage);
                }
                Err(e) => {
                    stats.scripts_failed += 1;
                    tracing::error!("Error processing {path}: {e}");
                    self.observer.on_failed(&path, &e);
                }
            }
        }

        tracing::debug!(?stats, files = map.len(), "collection finished");
        Ok((map, stats))
    }

    /// Load every coverage file and list the scripts left to convert
    fn pending_scripts(
        &self,
        stats: &mut CollectStats,
    ) -> V8CovResult<Vec<(String, Vec<FunctionCoverage>)>> {
        let files = find_coverage_files(&self.coverage_path)?;
        let mut pending = Vec::new();

        for file in files {
            let coverage = load_process_coverage(&file)?;
            stats.files_read += 1;
            stats.scripts_total += coverage.scripts().len();
            tracing::debug!(file = %file.display(), scripts = coverage.scripts().len(), "loaded coverage file");

            let mut file_scripts = 0;
            for script in coverage.file_scripts() {
                file_scripts += 1;
                let Some(path) = script.file_path() else {
                    continue;
                };
                if self.exclude.is_excluded(path) {
                    stats.scripts_excluded += 1;
                    tracing::trace!(path, "excluded");
                    continue;
                }
                pending.push((path.to_string(), script.functions.clone()));
            }
            stats.scripts_skipped_non_file += coverage.scripts().len() - file_scripts;
        }
        Ok(pending)
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

fn join_error(e: JoinError) -> V8CovError {
    V8CovError::Io(std::io::Error::other(e.to_string()))
}
