//! Concurrent, cancellable file-system scanner
//!
//! One producer walks the tree depth-first while a fixed pool of workers
//! stats and classifies the candidate paths it hands off. Results and errors
//! stream back on dedicated channels; cancellation is cooperative and checked
//! at every blocking point.

mod binary;
mod walker;

pub use binary::{classify, is_binary_file};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ScanError;
use crate::types::{FileEntry, ScanOptions};

use walker::{IgnoreSet, WalkContext};

/// Default number of parallel workers.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Default per-file size cap (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1 << 20;

/// Coordinates one scan: walker, worker pool, channels, and shutdown.
///
/// A `Scanner` runs a single scan; a fresh invocation needs a fresh
/// `Scanner`. [`Scanner::stop`] cancels cooperatively and waits for every
/// task to exit, and is safe to call any number of times.
pub struct Scanner {
    opts: ScanOptions,
    workers: usize,
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
    started: bool,
}

impl Scanner {
    /// Create a scanner with default options: current directory as root,
    /// 1 MiB size cap, no ignore patterns, four workers.
    pub fn new() -> Self {
        Self {
            opts: ScanOptions {
                root_dir: PathBuf::from("."),
                ignore_patterns: Vec::new(),
                max_file_size: DEFAULT_MAX_FILE_SIZE,
                max_files: 0,
            },
            workers: DEFAULT_WORKER_COUNT,
            cancel: CancellationToken::new(),
            handles: Vec::new(),
            started: false,
        }
    }

    /// Set the root directory for scanning.
    pub fn with_root(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            self.opts.root_dir = dir.to_path_buf();
        }
        self
    }

    /// Add ignore patterns; blank patterns are dropped.
    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.opts
            .ignore_patterns
            .extend(patterns.into_iter().filter(|p| !p.trim().is_empty()));
        self
    }

    /// Set the maximum file size for scanning.
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.opts.max_file_size = size;
        self
    }

    /// Cap the number of candidate files handed to the pool (0 = unlimited).
    pub fn with_max_files(mut self, count: usize) -> Self {
        self.opts.max_files = count;
        self
    }

    /// Set the worker-pool size; zero falls back to the default of four.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 {
            DEFAULT_WORKER_COUNT
        } else {
            workers
        };
        self
    }

    /// Start the scan and return the result and error streams.
    ///
    /// Non-zero/non-empty fields of `opts` override the construction-time
    /// options, last write wins. Both streams terminate exactly when the
    /// traversal and every worker have finished or been cancelled. The error
    /// stream is informational but must still be drained alongside the
    /// results to avoid stalling blocked workers.
    pub fn scan(
        &mut self,
        opts: ScanOptions,
    ) -> (mpsc::Receiver<FileEntry>, mpsc::Receiver<ScanError>) {
        let (results_tx, results_rx) = mpsc::channel(1);
        let (errors_tx, errors_rx) = mpsc::channel(1);

        if self.started {
            // Not restartable: a second call yields closed streams.
            tracing::warn!("scan already started; create a new Scanner for a fresh scan");
            return (results_rx, errors_rx);
        }
        self.started = true;
        self.opts.merge(opts);

        // Capacity-1 handoff: the walker blocks until a worker accepts,
        // bounding in-flight memory to roughly one path per idle worker.
        let (paths_tx, paths_rx) = mpsc::channel::<PathBuf>(1);
        let paths_rx = Arc::new(Mutex::new(paths_rx));

        tracing::info!(root = %self.opts.root_dir.display(), workers = self.workers, "starting scan");

        for _ in 0..self.workers {
            let ctx = WorkerContext {
                root: self.opts.root_dir.clone(),
                paths: Arc::clone(&paths_rx),
                results: results_tx.clone(),
                errors: errors_tx.clone(),
                cancel: self.cancel.clone(),
            };
            self.handles.push(tokio::spawn(worker(ctx)));
        }

        let walk_ctx = WalkContext {
            root: self.opts.root_dir.clone(),
            ignore: IgnoreSet::compile(&self.opts.ignore_patterns),
            max_file_size: self.opts.max_file_size,
            max_files: self.opts.max_files,
            paths: paths_tx,
            errors: errors_tx,
            cancel: self.cancel.clone(),
        };
        self.handles.push(tokio::spawn(walker::walk(walk_ctx)));

        (results_rx, errors_rx)
    }

    /// Request cooperative cancellation and wait until the walker and all
    /// workers have exited. Idempotent; a second call returns immediately.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect both scan streams to completion.
///
/// Both must be consumed together: a worker blocked on the error channel
/// never exits, so draining only the results can stall the scan.
pub async fn drain(
    mut results: mpsc::Receiver<FileEntry>,
    mut errors: mpsc::Receiver<ScanError>,
) -> (Vec<FileEntry>, Vec<ScanError>) {
    let mut entries = Vec::new();
    let mut errs = Vec::new();
    let mut results_open = true;
    let mut errors_open = true;
    while results_open || errors_open {
        tokio::select! {
            entry = results.recv(), if results_open => match entry {
                Some(entry) => entries.push(entry),
                None => results_open = false,
            },
            err = errors.recv(), if errors_open => match err {
                Some(err) => errs.push(err),
                None => errors_open = false,
            },
        }
    }
    (entries, errs)
}

/// Everything one worker needs, passed by value.
struct WorkerContext {
    root: PathBuf,
    paths: Arc<Mutex<mpsc::Receiver<PathBuf>>>,
    results: mpsc::Sender<FileEntry>,
    errors: mpsc::Sender<ScanError>,
    cancel: CancellationToken,
}

/// One worker: receive a path, stat and classify it, emit an entry or a
/// wrapped error, repeat. Within one worker, emission order matches receive
/// order; nothing is guaranteed across workers.
async fn worker(ctx: WorkerContext) {
    loop {
        // Take the receiver lock only for the handoff so a single path is
        // claimed by exactly one worker.
        let path = {
            let mut paths = ctx.paths.lock().await;
            tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => return,
                path = paths.recv() => match path {
                    Some(path) => path,
                    None => return,
                },
            }
        };

        match process_file(&ctx.root, &path).await {
            Ok(entry) => {
                tokio::select! {
                    biased;
                    _ = ctx.cancel.cancelled() => return,
                    result = ctx.results.send(entry) => {
                        if result.is_err() {
                            return;
                        }
                    }
                }
            }
            Err(err) => {
                tokio::select! {
                    biased;
                    _ = ctx.cancel.cancelled() => return,
                    result = ctx.errors.send(err) => {
                        if result.is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Build a complete entry for one candidate path, or fail without emitting
/// anything partial.
async fn process_file(root: &Path, path: &Path) -> Result<FileEntry, ScanError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|err| ScanError::Stat {
        path: path.to_path_buf(),
        source: err,
    })?;

    let is_binary = is_binary_file(path).await.map_err(|err| ScanError::Classify {
        path: path.to_path_buf(),
        source: err,
    })?;

    let rel = path
        .strip_prefix(root)
        .map_err(|_| ScanError::OutsideRoot {
            path: path.to_path_buf(),
        })?
        .to_string_lossy()
        .into_owned();

    let mod_time = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .map_err(|err| ScanError::Stat {
            path: path.to_path_buf(),
            source: err,
        })?;

    Ok(FileEntry {
        path: rel,
        size: metadata.len(),
        mod_time,
        is_binary,
        is_selected: false,
        language: None,
    })
}
