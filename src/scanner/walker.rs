//! Depth-first path producer and ignore-rule matching

use std::path::PathBuf;

use globset::{GlobBuilder, GlobMatcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ScanError;

/// One compiled ignore rule.
///
/// A raw pattern participates in up to three match modes at once: exact glob
/// against the root-relative path, substring containment, and the `dir/*`
/// directory-wildcard form that prunes an entire subtree.
struct IgnoreRule {
    raw: String,
    glob: Option<GlobMatcher>,
    /// For `dir/*` patterns, the `dir/` prefix (and bare `dir` name).
    dir_prefix: Option<String>,
}

/// Ordered set of ignore rules, compiled once per scan.
pub(crate) struct IgnoreSet {
    rules: Vec<IgnoreRule>,
}

impl IgnoreSet {
    pub(crate) fn compile(patterns: &[String]) -> Self {
        let rules = patterns
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|pattern| {
                // `*` must not cross path separators, matching classic
                // per-component glob semantics.
                let glob = match GlobBuilder::new(pattern).literal_separator(true).build() {
                    Ok(glob) => Some(glob.compile_matcher()),
                    Err(err) => {
                        tracing::debug!(pattern, %err, "ignoring unparsable glob pattern");
                        None
                    }
                };
                let dir_prefix = pattern
                    .strip_suffix("/*")
                    .map(|stem| format!("{}/", stem));
                IgnoreRule {
                    raw: pattern.clone(),
                    glob,
                    dir_prefix,
                }
            })
            .collect();
        Self { rules }
    }

    /// Whether a root-relative file path is excluded.
    pub(crate) fn matches_file(&self, rel: &str) -> bool {
        self.rules.iter().any(|rule| {
            rule.glob.as_ref().is_some_and(|g| g.is_match(rel))
                || rel.contains(&rule.raw)
                || rule
                    .dir_prefix
                    .as_ref()
                    .is_some_and(|prefix| rel.starts_with(prefix.as_str()))
        })
    }

    /// Whether a root-relative directory path is excluded.
    ///
    /// A match here skips descent into the whole subtree. A `dir/*` rule
    /// matches the directory itself, not only its children.
    pub(crate) fn matches_dir(&self, rel: &str) -> bool {
        if self.matches_file(rel) {
            return true;
        }
        self.rules.iter().any(|rule| {
            rule.dir_prefix
                .as_ref()
                .is_some_and(|prefix| rel == prefix.trim_end_matches('/'))
        })
    }
}

/// Everything the walker task needs, passed by value.
pub(crate) struct WalkContext {
    pub root: PathBuf,
    pub ignore: IgnoreSet,
    pub max_file_size: u64,
    pub max_files: usize,
    pub paths: mpsc::Sender<PathBuf>,
    pub errors: mpsc::Sender<ScanError>,
    pub cancel: CancellationToken,
}

/// Depth-first traversal producing the filtered candidate stream.
///
/// Per entry the filters apply in order: size first (never for directories),
/// then the ignore rules against the root-relative path. Eligible paths are
/// pushed into the handoff channel; the push blocks until a worker accepts or
/// cancellation fires, which is the scan's sole backpressure mechanism.
pub(crate) async fn walk(ctx: WalkContext) {
    let mut stack = vec![ctx.root.clone()];
    let mut sent = 0usize;

    while let Some(dir) = stack.pop() {
        if ctx.cancel.is_cancelled() {
            tracing::debug!("walker cancelled, pruning remaining subtrees");
            return;
        }

        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(err) => {
                report(&ctx, ScanError::Walk { path: dir, source: err }).await;
                continue;
            }
        };

        let mut children = Vec::new();
        loop {
            match read_dir.next_entry().await {
                Ok(Some(entry)) => children.push(entry.path()),
                Ok(None) => break,
                Err(err) => {
                    report(
                        &ctx,
                        ScanError::Walk {
                            path: dir.clone(),
                            source: err,
                        },
                    )
                    .await;
                    break;
                }
            }
        }
        // Stable name order within a directory; cross-worker emission order
        // is still unspecified.
        children.sort();

        for path in children {
            if ctx.cancel.is_cancelled() {
                return;
            }

            let metadata = match tokio::fs::symlink_metadata(&path).await {
                Ok(metadata) => metadata,
                Err(err) => {
                    report(&ctx, ScanError::Walk { path, source: err }).await;
                    continue;
                }
            };

            let rel = match path.strip_prefix(&ctx.root) {
                Ok(rel) => rel.to_string_lossy().into_owned(),
                Err(_) => {
                    report(&ctx, ScanError::OutsideRoot { path }).await;
                    continue;
                }
            };

            if metadata.is_dir() {
                if ctx.ignore.matches_dir(&rel) {
                    tracing::debug!(path = %rel, "skipping ignored subtree");
                } else {
                    stack.push(path);
                }
                continue;
            }

            // Size filter applies to everything that is not a directory.
            if metadata.len() > ctx.max_file_size {
                tracing::debug!(path = %rel, size = metadata.len(), "skipping large file");
                continue;
            }

            if ctx.ignore.matches_file(&rel) {
                tracing::debug!(path = %rel, "skipping ignored file");
                continue;
            }

            tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => {
                    tracing::debug!(sent, "walker cancelled during handoff");
                    return;
                }
                result = ctx.paths.send(path) => {
                    if result.is_err() {
                        tracing::debug!(sent, "walker stopping: workers have exited");
                        return;
                    }
                }
            }

            sent += 1;
            if ctx.max_files > 0 && sent >= ctx.max_files {
                tracing::info!(max_files = ctx.max_files, "file cap reached, stopping traversal");
                return;
            }
        }
    }
}

/// Send a recoverable traversal error, giving up on cancellation.
async fn report(ctx: &WalkContext, err: ScanError) {
    tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => {}
        _ = ctx.errors.send(err) => {}
    }
}
