//! Directory tree rendering for the output artifact's context block

use std::path::Path;

use globset::{Glob, GlobMatcher};

/// Render an indented tree of `root`, honoring ignore patterns.
///
/// Best-effort: unreadable directories are silently skipped, since the tree
/// is advisory context rather than the artifact payload.
pub fn directory_tree(root: &Path, ignore_patterns: &[String]) -> String {
    let matcher = TreeMatcher::new(ignore_patterns);
    let mut out = String::from(".\n");
    render_dir(root, "", &matcher, 0, &mut out);
    out
}

struct TreeMatcher {
    globs: Vec<GlobMatcher>,
    substrings: Vec<String>,
}

impl TreeMatcher {
    fn new(patterns: &[String]) -> Self {
        let mut globs = Vec::new();
        let mut substrings = Vec::new();
        for pattern in patterns {
            let trimmed = pattern.trim();
            if trimmed.is_empty() {
                continue;
            }
            // Directory wildcards reduce to their directory name here.
            let trimmed = trimmed.strip_suffix("/*").unwrap_or(trimmed);
            if let Ok(glob) = Glob::new(trimmed) {
                globs.push(glob.compile_matcher());
            }
            substrings.push(trimmed.to_string());
        }
        Self { globs, substrings }
    }

    fn ignored(&self, rel: &str, name: &str) -> bool {
        self.globs.iter().any(|g| g.is_match(name))
            || self.substrings.iter().any(|s| rel.contains(s.as_str()))
    }
}

fn render_dir(dir: &Path, rel: &str, matcher: &TreeMatcher, depth: usize, out: &mut String) {
    let Ok(read) = std::fs::read_dir(dir) else {
        return;
    };

    let mut entries: Vec<_> = read.flatten().collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let child_rel = if rel.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", rel, name)
        };
        if matcher.ignored(&child_rel, &name) {
            continue;
        }

        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str("├── ");
        out.push_str(&name);
        if is_dir {
            out.push('/');
        }
        out.push('\n');

        if is_dir {
            render_dir(&entry.path(), &child_rel, matcher, depth + 1, out);
        }
    }
}
