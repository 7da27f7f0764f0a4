//! Read access to historical snapshots of the source tree.
//!
//! The engine and the surface analyzers only see the [`SourceReader`] trait.
//! [`GitRepository`] reads snapshots through libgit2; [`MemorySource`] holds
//! them in memory.

pub mod git;
pub mod memory;

use crate::core::Result;
use std::collections::BTreeSet;

pub use git::GitRepository;
pub use memory::MemorySource;

/// Snapshot accessor keyed by revision.
pub trait SourceReader {
    /// Every file path present at `rev`, relative to the repository root.
    fn list_files(&self, rev: &str) -> Result<Vec<String>>;

    /// Content of `path` at `rev`, `None` when the file does not exist there.
    fn read_file_at(&self, rev: &str, path: &str) -> Result<Option<String>>;

    /// Paths that differ between `base` and `head`.
    fn changed_paths(&self, base: &str, head: &str) -> Result<BTreeSet<String>>;

    /// Python files under `roots` at `rev`, excluding `ignore_globs`.
    fn list_source_files(
        &self,
        rev: &str,
        roots: &[String],
        ignore_globs: &[String],
    ) -> Result<BTreeSet<String>> {
        let filter = PathFilter::new(roots, ignore_globs)?;
        Ok(self
            .list_files(rev)?
            .into_iter()
            .filter(|path| path.ends_with(".py") && filter.matches(path))
            .collect())
    }
}

/// Root and ignore-glob filter shared by every file listing.
#[derive(Debug, Clone)]
pub struct PathFilter {
    roots: Vec<String>,
    ignores: Vec<glob::Pattern>,
}

impl PathFilter {
    pub fn new(roots: &[String], ignore_globs: &[String]) -> Result<Self> {
        let ignores = ignore_globs
            .iter()
            .map(|g| glob::Pattern::new(g))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            roots: roots.iter().map(|r| normalize_root(r)).collect(),
            ignores,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.roots.iter().any(|root| is_under(path, root))
            && !self.ignores.iter().any(|pattern| pattern.matches(path))
    }
}

/// Strip `./` prefixes and trailing slashes; `.` becomes the empty root.
pub fn normalize_root(root: &str) -> String {
    let trimmed = root.trim_start_matches("./").trim_end_matches('/');
    if trimmed == "." {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Whether `path` equals `root` or lies below it. The empty root holds everything.
pub fn is_under(path: &str, root: &str) -> bool {
    let root = normalize_root(root);
    root.is_empty()
        || path == root
        || path
            .strip_prefix(root.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
}
