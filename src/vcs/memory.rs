use super::SourceReader;
use crate::core::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// In-memory snapshots: revision name to `path -> content`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    snapshots: HashMap<String, BTreeMap<String, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty snapshot so that `rev` resolves.
    pub fn with_revision(mut self, rev: &str) -> Self {
        self.snapshots.entry(rev.to_string()).or_default();
        self
    }

    pub fn with_file(mut self, rev: &str, path: &str, content: &str) -> Self {
        self.insert(rev, path, content);
        self
    }

    pub fn insert(&mut self, rev: &str, path: &str, content: &str) {
        self.snapshots
            .entry(rev.to_string())
            .or_default()
            .insert(path.to_string(), content.to_string());
    }

    fn snapshot(&self, rev: &str) -> Result<&BTreeMap<String, String>> {
        self.snapshots
            .get(rev)
            .ok_or_else(|| Error::Vcs(format!("cannot resolve revision '{rev}'")))
    }
}

impl SourceReader for MemorySource {
    fn list_files(&self, rev: &str) -> Result<Vec<String>> {
        Ok(self.snapshot(rev)?.keys().cloned().collect())
    }

    fn read_file_at(&self, rev: &str, path: &str) -> Result<Option<String>> {
        Ok(self.snapshot(rev)?.get(path).cloned())
    }

    fn changed_paths(&self, base: &str, head: &str) -> Result<BTreeSet<String>> {
        let old = self.snapshot(base)?;
        let new = self.snapshot(head)?;
        Ok(old
            .keys()
            .chain(new.keys())
            .filter(|path| old.get(*path) != new.get(*path))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_paths_covers_add_remove_modify() {
        let source = MemorySource::new()
            .with_file("base", "same.py", "x")
            .with_file("base", "gone.py", "x")
            .with_file("base", "edit.py", "1")
            .with_file("head", "same.py", "x")
            .with_file("head", "edit.py", "2")
            .with_file("head", "new.py", "x");
        let changed: Vec<String> = source.changed_paths("base", "head").unwrap().into_iter().collect();
        assert_eq!(changed, vec!["edit.py", "gone.py", "new.py"]);
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let source = MemorySource::new().with_revision("base");
        assert_eq!(source.read_file_at("base", "x.py").unwrap(), None);
        assert!(source.read_file_at("other", "x.py").is_err());
    }
}
