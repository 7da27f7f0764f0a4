//! Git2 library wrapper for snapshot reads
//!
//! Opens a fresh `git2::Repository` per operation; revisions are resolved with
//! `revparse` so branches, tags, `HEAD^` and raw hashes all work.

use super::SourceReader;
use crate::core::{Error, Result};
use git2::{ErrorCode, ObjectType, Repository, Tree, TreeWalkMode, TreeWalkResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub struct GitRepository {
    repo_path: PathBuf,
}

impl GitRepository {
    /// Open a repository, discovering the root from any subdirectory
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| {
            Error::Vcs(format!(
                "failed to discover git repository at {}: {}",
                path.display(),
                e.message()
            ))
        })?;
        Ok(Self {
            repo_path: repo.path().to_path_buf(),
        })
    }

    fn open_repo(&self) -> Result<Repository> {
        Ok(Repository::open(&self.repo_path)?)
    }
}

fn tree_at<'r>(repo: &'r Repository, rev: &str) -> Result<Tree<'r>> {
    repo.revparse_single(rev)
        .and_then(|object| object.peel_to_tree())
        .map_err(|e| Error::Vcs(format!("cannot resolve revision '{rev}': {}", e.message())))
}

impl SourceReader for GitRepository {
    fn list_files(&self, rev: &str) -> Result<Vec<String>> {
        let repo = self.open_repo()?;
        let tree = tree_at(&repo, rev)?;
        let mut paths = Vec::new();
        tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    paths.push(format!("{dir}{name}"));
                }
            }
            TreeWalkResult::Ok
        })?;
        paths.sort();
        Ok(paths)
    }

    fn read_file_at(&self, rev: &str, path: &str) -> Result<Option<String>> {
        let repo = self.open_repo()?;
        let tree = tree_at(&repo, rev)?;
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }
        let blob = entry.to_object(&repo)?.peel_to_blob()?;
        Ok(Some(String::from_utf8_lossy(blob.content()).into_owned()))
    }

    fn changed_paths(&self, base: &str, head: &str) -> Result<BTreeSet<String>> {
        let repo = self.open_repo()?;
        let old = tree_at(&repo, base)?;
        let new = tree_at(&repo, head)?;
        let diff = repo.diff_tree_to_tree(Some(&old), Some(&new), None)?;
        Ok(diff
            .deltas()
            .flat_map(|delta| [delta.old_file().path(), delta.new_file().path()])
            .flatten()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect())
    }
}
