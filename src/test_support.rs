//! Repository fixtures for unit tests.
//!
//! Commits are built directly through libgit2 so unit tests do not depend on
//! the system git binary. Every commit is a full snapshot of the files passed
//! in; anything not listed is absent from the tree.

use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Oid, Repository, Signature, Time};
use tempfile::TempDir;

pub struct RepoFixture {
    pub dir: TempDir,
    pub repo: Repository,
}

impl RepoFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init repository");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit a snapshot on HEAD's branch, parented on the current HEAD.
    pub fn commit(&self, files: &[(&str, &str)], time: i64, message: &str) -> Oid {
        let parents: Vec<Oid> = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.target())
            .into_iter()
            .collect();
        self.commit_with_parents(files, &parents, time, message, Some("HEAD"))
    }

    /// Commit a snapshot with explicit parents, optionally moving `update_ref`.
    pub fn commit_with_parents(
        &self,
        files: &[(&str, &str)],
        parents: &[Oid],
        time: i64,
        message: &str,
        update_ref: Option<&str>,
    ) -> Oid {
        let tree_id = self.snapshot(files);
        let tree = self.repo.find_tree(tree_id).unwrap();
        let signature =
            Signature::new("Test User", "test@example.com", &Time::new(time, 0)).unwrap();
        let parent_commits: Vec<_> = parents
            .iter()
            .map(|id| self.repo.find_commit(*id).unwrap())
            .collect();
        let parent_refs: Vec<_> = parent_commits.iter().collect();
        self.repo
            .commit(
                update_ref,
                &signature,
                &signature,
                message,
                &tree,
                &parent_refs,
            )
            .unwrap()
    }

    /// Replace the working tree with `files` and write it as a tree.
    fn snapshot(&self, files: &[(&str, &str)]) -> Oid {
        for entry in fs::read_dir(self.path()).unwrap() {
            let path = entry.unwrap().path();
            if path.file_name().is_some_and(|name| name == ".git") {
                continue;
            }
            if path.is_dir() {
                fs::remove_dir_all(&path).unwrap();
            } else {
                fs::remove_file(&path).unwrap();
            }
        }
        for (name, content) in files {
            let path = self.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, content).unwrap();
        }
        let mut index = self.repo.index().unwrap();
        index.clear().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        index.write_tree().unwrap()
    }
}
