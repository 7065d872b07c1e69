//! Commit diff classification.
//!
//! Turns a commit into the ordered list of paths it changed:
//!
//! - A root commit reports every top-level entry of its tree as `added`, in
//!   tree order. Subdirectories are reported by name, not descended into.
//! - Any other commit is diffed against its **first** parent only, with
//!   rename detection. Changes brought in solely by later merge parents are
//!   not reported.
//!
//! Renames collapse to `added` on the new path.

use std::collections::HashSet;

use git2::{Commit, Delta, DiffFindOptions, DiffOptions, Repository, Tree};

use crate::revision::{Action, FileChange};

/// Minimum similarity (percent) for a delete/add pair to count as a rename.
const RENAME_THRESHOLD: u16 = 60;

/// Map a libgit2 change kind onto the connector's actions.
pub fn classify(delta: Delta) -> Action {
    match delta {
        Delta::Added | Delta::Renamed => Action::Added,
        Delta::Modified => Action::Modified,
        Delta::Deleted => Action::Deleted,
        _ => Action::Unknown,
    }
}

/// The changes introduced by `commit`.
pub fn changes_for(repo: &Repository, commit: &Commit<'_>) -> Result<Vec<FileChange>, git2::Error> {
    let tree = commit.tree()?;
    let changes = if commit.parent_count() == 0 {
        root_changes(&tree)
    } else {
        let parent_tree = commit.parent(0)?.tree()?;
        tree_changes(repo, &parent_tree, &tree)?
    };
    Ok(dedup(changes))
}

fn root_changes(tree: &Tree<'_>) -> Vec<FileChange> {
    tree.iter()
        .map(|entry| {
            let name = String::from_utf8_lossy(entry.name_bytes()).into_owned();
            FileChange::new(name, Action::Added)
        })
        .collect()
}

fn tree_changes(
    repo: &Repository,
    old_tree: &Tree<'_>,
    new_tree: &Tree<'_>,
) -> Result<Vec<FileChange>, git2::Error> {
    let mut diff_opts = DiffOptions::new();
    let mut diff = repo.diff_tree_to_tree(Some(old_tree), Some(new_tree), Some(&mut diff_opts))?;

    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    find_opts.rename_threshold(RENAME_THRESHOLD);
    diff.find_similar(Some(&mut find_opts))?;

    let changes = diff
        .deltas()
        .filter_map(|delta| {
            let path = delta.new_file().path().or_else(|| delta.old_file().path())?;
            Some(FileChange::new(
                path.to_string_lossy().into_owned(),
                classify(delta.status()),
            ))
        })
        .collect();
    Ok(changes)
}

/// Drop repeated entries, keeping the first occurrence.
fn dedup(changes: Vec<FileChange>) -> Vec<FileChange> {
    let mut seen = HashSet::new();
    changes
        .into_iter()
        .filter(|change| seen.insert(change.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RepoFixture;
    use proptest::prelude::*;

    const ALL_DELTAS: [Delta; 11] = [
        Delta::Unmodified,
        Delta::Added,
        Delta::Deleted,
        Delta::Modified,
        Delta::Renamed,
        Delta::Copied,
        Delta::Ignored,
        Delta::Untracked,
        Delta::Typechange,
        Delta::Unreadable,
        Delta::Conflicted,
    ];

    fn changes(fixture: &RepoFixture, id: git2::Oid) -> Vec<FileChange> {
        let commit = fixture.repo.find_commit(id).unwrap();
        changes_for(&fixture.repo, &commit).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(Delta::Added), Action::Added);
        assert_eq!(classify(Delta::Renamed), Action::Added);
        assert_eq!(classify(Delta::Modified), Action::Modified);
        assert_eq!(classify(Delta::Deleted), Action::Deleted);
        assert_eq!(classify(Delta::Copied), Action::Unknown);
        assert_eq!(classify(Delta::Typechange), Action::Unknown);
        assert_eq!(classify(Delta::Unmodified), Action::Unknown);
        assert_eq!(classify(Delta::Untracked), Action::Unknown);
    }

    proptest! {
        /// Property: only additions, renames, modifications and deletions
        /// map to a known action
        #[test]
        fn classify_is_unknown_outside_the_four_kinds(delta in prop::sample::select(ALL_DELTAS.to_vec())) {
            let known = matches!(
                delta,
                Delta::Added | Delta::Renamed | Delta::Modified | Delta::Deleted
            );
            prop_assert_eq!(classify(delta) == Action::Unknown, !known);
        }
    }

    #[test]
    fn test_root_commit_lists_top_level_entries_as_added() {
        let fixture = RepoFixture::new();
        let root = fixture.commit(
            &[("b.txt", "b"), ("a.txt", "a"), ("src/lib.rs", "fn x() {}")],
            1_000,
            "initial",
        );

        assert_eq!(
            changes(&fixture, root),
            vec![
                FileChange::new("a.txt", Action::Added),
                FileChange::new("b.txt", Action::Added),
                FileChange::new("src", Action::Added),
            ]
        );
    }

    #[test]
    fn test_single_modification() {
        let fixture = RepoFixture::new();
        fixture.commit(&[("a.txt", "one"), ("b.txt", "b")], 1_000, "initial");
        let second = fixture.commit(&[("a.txt", "two"), ("b.txt", "b")], 2_000, "edit a");

        assert_eq!(
            changes(&fixture, second),
            vec![FileChange::new("a.txt", Action::Modified)]
        );
    }

    #[test]
    fn test_rename_collapses_to_added_on_new_path() {
        let fixture = RepoFixture::new();
        let content = "line one\nline two\nline three\n";
        fixture.commit(&[("a.txt", content)], 1_000, "initial");
        let renamed = fixture.commit(&[("b.txt", content)], 2_000, "rename");

        assert_eq!(
            changes(&fixture, renamed),
            vec![FileChange::new("b.txt", Action::Added)]
        );
    }

    #[test]
    fn test_deletion_reports_removed_path() {
        let fixture = RepoFixture::new();
        fixture.commit(&[("a.txt", "a"), ("b.txt", "b")], 1_000, "initial");
        let second = fixture.commit(&[("a.txt", "a")], 2_000, "drop b");

        assert_eq!(
            changes(&fixture, second),
            vec![FileChange::new("b.txt", Action::Deleted)]
        );
    }

    #[test]
    fn test_nested_paths_are_reported_in_path_order() {
        let fixture = RepoFixture::new();
        fixture.commit(&[("src/a.rs", "a"), ("z.txt", "z")], 1_000, "initial");
        let second = fixture.commit(
            &[("src/a.rs", "changed"), ("src/b.rs", "new"), ("z.txt", "z")],
            2_000,
            "work",
        );

        assert_eq!(
            changes(&fixture, second),
            vec![
                FileChange::new("src/a.rs", Action::Modified),
                FileChange::new("src/b.rs", Action::Added),
            ]
        );
    }

    #[test]
    fn test_merge_commit_uses_first_parent_only() {
        let fixture = RepoFixture::new();
        let base = fixture.commit(&[("base.txt", "base")], 1_000, "base");
        let side = fixture.commit_with_parents(
            &[("base.txt", "base"), ("side.txt", "side")],
            &[base],
            2_000,
            "side work",
            None,
        );
        let main = fixture.commit(&[("base.txt", "base"), ("main.txt", "main")], 3_000, "main work");
        let merge = fixture.commit_with_parents(
            &[("base.txt", "base"), ("main.txt", "main"), ("side.txt", "side")],
            &[main, side],
            4_000,
            "merge side",
            Some("HEAD"),
        );

        assert_eq!(
            changes(&fixture, merge),
            vec![FileChange::new("side.txt", Action::Added)]
        );
    }

    #[test]
    fn test_empty_commit_has_no_changes() {
        let fixture = RepoFixture::new();
        fixture.commit(&[("a.txt", "a")], 1_000, "initial");
        let empty = fixture.commit(&[("a.txt", "a")], 2_000, "nothing");

        assert!(changes(&fixture, empty).is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let input = vec![
            FileChange::new("a", Action::Added),
            FileChange::new("b", Action::Modified),
            FileChange::new("a", Action::Added),
        ];
        assert_eq!(
            dedup(input),
            vec![
                FileChange::new("a", Action::Added),
                FileChange::new("b", Action::Modified),
            ]
        );
    }
}
