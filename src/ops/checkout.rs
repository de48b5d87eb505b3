use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::CommitGraph;
use crate::hash::{compute_blob_hash, Hash};
use crate::object::read_blob;
use crate::repo::Repo;
use crate::staging::StagingArea;
use crate::types::Commit;
use crate::worktree::{validate_file_name, WorkTree};

/// restore one file from a commit (the head when `commit` is `None`)
///
/// the staging area is left untouched.
pub fn checkout_file(repo: &Repo, commit: Option<&str>, name: &str) -> Result<()> {
    validate_file_name(name)?;

    let graph = CommitGraph::load(repo)?;
    let id = match commit {
        Some(prefix) => graph.resolve(prefix)?,
        None => graph.head(),
    };

    let blob = graph
        .get(&id)?
        .file(name)
        .ok_or_else(|| Error::FileNotInCommit(name.to_string()))?;
    let content = read_blob(repo, blob)?;
    repo.worktree().write(name, &content)?;

    debug!(file = name, commit = %id.short(), "checked out file");
    Ok(())
}

/// switch the working tree and head to another branch
pub fn checkout_branch(repo: &Repo, name: &str) -> Result<()> {
    let mut graph = CommitGraph::load(repo)?;
    let mut staging = StagingArea::load(repo)?;

    let target_id = graph
        .get_branch(name)
        .ok_or_else(|| Error::UnknownBranch(name.to_string()))?;
    if graph.current_branch() == name {
        return Err(Error::AlreadyOnBranch(name.to_string()));
    }

    let current = graph.head_commit()?.clone();
    let target = graph.get(&target_id)?.clone();
    let worktree = repo.worktree();

    if let Some(file) = untracked_in_the_way(&worktree, &current, &target)? {
        return Err(Error::WorkingTreeConflict(file));
    }

    switch_tree(repo, &worktree, &current, &target)?;
    staging.clear();
    graph.move_head(name, target_id)?;

    graph.save(repo)?;
    staging.save(repo)?;

    info!(branch = name, commit = %target_id.short(), "switched branch");
    Ok(())
}

/// check out a commit and move the current branch to it
pub fn reset(repo: &Repo, commit: &str) -> Result<Hash> {
    let mut graph = CommitGraph::load(repo)?;
    let mut staging = StagingArea::load(repo)?;

    let target_id = graph.resolve(commit)?;
    let current = graph.head_commit()?.clone();
    let target = graph.get(&target_id)?.clone();
    let worktree = repo.worktree();

    if let Some(file) = untracked_in_the_way(&worktree, &current, &target)? {
        return Err(Error::WorkingTreeConflict(file));
    }

    switch_tree(repo, &worktree, &current, &target)?;
    staging.clear();
    graph.advance(target_id)?;

    graph.save(repo)?;
    staging.save(repo)?;

    info!(branch = graph.current_branch(), commit = %target_id.short(), "reset");
    Ok(target_id)
}

/// first name `target` tracks that cannot be written safely: a directory or
/// other non-file sits there, or an untracked file with different content
pub(crate) fn untracked_in_the_way(
    worktree: &WorkTree,
    current: &Commit,
    target: &Commit,
) -> Result<Option<String>> {
    for (name, wanted) in &target.files {
        if worktree.is_occupied(name) {
            return Ok(Some(name.clone()));
        }
        if current.contains(name) || !worktree.exists(name) {
            continue;
        }
        if compute_blob_hash(&worktree.read(name)?) != *wanted {
            return Ok(Some(name.clone()));
        }
    }
    Ok(None)
}

/// make the working tree match `target`, deleting files only `current` tracks
///
/// keeps going past per-file failures and returns the first one.
pub(crate) fn switch_tree(
    repo: &Repo,
    worktree: &WorkTree,
    current: &Commit,
    target: &Commit,
) -> Result<()> {
    let mut first_error = None;

    for (name, blob) in &target.files {
        let result = read_blob(repo, blob).and_then(|content| worktree.write(name, &content));
        if let Err(e) = result {
            warn!(file = %name, error = %e, "failed to write file");
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }

    for name in current.files.keys().filter(|name| !target.contains(name)) {
        if let Err(e) = worktree.remove(name) {
            warn!(file = %name, error = %e, "failed to delete file");
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{add, branch, commit};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn commit_file(dir: &Path, repo: &Repo, name: &str, content: &str, msg: &str) -> Hash {
        fs::write(dir.join(name), content).unwrap();
        add(repo, name).unwrap();
        commit(repo, msg).unwrap()
    }

    #[test]
    fn test_checkout_file_from_head_restores_bytes() {
        let (dir, repo) = test_repo();
        commit_file(dir.path(), &repo, "a.txt", "original", "first");

        fs::write(dir.path().join("a.txt"), b"scribbled").unwrap();
        checkout_file(&repo, None, "a.txt").unwrap();

        assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"original");
    }

    #[test]
    fn test_checkout_file_from_older_commit_by_prefix() {
        let (dir, repo) = test_repo();
        let first = commit_file(dir.path(), &repo, "a.txt", "v1", "one");
        commit_file(dir.path(), &repo, "a.txt", "v2", "two");

        let prefix = &first.to_hex()[..8];
        checkout_file(&repo, Some(prefix), "a.txt").unwrap();
        assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"v1");

        // head is unchanged and the file is not staged
        let graph = CommitGraph::load(&repo).unwrap();
        assert_ne!(graph.head(), first);
        assert!(StagingArea::load(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_checkout_file_errors() {
        let (dir, repo) = test_repo();
        commit_file(dir.path(), &repo, "a.txt", "x", "first");

        assert!(matches!(
            checkout_file(&repo, None, "b.txt"),
            Err(Error::FileNotInCommit(_))
        ));
        assert!(matches!(
            checkout_file(&repo, Some("ffffffff"), "a.txt"),
            Err(Error::NoSuchCommit(_))
        ));
    }

    #[test]
    fn test_checkout_branch_swaps_files() {
        let (dir, repo) = test_repo();
        commit_file(dir.path(), &repo, "shared.txt", "base", "base");
        branch(&repo, "side").unwrap();
        commit_file(dir.path(), &repo, "master_only.txt", "m", "master work");

        checkout_branch(&repo, "side").unwrap();
        assert!(!dir.path().join("master_only.txt").exists());
        assert_eq!(fs::read(dir.path().join("shared.txt")).unwrap(), b"base");

        let graph = CommitGraph::load(&repo).unwrap();
        assert_eq!(graph.current_branch(), "side");
        assert_eq!(Some(graph.head()), graph.get_branch("side"));

        checkout_branch(&repo, "master").unwrap();
        assert_eq!(fs::read(dir.path().join("master_only.txt")).unwrap(), b"m");
    }

    #[test]
    fn test_checkout_branch_clears_staging() {
        let (dir, repo) = test_repo();
        branch(&repo, "side").unwrap();
        fs::write(dir.path().join("wip.txt"), b"wip").unwrap();
        add(&repo, "wip.txt").unwrap();

        checkout_branch(&repo, "side").unwrap();
        assert!(StagingArea::load(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_checkout_branch_preconditions() {
        let (_dir, repo) = test_repo();
        assert!(matches!(
            checkout_branch(&repo, "nope"),
            Err(Error::UnknownBranch(_))
        ));
        assert!(matches!(
            checkout_branch(&repo, "master"),
            Err(Error::AlreadyOnBranch(_))
        ));
    }

    #[test]
    fn test_checkout_branch_refuses_to_clobber_untracked() {
        let (dir, repo) = test_repo();
        branch(&repo, "side").unwrap();
        checkout_branch(&repo, "side").unwrap();
        commit_file(dir.path(), &repo, "a.txt", "side version", "side");
        checkout_branch(&repo, "master").unwrap();

        fs::write(dir.path().join("a.txt"), b"precious").unwrap();
        assert!(matches!(
            checkout_branch(&repo, "side"),
            Err(Error::WorkingTreeConflict(name)) if name == "a.txt"
        ));
        assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"precious");
        assert_eq!(CommitGraph::load(&repo).unwrap().current_branch(), "master");
    }

    #[test]
    fn test_reset_moves_branch_and_tree() {
        let (dir, repo) = test_repo();
        let first = commit_file(dir.path(), &repo, "a.txt", "v1", "one");
        commit_file(dir.path(), &repo, "b.txt", "b", "two");

        assert_eq!(reset(&repo, &first.to_hex()).unwrap(), first);

        assert!(!dir.path().join("b.txt").exists());
        assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"v1");

        let graph = CommitGraph::load(&repo).unwrap();
        assert_eq!(graph.head(), first);
        assert_eq!(graph.get_branch("master"), Some(first));
        assert_eq!(graph.current_branch(), "master");
    }

    #[test]
    fn test_reset_unknown_commit() {
        let (_dir, repo) = test_repo();
        assert!(matches!(
            reset(&repo, "0123456789"),
            Err(Error::NoSuchCommit(_))
        ));
    }

    #[test]
    fn test_directory_at_target_path_is_in_the_way() {
        let (dir, repo) = test_repo();
        commit_file(dir.path(), &repo, "a.txt", "base", "base");
        branch(&repo, "side").unwrap();
        checkout_branch(&repo, "side").unwrap();
        commit_file(dir.path(), &repo, "z.txt", "z", "side");
        checkout_branch(&repo, "master").unwrap();

        fs::create_dir(dir.path().join("z.txt")).unwrap();
        assert!(matches!(
            checkout_branch(&repo, "side"),
            Err(Error::WorkingTreeConflict(name)) if name == "z.txt"
        ));
        assert!(dir.path().join("z.txt").is_dir());
        assert_eq!(CommitGraph::load(&repo).unwrap().current_branch(), "master");
    }

    #[test]
    fn test_untracked_same_content_is_not_in_the_way() {
        let (dir, repo) = test_repo();
        branch(&repo, "side").unwrap();
        checkout_branch(&repo, "side").unwrap();
        commit_file(dir.path(), &repo, "a.txt", "same", "side");
        checkout_branch(&repo, "master").unwrap();

        fs::write(dir.path().join("a.txt"), b"same").unwrap();
        checkout_branch(&repo, "side").unwrap();
        assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"same");
    }
}
