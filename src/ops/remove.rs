use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::CommitGraph;
use crate::object::read_blob;
use crate::repo::Repo;
use crate::staging::StagingArea;
use crate::worktree::validate_file_name;

/// what `rm` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// the file was only staged; it is unstaged and left in place
    Unstaged,
    /// the file is marked for removal and deleted from the working tree
    Removed,
}

/// unstage a file, or mark a tracked file for removal and delete it
pub fn remove(repo: &Repo, name: &str) -> Result<RemoveOutcome> {
    validate_file_name(name)?;

    let graph = CommitGraph::load(repo)?;
    let mut staging = StagingArea::load(repo)?;

    if staging.unstage(name) {
        staging.save(repo)?;
        debug!(file = name, "unstaged");
        return Ok(RemoveOutcome::Unstaged);
    }

    let head = graph.head_commit()?;
    let blob = head
        .file(name)
        .ok_or_else(|| Error::NothingToRemove(name.to_string()))?;

    let worktree = repo.worktree();
    let tombstone = if repo.config().tombstones {
        match worktree.read_optional(name)? {
            Some(content) => content,
            None => read_blob(repo, blob)?,
        }
    } else {
        Vec::new()
    };

    staging.mark_removed(name, tombstone);
    worktree.remove(name)?;
    staging.save(repo)?;

    debug!(file = name, "marked for removal");
    Ok(RemoveOutcome::Removed)
}
