use tracing::debug;

use crate::error::Result;
use crate::graph::CommitGraph;
use crate::hash::compute_blob_hash;
use crate::repo::Repo;
use crate::staging::StagingArea;
use crate::worktree::validate_file_name;

/// what `add` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// new content staged for the next commit
    Staged,
    /// content matches the head commit, nothing staged
    Unchanged,
    /// a pending removal was cancelled instead of staging
    RemovalCancelled,
}

/// stage a working tree file for the next commit
pub fn add(repo: &Repo, name: &str) -> Result<AddOutcome> {
    validate_file_name(name)?;

    let graph = CommitGraph::load(repo)?;
    let mut staging = StagingArea::load(repo)?;

    if staging.cancel_removal(name) {
        staging.save(repo)?;
        debug!(file = name, "cancelled pending removal");
        return Ok(AddOutcome::RemovalCancelled);
    }

    let content = repo.worktree().read(name)?;
    let head = graph.head_commit()?;

    let outcome = if head.file(name) == Some(&compute_blob_hash(&content)) {
        // identical to the committed version: drop any stale staged copy
        staging.unstage(name);
        AddOutcome::Unchanged
    } else {
        staging.stage_add(name, content);
        AddOutcome::Staged
    };

    staging.save(repo)?;
    debug!(file = name, ?outcome, "add");
    Ok(outcome)
}
