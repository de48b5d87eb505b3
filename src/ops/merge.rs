use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::CommitGraph;
use crate::hash::Hash;
use crate::merge::{conflict_bytes, find_split_point, reconcile, FileAction};
use crate::object::read_blob;
use crate::ops::checkout::{switch_tree, untracked_in_the_way};
use crate::ops::commit::commit_staged;
use crate::repo::Repo;
use crate::staging::StagingArea;
use crate::types::Commit;

/// result of a merge that passed its preconditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// current branch moved to the given commit, no commit created
    FastForwarded(Hash),
    /// a merge commit was recorded
    Merged(Hash),
    /// conflict markers were written to these files; nothing was committed
    Conflicted(Vec<String>),
}

/// working tree change for one file, loaded up front
enum Step {
    Take(Vec<u8>),
    Remove(Vec<u8>),
    Conflict(Vec<u8>),
}

/// merge another branch into the current one
pub fn merge(repo: &Repo, given_branch: &str) -> Result<MergeOutcome> {
    let mut graph = CommitGraph::load(repo)?;
    let mut staging = StagingArea::load(repo)?;

    if !staging.is_empty() {
        return Err(Error::UncommittedChanges);
    }
    let given_id = graph
        .get_branch(given_branch)
        .ok_or_else(|| Error::UnknownBranch(given_branch.to_string()))?;

    let current_id = graph.head();
    let current = graph.head_commit()?.clone();
    let given = graph.get(&given_id)?.clone();
    let worktree = repo.worktree();

    if let Some(file) = untracked_in_the_way(&worktree, &current, &given)? {
        return Err(Error::WorkingTreeConflict(file));
    }
    if current_id == given_id {
        return Err(Error::SelfMerge);
    }

    let split_id = find_split_point(&graph, current_id, given_id)?;
    debug!(split = %split_id.short(), "found split point");

    if split_id == given_id {
        return Err(Error::AlreadyAncestor);
    }
    if split_id == current_id {
        switch_tree(repo, &worktree, &current, &given)?;
        graph.advance(given_id)?;
        graph.save(repo)?;

        info!(branch = given_branch, commit = %given_id.short(), "fast-forwarded");
        return Ok(MergeOutcome::FastForwarded(given_id));
    }

    let split = graph.get(&split_id)?.clone();

    // read every blob and tombstone before the working tree is touched
    let mut steps = Vec::new();
    for (name, action) in reconcile(&split, &current, &given) {
        let step = match action {
            FileAction::TakeGiven(blob) => Step::Take(read_blob(repo, &blob)?),
            FileAction::Remove => Step::Remove(tombstone(repo, &current, &name)?),
            FileAction::Conflict {
                current: ours,
                given: theirs,
            } => {
                let ours = ours.map(|h| read_blob(repo, &h)).transpose()?;
                let theirs = theirs.map(|h| read_blob(repo, &h)).transpose()?;
                Step::Conflict(conflict_bytes(ours.as_deref(), theirs.as_deref()))
            }
        };
        steps.push((name, step));
    }

    let mut conflicts = Vec::new();
    let mut first_error = None;

    for (name, step) in steps {
        let result = match step {
            Step::Take(content) => worktree
                .write(&name, &content)
                .map(|()| staging.stage_add(&name, content)),
            Step::Remove(tombstone) => {
                staging.mark_removed(&name, tombstone);
                worktree.remove(&name).map(|_| ())
            }
            Step::Conflict(bytes) => {
                let result = worktree.write(&name, &bytes);
                conflicts.push(name.clone());
                result
            }
        };
        if let Err(e) = result {
            warn!(file = %name, error = %e, "failed to apply merge result");
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }

    if let Some(e) = first_error {
        staging.save(repo)?;
        return Err(e);
    }

    if !conflicts.is_empty() {
        staging.save(repo)?;
        info!(files = conflicts.len(), "merge stopped on conflicts");
        return Ok(MergeOutcome::Conflicted(conflicts));
    }

    let message = format!("Merged {} with {}.", graph.current_branch(), given_branch);
    let id = commit_staged(repo, &mut graph, &mut staging, &message, true)?;

    graph.save(repo)?;
    staging.save(repo)?;
    Ok(MergeOutcome::Merged(id))
}

/// removal marker contents for a file the merge deletes
fn tombstone(repo: &Repo, current: &Commit, name: &str) -> Result<Vec<u8>> {
    if !repo.config().tombstones {
        return Ok(Vec::new());
    }
    match repo.worktree().read_optional(name)? {
        Some(content) => Ok(content),
        None => match current.file(name) {
            Some(blob) => read_blob(repo, blob),
            None => Ok(Vec::new()),
        },
    }
}
