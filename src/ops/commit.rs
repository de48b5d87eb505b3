use tracing::info;

use crate::error::{Error, Result};
use crate::graph::CommitGraph;
use crate::hash::Hash;
use crate::object::write_blob;
use crate::repo::Repo;
use crate::staging::StagingArea;

/// commit the staging area on top of the head
pub fn commit(repo: &Repo, message: &str) -> Result<Hash> {
    let mut graph = CommitGraph::load(repo)?;
    let mut staging = StagingArea::load(repo)?;

    let id = commit_staged(repo, &mut graph, &mut staging, message, false)?;

    graph.save(repo)?;
    staging.save(repo)?;
    Ok(id)
}

/// build a commit from the head's files plus staged changes and advance the
/// current branch to it
///
/// `allow_empty` lets merges record a commit even when reconciliation staged
/// nothing.
pub(crate) fn commit_staged(
    repo: &Repo,
    graph: &mut CommitGraph,
    staging: &mut StagingArea,
    message: &str,
    allow_empty: bool,
) -> Result<Hash> {
    if staging.is_empty() && !allow_empty {
        return Err(Error::NothingStaged);
    }
    if message.is_empty() {
        return Err(Error::EmptyMessage);
    }

    let parent = graph.head();
    let mut files = graph.head_commit()?.files.clone();

    let (adds, removals) = staging.drain();
    for (name, content) in adds {
        let hash = write_blob(repo, &content)?;
        files.insert(name, hash);
    }
    for name in &removals {
        files.remove(name);
    }

    let id = graph.create(message, Some(parent), files)?;
    graph.advance(id)?;

    info!(
        commit = %id.short(),
        branch = graph.current_branch(),
        removed = removals.len(),
        "committed"
    );
    Ok(id)
}
