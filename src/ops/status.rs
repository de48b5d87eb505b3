use std::collections::BTreeSet;
use std::fmt;

use crate::error::Result;
use crate::graph::CommitGraph;
use crate::hash::compute_blob_hash;
use crate::repo::Repo;
use crate::staging::StagingArea;

/// kind of unstaged change to a tracked or staged file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modification {
    Modified,
    Deleted,
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modification::Modified => write!(f, "modified"),
            Modification::Deleted => write!(f, "deleted"),
        }
    }
}

/// snapshot of branches, staging area and working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub current_branch: String,
    pub branches: Vec<String>,
    pub staged: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<(String, Modification)>,
    pub untracked: Vec<String>,
}

/// compute repository status; every list is sorted by name
pub fn status(repo: &Repo) -> Result<Status> {
    let graph = CommitGraph::load(repo)?;
    let staging = StagingArea::load(repo)?;
    let head = graph.head_commit()?;
    let worktree = repo.worktree();

    let present: BTreeSet<String> = worktree.list_files()?.into_iter().collect();

    let names: BTreeSet<&str> = head
        .files
        .keys()
        .map(String::as_str)
        .chain(staging.staged())
        .collect();

    let mut modified = Vec::new();
    for name in names {
        if !present.contains(name) {
            if staging.is_staged(name) || !staging.is_removed(name) {
                modified.push((name.to_string(), Modification::Deleted));
            }
            continue;
        }

        let current = compute_blob_hash(&worktree.read(name)?);
        let changed = match staging.staged_content(name) {
            Some(staged) => compute_blob_hash(staged) != current,
            None => !staging.is_removed(name) && head.file(name) != Some(&current),
        };
        if changed {
            modified.push((name.to_string(), Modification::Modified));
        }
    }

    let untracked = present
        .iter()
        .filter(|name| !staging.is_staged(name) && (!head.contains(name) || staging.is_removed(name)))
        .cloned()
        .collect();

    Ok(Status {
        current_branch: graph.current_branch().to_string(),
        branches: graph.branches().keys().cloned().collect(),
        staged: staging.staged().map(str::to_string).collect(),
        removed: staging.removed().map(str::to_string).collect(),
        modified,
        untracked,
    })
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Branches ===")?;
        for branch in &self.branches {
            if *branch == self.current_branch {
                writeln!(f, "*{}", branch)?;
            } else {
                writeln!(f, "{}", branch)?;
            }
        }

        writeln!(f, "\n=== Staged Files ===")?;
        for name in &self.staged {
            writeln!(f, "{}", name)?;
        }

        writeln!(f, "\n=== Removed Files ===")?;
        for name in &self.removed {
            writeln!(f, "{}", name)?;
        }

        writeln!(f, "\n=== Modifications Not Staged For Commit ===")?;
        for (name, kind) in &self.modified {
            writeln!(f, "{} ({})", name, kind)?;
        }

        writeln!(f, "\n=== Untracked Files ===")?;
        for name in &self.untracked {
            writeln!(f, "{}", name)?;
        }
        Ok(())
    }
}
