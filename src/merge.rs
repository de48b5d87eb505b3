//! split-point search and three-way file reconciliation
//!
//! Every commit has at most one parent, so each commit's ancestry is a
//! simple path to its root. Timestamps strictly increase along a path, so
//! stepping the later of two commits toward its parent is a depth
//! comparison: the walk meets at the nearest common ancestor without
//! materializing ancestor sets.
//!
//! Reconciliation compares blob hashes only; there is no line-level merge.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::graph::CommitGraph;
use crate::hash::Hash;
use crate::types::Commit;

const CONFLICT_HEAD: &[u8] = b"<<<<<<< HEAD\n";
const CONFLICT_SEPARATOR: &[u8] = b"\n=======\n";
const CONFLICT_TAIL: &[u8] = b">>>>>>>";

/// nearest common ancestor of two commits
///
/// if either walk reaches a root commit first, that root is returned.
/// distinct commits with equal timestamps cannot be ordered and fail with
/// `ConsistencyError`, as does a walk through a missing or cyclic parent.
pub fn find_split_point(graph: &CommitGraph, a: Hash, b: Hash) -> Result<Hash> {
    let (mut a, mut b) = (a, b);
    let mut budget = graph.all().count().saturating_mul(2) + 2;

    loop {
        if a == b {
            return Ok(a);
        }

        let ca = walk_lookup(graph, &a)?;
        let cb = walk_lookup(graph, &b)?;
        if ca.is_root() {
            return Ok(a);
        }
        if cb.is_root() {
            return Ok(b);
        }

        budget = budget
            .checked_sub(1)
            .ok_or_else(|| Error::ConsistencyError("parent chain does not terminate".into()))?;

        match ca.timestamp.cmp(&cb.timestamp) {
            Ordering::Less => b = parent_of(cb, &b)?,
            Ordering::Greater => a = parent_of(ca, &a)?,
            Ordering::Equal => {
                return Err(Error::ConsistencyError(format!(
                    "commits {} and {} share timestamp {}",
                    a.short(),
                    b.short(),
                    ca.timestamp
                )));
            }
        }
    }
}

fn walk_lookup<'a>(graph: &'a CommitGraph, id: &Hash) -> Result<&'a Commit> {
    graph
        .lookup(id)
        .ok_or_else(|| Error::ConsistencyError(format!("missing commit {}", id)))
}

fn parent_of(commit: &Commit, id: &Hash) -> Result<Hash> {
    commit
        .parent
        .ok_or_else(|| Error::ConsistencyError(format!("commit {} has no parent", id)))
}

/// what a merge does to one file of the working tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileAction {
    /// write the given branch's version and stage it
    TakeGiven(Hash),
    /// delete the file and mark it for removal
    Remove,
    /// write conflict markers around both versions (absent = empty)
    Conflict {
        current: Option<Hash>,
        given: Option<Hash>,
    },
}

/// decide the action for one file from its split/current/given versions
///
/// `None` keeps the current version untouched.
pub fn decide(split: Option<&Hash>, current: Option<&Hash>, given: Option<&Hash>) -> Option<FileAction> {
    let conflict = || FileAction::Conflict {
        current: current.copied(),
        given: given.copied(),
    };

    match (split, current, given) {
        (Some(s), Some(c), Some(g)) => {
            if c == s && g != s {
                Some(FileAction::TakeGiven(*g))
            } else if c != s && g != s && c != g {
                Some(conflict())
            } else {
                None
            }
        }
        // given deleted it
        (Some(s), Some(c), None) => {
            if c == s {
                Some(FileAction::Remove)
            } else {
                Some(conflict())
            }
        }
        // current deleted it
        (Some(s), None, Some(g)) if g != s => Some(conflict()),
        // both added it
        (None, Some(c), Some(g)) if c != g => Some(conflict()),
        // only given added it
        (None, None, Some(g)) => Some(FileAction::TakeGiven(*g)),
        _ => None,
    }
}

/// actions for every file in split, current or given, sorted by name
pub fn reconcile(split: &Commit, current: &Commit, given: &Commit) -> Vec<(String, FileAction)> {
    let names: BTreeSet<&String> = split
        .files
        .keys()
        .chain(current.files.keys())
        .chain(given.files.keys())
        .collect();

    names
        .into_iter()
        .filter_map(|name| {
            decide(split.file(name), current.file(name), given.file(name))
                .map(|action| (name.clone(), action))
        })
        .collect()
}

/// render conflict markers around two versions of a file
pub fn conflict_bytes(current: Option<&[u8]>, given: Option<&[u8]>) -> Vec<u8> {
    let current = current.unwrap_or_default();
    let given = given.unwrap_or_default();

    let mut out = Vec::with_capacity(
        CONFLICT_HEAD.len()
            + current.len()
            + CONFLICT_SEPARATOR.len()
            + given.len()
            + CONFLICT_TAIL.len(),
    );
    out.extend_from_slice(CONFLICT_HEAD);
    out.extend_from_slice(current);
    out.extend_from_slice(CONFLICT_SEPARATOR);
    out.extend_from_slice(given);
    out.extend_from_slice(CONFLICT_TAIL);
    out
}
