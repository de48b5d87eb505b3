//! commit arena, branch pointers and head
//!
//! The whole graph is loaded at the start of a command and persisted at its
//! end. Parent links are plain ids resolved against the arena.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{list_commits, read_commit, write_commit};
use crate::refs::{
    delete_ref, list_refs, read_head, read_head_commit, read_ref, validate_branch_name,
    write_head, write_head_commit, write_ref,
};
use crate::repo::Repo;
use crate::types::{Commit, FileMap};

/// shortest accepted abbreviated commit id
pub const MIN_ABBREV_LEN: usize = 4;

/// in-memory commit graph with branch pointers
#[derive(Clone, Debug)]
pub struct CommitGraph {
    commits: BTreeMap<Hash, Commit>,
    branches: BTreeMap<String, Hash>,
    current_branch: String,
    head: Hash,
    unsaved: Vec<Hash>,
    deleted_branches: BTreeSet<String>,
}

impl CommitGraph {
    /// an empty graph whose current branch is `branch`
    ///
    /// the head is `Hash::ZERO` until the first commit is created and
    /// `move_head` is called.
    pub fn empty(branch: &str) -> Self {
        Self {
            commits: BTreeMap::new(),
            branches: BTreeMap::new(),
            current_branch: branch.to_string(),
            head: Hash::ZERO,
            unsaved: Vec::new(),
            deleted_branches: BTreeSet::new(),
        }
    }

    /// load every commit, branch and the head from the repository
    pub fn load(repo: &Repo) -> Result<Self> {
        let mut commits = BTreeMap::new();
        for id in list_commits(repo)? {
            commits.insert(id, read_commit(repo, &id)?);
        }

        let mut branches = BTreeMap::new();
        for name in list_refs(repo)? {
            let target = read_ref(repo, &name)?;
            if !commits.contains_key(&target) {
                return Err(Error::ConsistencyError(format!(
                    "branch {} points at missing commit {}",
                    name, target
                )));
            }
            branches.insert(name, target);
        }

        let current_branch = read_head(repo)?;
        let head = read_head_commit(repo)?;
        if !commits.contains_key(&head) {
            return Err(Error::ConsistencyError(format!(
                "head points at missing commit {}",
                head
            )));
        }

        debug!(
            commits = commits.len(),
            branches = branches.len(),
            branch = %current_branch,
            "loaded commit graph"
        );

        Ok(Self {
            commits,
            branches,
            current_branch,
            head,
            unsaved: Vec::new(),
            deleted_branches: BTreeSet::new(),
        })
    }

    /// persist new commits, branch pointers and head
    ///
    /// commits are written before the refs that point at them.
    pub fn save(&mut self, repo: &Repo) -> Result<()> {
        for id in &self.unsaved {
            if let Some(commit) = self.commits.get(id) {
                write_commit(repo, commit)?;
            }
        }

        for (name, target) in &self.branches {
            write_ref(repo, name, target)?;
        }

        for name in &self.deleted_branches {
            match delete_ref(repo, name) {
                Ok(()) | Err(Error::UnknownBranch(_)) => {}
                Err(e) => return Err(e),
            }
        }

        write_head(repo, &self.current_branch)?;
        write_head_commit(repo, &self.head)?;

        debug!(
            new_commits = self.unsaved.len(),
            deleted_branches = self.deleted_branches.len(),
            "saved commit graph"
        );
        self.unsaved.clear();
        self.deleted_branches.clear();
        Ok(())
    }

    /// create a new commit and add it to the arena
    ///
    /// the timestamp is strictly later than every commit already in the
    /// graph, which keeps timestamps increasing along every parent chain.
    pub fn create(&mut self, message: &str, parent: Option<Hash>, files: FileMap) -> Result<Hash> {
        if message.is_empty() {
            return Err(Error::EmptyMessage);
        }
        if let Some(parent) = parent {
            if !self.commits.contains_key(&parent) {
                return Err(Error::NoSuchCommit(parent.to_hex()));
            }
        }

        let now = chrono::Utc::now().timestamp_millis();
        let timestamp = match self.commits.values().map(|c| c.timestamp).max() {
            Some(latest) if latest >= now => latest + 1,
            _ => now,
        };

        let commit = Commit::new(message, timestamp, parent, files);
        let id = commit.id();
        if !self.commits.contains_key(&id) {
            self.commits.insert(id, commit);
            self.unsaved.push(id);
        }

        debug!(commit = %id.short(), parent = ?parent, "created commit");
        Ok(id)
    }

    /// look up a commit by full id
    pub fn lookup(&self, id: &Hash) -> Option<&Commit> {
        self.commits.get(id)
    }

    /// look up a commit, failing with `NoSuchCommit`
    pub fn get(&self, id: &Hash) -> Result<&Commit> {
        self.lookup(id)
            .ok_or_else(|| Error::NoSuchCommit(id.to_hex()))
    }

    /// resolve a full or abbreviated commit id
    pub fn resolve(&self, id: &str) -> Result<Hash> {
        let not_found = || Error::NoSuchCommit(id.to_string());

        if id.len() < MIN_ABBREV_LEN
            || id.len() > Hash::HEX_LEN
            || !id.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(not_found());
        }

        let id = id.to_ascii_lowercase();
        if id.len() == Hash::HEX_LEN {
            let hash = Hash::from_hex(&id)?;
            return self.lookup(&hash).map(|_| hash).ok_or_else(not_found);
        }

        let mut matches = self
            .commits
            .keys()
            .filter(|h| h.to_hex().starts_with(&id));
        match (matches.next(), matches.next()) {
            (Some(hash), None) => Ok(*hash),
            _ => Err(not_found()),
        }
    }

    /// every stored commit
    pub fn all(&self) -> impl Iterator<Item = (&Hash, &Commit)> {
        self.commits.iter()
    }

    /// ids of commits with exactly this message
    pub fn find(&self, message: &str) -> Vec<Hash> {
        self.commits
            .iter()
            .filter(|(_, c)| c.message == message)
            .map(|(id, _)| *id)
            .collect()
    }

    /// walk from a commit to its root, starting with the commit itself
    pub fn parent_chain(&self, id: Hash) -> ParentChain<'_> {
        ParentChain {
            graph: self,
            next: Some(id),
        }
    }

    /// all branch pointers
    pub fn branches(&self) -> &BTreeMap<String, Hash> {
        &self.branches
    }

    /// target of a branch
    pub fn get_branch(&self, name: &str) -> Option<Hash> {
        self.branches.get(name).copied()
    }

    /// point a branch at a commit, creating it if needed
    pub fn set_branch(&mut self, name: &str, id: Hash) -> Result<()> {
        validate_branch_name(name)?;
        if !self.commits.contains_key(&id) {
            return Err(Error::NoSuchCommit(id.to_hex()));
        }
        self.deleted_branches.remove(name);
        self.branches.insert(name.to_string(), id);
        Ok(())
    }

    /// create a new branch at the head commit
    pub fn create_branch(&mut self, name: &str) -> Result<()> {
        if self.branches.contains_key(name) {
            return Err(Error::BranchExists(name.to_string()));
        }
        // refs live at refs/heads/<name>, so "a" and "a/b" cannot coexist
        let clash = self
            .branches
            .keys()
            .find(|other| nests(name, other) || nests(other, name));
        if let Some(other) = clash {
            return Err(Error::InvalidBranchName(format!(
                "branch name {} clashes with existing branch {}",
                name, other
            )));
        }
        self.set_branch(name, self.head)
    }

    /// delete a branch pointer; the commits stay
    pub fn delete_branch(&mut self, name: &str) -> Result<()> {
        if !self.branches.contains_key(name) {
            return Err(Error::UnknownBranch(name.to_string()));
        }
        if name == self.current_branch {
            return Err(Error::CannotDeleteCurrentBranch(name.to_string()));
        }
        self.branches.remove(name);
        self.deleted_branches.insert(name.to_string());
        Ok(())
    }

    /// name of the current branch
    pub fn current_branch(&self) -> &str {
        &self.current_branch
    }

    /// current head commit id
    pub fn head(&self) -> Hash {
        self.head
    }

    /// current head commit
    pub fn head_commit(&self) -> Result<&Commit> {
        self.get(&self.head)
    }

    /// switch to `branch` and point it and the head at `id`
    pub fn move_head(&mut self, branch: &str, id: Hash) -> Result<()> {
        self.set_branch(branch, id)?;
        self.current_branch = branch.to_string();
        self.head = id;
        Ok(())
    }

    /// move the current branch and the head to `id`
    pub fn advance(&mut self, id: Hash) -> Result<()> {
        let branch = self.current_branch.clone();
        self.move_head(&branch, id)
    }
}

/// is `inner` a branch nested under `outer`
fn nests(inner: &str, outer: &str) -> bool {
    inner
        .strip_prefix(outer)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// lazy walk up a single parent chain
pub struct ParentChain<'a> {
    graph: &'a CommitGraph,
    next: Option<Hash>,
}

impl<'a> Iterator for ParentChain<'a> {
    type Item = (Hash, &'a Commit);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        let commit = self.graph.lookup(&id)?;
        self.next = commit.parent;
        Some((id, commit))
    }
}
