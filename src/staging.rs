//! pending adds and removal markers between commits

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{IoResultExt, Result};
use crate::fs::{remove_if_exists, write_atomic};
use crate::repo::Repo;

/// staged file contents and removal markers
///
/// a name is never staged for add and marked for removal at the same time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StagingArea {
    adds: BTreeMap<String, Vec<u8>>,
    removals: BTreeMap<String, Vec<u8>>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// load both collections from `.sprig/staging` and `.sprig/removed`
    pub fn load(repo: &Repo) -> Result<Self> {
        let staging = Self {
            adds: read_collection(&repo.staging_path())?,
            removals: read_collection(&repo.removed_path())?,
        };
        debug!(
            staged = staging.adds.len(),
            removed = staging.removals.len(),
            "loaded staging area"
        );
        Ok(staging)
    }

    /// persist both collections, dropping files for entries that are gone
    pub fn save(&self, repo: &Repo) -> Result<()> {
        let tmp = repo.tmp_path();
        write_collection(&tmp, &repo.staging_path(), &self.adds)?;
        write_collection(&tmp, &repo.removed_path(), &self.removals)?;
        Ok(())
    }

    /// stage content for `name`, cancelling any removal marker
    pub fn stage_add(&mut self, name: &str, content: Vec<u8>) {
        self.removals.remove(name);
        self.adds.insert(name.to_string(), content);
    }

    /// drop a staged add; returns whether one existed
    pub fn unstage(&mut self, name: &str) -> bool {
        self.adds.remove(name).is_some()
    }

    /// mark `name` for removal at the next commit
    ///
    /// `tombstone` is a snapshot of the removed bytes (possibly empty).
    pub fn mark_removed(&mut self, name: &str, tombstone: Vec<u8>) {
        self.adds.remove(name);
        self.removals.insert(name.to_string(), tombstone);
    }

    /// drop a removal marker; returns whether one existed
    pub fn cancel_removal(&mut self, name: &str) -> bool {
        self.removals.remove(name).is_some()
    }

    /// true iff nothing is staged and nothing is marked for removal
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removals.is_empty()
    }

    pub fn is_staged(&self, name: &str) -> bool {
        self.adds.contains_key(name)
    }

    pub fn is_removed(&self, name: &str) -> bool {
        self.removals.contains_key(name)
    }

    /// staged content for `name`
    pub fn staged_content(&self, name: &str) -> Option<&[u8]> {
        self.adds.get(name).map(Vec::as_slice)
    }

    /// names staged for add, sorted
    pub fn staged(&self) -> impl Iterator<Item = &str> {
        self.adds.keys().map(String::as_str)
    }

    /// names marked for removal, sorted
    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.removals.keys().map(String::as_str)
    }

    /// take every pending add and removal, leaving the area empty
    pub fn drain(&mut self) -> (BTreeMap<String, Vec<u8>>, BTreeSet<String>) {
        let adds = std::mem::take(&mut self.adds);
        let removals = std::mem::take(&mut self.removals).into_keys().collect();
        (adds, removals)
    }

    /// discard everything
    pub fn clear(&mut self) {
        self.adds.clear();
        self.removals.clear();
    }
}

/// read every plain file in `dir` as name -> bytes
fn read_collection(dir: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut entries = BTreeMap::new();
    if !dir.exists() {
        return Ok(entries);
    }

    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let content = fs::read(&path).with_path(&path)?;
        entries.insert(name, content);
    }
    Ok(entries)
}

/// make `dir` hold exactly the given entries
fn write_collection(tmp: &Path, dir: &Path, entries: &BTreeMap<String, Vec<u8>>) -> Result<()> {
    fs::create_dir_all(dir).with_path(dir)?;

    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !entries.contains_key(&name) {
            remove_if_exists(&entry.path())?;
        }
    }

    for (name, content) in entries {
        let path = dir.join(name);
        // skip rewriting unchanged entries
        if fs::read(&path).ok().as_deref() == Some(content.as_slice()) {
            continue;
        }
        write_atomic(tmp, &path, content)?;
    }
    Ok(())
}
