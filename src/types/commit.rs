use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hash::{Hash, ObjectHasher};

/// filename -> blob hash, ordered by name
pub type FileMap = BTreeMap<String, Hash>;

/// an immutable snapshot of the tracked files
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// commit message
    pub message: String,
    /// milliseconds since the unix epoch
    pub timestamp: i64,
    /// previous commit on this chain, none for a root commit
    pub parent: Option<Hash>,
    /// tracked files
    pub files: FileMap,
}

impl Commit {
    /// create a commit with an explicit timestamp
    pub fn new(
        message: impl Into<String>,
        timestamp: i64,
        parent: Option<Hash>,
        files: FileMap,
    ) -> Self {
        Self {
            message: message.into(),
            timestamp,
            parent,
            files,
        }
    }

    /// content id of this commit
    ///
    /// covers message, timestamp and file map. The parent is deliberately not
    /// part of the id.
    pub fn id(&self) -> Hash {
        let mut hasher = ObjectHasher::new();
        hasher.update(format!("message {}\n", self.message.len()));
        hasher.update(&self.message);
        hasher.update(format!("\ntimestamp {}\n", self.timestamp));
        for (name, hash) in &self.files {
            hasher.update(format!("file {} {}\n", hash, name));
        }
        hasher.finalize()
    }

    /// is this an initial commit (no parent)
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// does this commit track the given file
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// blob hash of a tracked file
    pub fn file(&self, name: &str) -> Option<&Hash> {
        self.files.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::compute_blob_hash;

    fn files(entries: &[(&str, &[u8])]) -> FileMap {
        entries
            .iter()
            .map(|(name, content)| (name.to_string(), compute_blob_hash(content)))
            .collect()
    }

    #[test]
    fn test_commit_new() {
        let c = Commit::new("message", 42, None, FileMap::new());
        assert_eq!(c.message, "message");
        assert_eq!(c.timestamp, 42);
        assert!(c.is_root());
        assert!(!c.contains("a.txt"));
    }

    #[test]
    fn test_commit_id_ignores_parent() {
        let f = files(&[("a.txt", b"x")]);
        let c1 = Commit::new("same", 1000, None, f.clone());
        let c2 = Commit::new("same", 1000, Some(Hash::ZERO), f);
        assert_eq!(c1.id(), c2.id());
    }

    #[test]
    fn test_commit_id_covers_content() {
        let base = Commit::new("m", 1000, None, files(&[("a.txt", b"x")]));

        let other_message = Commit::new("n", 1000, None, base.files.clone());
        let other_time = Commit::new("m", 1001, None, base.files.clone());
        let other_files = Commit::new("m", 1000, None, files(&[("a.txt", b"y")]));
        let other_name = Commit::new("m", 1000, None, files(&[("b.txt", b"x")]));

        assert_ne!(base.id(), other_message.id());
        assert_ne!(base.id(), other_time.id());
        assert_ne!(base.id(), other_files.id());
        assert_ne!(base.id(), other_name.id());
    }

    #[test]
    fn test_commit_id_message_is_length_prefixed() {
        // a message cannot impersonate the timestamp line
        let c1 = Commit::new("a\ntimestamp 5", 6, None, FileMap::new());
        let c2 = Commit::new("a", 5, None, FileMap::new());
        assert_ne!(c1.id(), c2.id());
    }

    #[test]
    fn test_commit_cbor_roundtrip() {
        let c = Commit::new("message", 1234567890, Some(Hash::ZERO), files(&[("f", b"1")]));

        let mut bytes = Vec::new();
        ciborium::into_writer(&c, &mut bytes).unwrap();

        let parsed: Commit = ciborium::from_reader(&bytes[..]).unwrap();
        assert_eq!(c, parsed);
        assert_eq!(c.id(), parsed.id());
    }
}
