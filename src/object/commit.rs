use std::path::PathBuf;

use walkdir::WalkDir;

use crate::error::{not_found_or_io, Error, Result};
use crate::fs::write_atomic;
use crate::hash::Hash;
use crate::repo::Repo;
use crate::types::Commit;

/// write a commit record to the object store
///
/// commits are serialized as CBOR and stored under their content id.
pub fn write_commit(repo: &Repo, commit: &Commit) -> Result<Hash> {
    let hash = commit.id();

    // dedup: if commit already exists, we're done
    if commit_exists(repo, &hash) {
        return Ok(hash);
    }

    let mut cbor_bytes = Vec::new();
    ciborium::into_writer(commit, &mut cbor_bytes)?;

    write_atomic(&repo.tmp_path(), &commit_path(repo, &hash), &cbor_bytes)?;
    Ok(hash)
}

/// read a commit from the object store
pub fn read_commit(repo: &Repo, hash: &Hash) -> Result<Commit> {
    let path = commit_path(repo, hash);

    let bytes = std::fs::read(&path)
        .map_err(|e| not_found_or_io(e, &path, || Error::ObjectNotFound(*hash)))?;

    let commit: Commit = ciborium::from_reader(&bytes[..])?;

    // verify the record still matches its id
    if commit.id() != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    Ok(commit)
}

/// ids of every stored commit
pub fn list_commits(repo: &Repo) -> Result<Vec<Hash>> {
    let commits_dir = repo.commits_path();
    let mut ids = Vec::new();

    for entry in WalkDir::new(&commits_dir).min_depth(2).max_depth(2) {
        let entry = entry.map_err(|e| Error::Io {
            path: commits_dir.clone(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let file = entry.file_name().to_string_lossy();
        let dir = entry
            .path()
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        ids.push(Hash::from_hex(&format!("{}{}", dir, file))?);
    }

    ids.sort();
    Ok(ids)
}

/// get the filesystem path to a commit object
pub fn commit_path(repo: &Repo, hash: &Hash) -> PathBuf {
    let (dir, file) = hash.to_path_components();
    repo.commits_path().join(dir).join(file)
}

/// check if a commit exists in the object store
pub fn commit_exists(repo: &Repo, hash: &Hash) -> bool {
    commit_path(repo, hash).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::compute_blob_hash;
    use crate::types::FileMap;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_write_and_read_commit() {
        let (_dir, repo) = test_repo();

        let mut files = FileMap::new();
        files.insert("a.txt".to_string(), compute_blob_hash(b"a"));
        let commit = Commit::new("test commit", 1234567890, Some(Hash::ZERO), files);

        let hash = write_commit(&repo, &commit).unwrap();
        assert_eq!(hash, commit.id());
        assert!(commit_exists(&repo, &hash));

        let read = read_commit(&repo, &hash).unwrap();
        assert_eq!(commit, read);
    }

    #[test]
    fn test_commit_deduplication() {
        let (_dir, repo) = test_repo();

        let commit = Commit::new("test", 1234567890, None, FileMap::new());

        let h1 = write_commit(&repo, &commit).unwrap();
        let h2 = write_commit(&repo, &commit).unwrap();

        assert_eq!(h1, h2);
    }

    #[test]
    fn test_read_nonexistent_commit() {
        let (_dir, repo) = test_repo();

        let fake_hash =
            Hash::from_hex("2222222222222222222222222222222222222222222222222222222222222222")
                .unwrap();
        let result = read_commit(&repo, &fake_hash);

        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn test_read_commit_detects_tampering() {
        let (_dir, repo) = test_repo();

        let original = Commit::new("original", 1, None, FileMap::new());
        let hash = write_commit(&repo, &original).unwrap();

        // overwrite the record with a different commit
        let forged = Commit::new("forged", 1, None, FileMap::new());
        let mut bytes = Vec::new();
        ciborium::into_writer(&forged, &mut bytes).unwrap();
        std::fs::write(commit_path(&repo, &hash), bytes).unwrap();

        let result = read_commit(&repo, &hash);
        assert!(matches!(result, Err(Error::CorruptObject(_))));
    }

    #[test]
    fn test_list_commits() {
        let (_dir, repo) = test_repo();

        // init wrote the root commit
        assert_eq!(list_commits(&repo).unwrap().len(), 1);

        let h1 = write_commit(&repo, &Commit::new("one", 10, None, FileMap::new())).unwrap();
        let h2 = write_commit(&repo, &Commit::new("two", 20, Some(h1), FileMap::new())).unwrap();

        let ids = list_commits(&repo).unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&h1));
        assert!(ids.contains(&h2));
    }
}
