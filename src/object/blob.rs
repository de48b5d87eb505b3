use std::path::PathBuf;

use walkdir::WalkDir;

use crate::error::{not_found_or_io, Error, Result};
use crate::fs::write_atomic;
use crate::hash::{compute_blob_hash, Hash};
use crate::repo::Repo;

/// write a blob to the object store
///
/// identical content is stored once; writing it again is a no-op that returns
/// the same hash.
pub fn write_blob(repo: &Repo, content: &[u8]) -> Result<Hash> {
    let hash = compute_blob_hash(content);
    let path = blob_path(repo, &hash);

    // deduplication: if blob already exists, we're done
    if path.exists() {
        return Ok(hash);
    }

    write_atomic(&repo.tmp_path(), &path, content)?;
    Ok(hash)
}

/// get the filesystem path to a blob
pub fn blob_path(repo: &Repo, hash: &Hash) -> PathBuf {
    let (dir, file) = hash.to_path_components();
    repo.blobs_path().join(dir).join(file)
}

/// check if a blob exists in the object store
pub fn blob_exists(repo: &Repo, hash: &Hash) -> bool {
    blob_path(repo, hash).exists()
}

/// read blob content
pub fn read_blob(repo: &Repo, hash: &Hash) -> Result<Vec<u8>> {
    let path = blob_path(repo, hash);
    std::fs::read(&path).map_err(|e| not_found_or_io(e, &path, || Error::ObjectNotFound(*hash)))
}

/// number of blobs in the store
pub fn blob_count(repo: &Repo) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(repo.blobs_path()).min_depth(2).max_depth(2) {
        let entry = entry.map_err(|e| Error::Io {
            path: repo.blobs_path(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}
