use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{IoResultExt, Result};

/// write a file atomically: temp file in `tmp_dir` -> fsync -> rename -> fsync parent
///
/// `tmp_dir` must live on the same filesystem as `path`.
pub fn write_atomic(tmp_dir: &Path, path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }

    let tmp_path = tmp_dir.join(uuid::Uuid::new_v4().to_string());
    {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        tmp_file.write_all(content).with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_path(path);
    }

    if let Some(parent) = path.parent() {
        fsync_dir(parent)?;
    }

    Ok(())
}

/// remove a file, treating "already gone" as success
///
/// returns whether a file was actually removed
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_path(path),
    }
}

/// fsync a directory
pub fn fsync_dir(path: &Path) -> Result<()> {
    let dir = File::open(path).with_path(path)?;
    dir.sync_all().with_path(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join("tmp");
        fs::create_dir(&tmp).unwrap();

        let target = dir.path().join("a/b/file");
        write_atomic(&tmp, &target, b"content").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"content");
        // temp file was renamed away
        assert_eq!(fs::read_dir(&tmp).unwrap().count(), 0);
    }

    #[test]
    fn test_write_atomic_overwrites() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("file");

        write_atomic(dir.path(), &target, b"one").unwrap();
        write_atomic(dir.path(), &target, b"two").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"two");
    }

    #[test]
    fn test_remove_if_exists() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("file");
        fs::write(&target, b"x").unwrap();

        assert!(remove_if_exists(&target).unwrap());
        assert!(!remove_if_exists(&target).unwrap());
    }
}
