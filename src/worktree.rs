use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{not_found_or_io, Error, IoResultExt, Result};
use crate::fs::remove_if_exists;
use crate::repo::REPO_DIR_NAME;

/// plain-file view of the user's working directory
///
/// only regular files directly under the root are tracked; subdirectories and
/// the `.sprig` directory are ignored.
#[derive(Clone, Debug)]
pub struct WorkTree {
    root: PathBuf,
}

impl WorkTree {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// names of all plain files at the root, sorted
    pub fn list_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Error::Io {
                path: self.root.clone(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name != REPO_DIR_NAME {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// does a plain file with this name exist
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// is something other than a plain file (a directory, a symlink) at this name
    pub fn is_occupied(&self, name: &str) -> bool {
        match fs::symlink_metadata(self.path(name)) {
            Ok(meta) => !meta.file_type().is_file(),
            Err(_) => false,
        }
    }

    /// read a file, failing with `FileNotFound`
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        validate_file_name(name)?;
        let path = self.path(name);
        fs::read(&path).map_err(|e| not_found_or_io(e, &path, || Error::FileNotFound(name.to_string())))
    }

    /// read a file if it exists
    pub fn read_optional(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match self.read(name) {
            Ok(content) => Ok(Some(content)),
            Err(Error::FileNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// create or overwrite a file
    pub fn write(&self, name: &str, content: &[u8]) -> Result<()> {
        validate_file_name(name)?;
        let path = self.path(name);
        fs::write(&path, content).with_path(&path)
    }

    /// delete a file; returns whether it existed
    pub fn remove(&self, name: &str) -> Result<bool> {
        validate_file_name(name)?;
        remove_if_exists(&self.path(name))
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// validate a tracked file name
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidFileName("empty name".to_string()));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFileName(format!(
            "only files at the working tree root are tracked: {}",
            name
        )));
    }
    if name.contains('\0') {
        return Err(Error::InvalidFileName(format!(
            "name contains null byte: {:?}",
            name
        )));
    }
    if name == "." || name == ".." || name == REPO_DIR_NAME {
        return Err(Error::InvalidFileName(format!("reserved name: {}", name)));
    }
    Ok(())
}
