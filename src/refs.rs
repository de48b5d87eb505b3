use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{not_found_or_io, Error, IoResultExt, Result};
use crate::fs::{remove_if_exists, write_atomic};
use crate::hash::Hash;
use crate::repo::Repo;

/// write a branch ref (create or update)
///
/// branch names can contain slashes for hierarchical names like "feature/x"
pub fn write_ref(repo: &Repo, branch: &str, hash: &Hash) -> Result<()> {
    validate_branch_name(branch)?;
    let path = ref_path(repo, branch);
    write_atomic(&repo.tmp_path(), &path, format!("{}\n", hash.to_hex()).as_bytes())
}

/// read a branch ref
pub fn read_ref(repo: &Repo, branch: &str) -> Result<Hash> {
    let path = ref_path(repo, branch);

    let content = fs::read_to_string(&path)
        .map_err(|e| not_found_or_io(e, &path, || Error::UnknownBranch(branch.to_string())))?;

    Hash::from_hex(content.trim())
}

/// delete a branch ref
pub fn delete_ref(repo: &Repo, branch: &str) -> Result<()> {
    let path = ref_path(repo, branch);

    if !remove_if_exists(&path)? {
        return Err(Error::UnknownBranch(branch.to_string()));
    }

    // drop now-empty parent directories of hierarchical refs
    let refs_dir = repo.refs_path();
    let mut dir = path.parent().map(Path::to_path_buf);
    while let Some(d) = dir {
        if d == refs_dir || fs::remove_dir(&d).is_err() {
            break;
        }
        dir = d.parent().map(Path::to_path_buf);
    }

    Ok(())
}

/// check if a branch ref exists
pub fn ref_exists(repo: &Repo, branch: &str) -> bool {
    ref_path(repo, branch).is_file()
}

/// list all branch refs, sorted
pub fn list_refs(repo: &Repo) -> Result<Vec<String>> {
    let refs_dir = repo.refs_path();
    let mut refs = Vec::new();

    if refs_dir.exists() {
        collect_refs(&refs_dir, &refs_dir, &mut refs)?;
    }

    refs.sort();
    Ok(refs)
}

/// read the current branch name
pub fn read_head(repo: &Repo) -> Result<String> {
    let path = repo.head_path();
    let content = fs::read_to_string(&path).with_path(&path)?;
    Ok(content.trim().to_string())
}

/// record the current branch name
pub fn write_head(repo: &Repo, branch: &str) -> Result<()> {
    write_atomic(&repo.tmp_path(), &repo.head_path(), format!("{}\n", branch).as_bytes())
}

/// read the current head commit id
pub fn read_head_commit(repo: &Repo) -> Result<Hash> {
    let path = repo.head_commit_path();
    let content = fs::read_to_string(&path).with_path(&path)?;
    Hash::from_hex(content.trim())
}

/// record the current head commit id
pub fn write_head_commit(repo: &Repo, hash: &Hash) -> Result<()> {
    write_atomic(
        &repo.tmp_path(),
        &repo.head_commit_path(),
        format!("{}\n", hash.to_hex()).as_bytes(),
    )
}

/// get filesystem path for a branch ref
fn ref_path(repo: &Repo, branch: &str) -> PathBuf {
    repo.refs_path().join(branch)
}

/// recursively collect refs from directory
fn collect_refs(base: &Path, dir: &Path, refs: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let path = entry.path();

        if path.is_dir() {
            collect_refs(base, &path, refs)?;
        } else if path.is_file() {
            // compute ref name relative to base
            if let Ok(rel) = path.strip_prefix(base) {
                refs.push(rel.to_string_lossy().to_string());
            }
        }
    }
    Ok(())
}

/// validate a branch name
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidBranchName("empty branch name".to_string()));
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot start or end with '/': {}",
            name
        )));
    }

    if name.contains("//") {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot contain '//': {}",
            name
        )));
    }

    if name.contains('\0') || name.contains(char::is_whitespace) {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot contain whitespace or null bytes: {:?}",
            name
        )));
    }

    // check for path traversal
    for component in name.split('/') {
        if component == "." || component == ".." {
            return Err(Error::InvalidBranchName(format!(
                "branch name cannot contain '.' or '..': {}",
                name
            )));
        }
    }

    Ok(())
}
