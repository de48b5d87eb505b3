//! sprig - minimal single-user version control
//!
//! tracks the flat set of regular files in a working directory as a history
//! of snapshots, with named branches and a three-way merge.
//!
//! # Core concepts
//!
//! - **Blob**: content-addressed file bytes, stored once per distinct content
//! - **Commit**: a snapshot (file name -> blob hash) with message, timestamp
//!   and at most one parent (CBOR)
//! - **Branch**: a named pointer to a commit; the head follows one branch
//! - **Staging area**: pending adds and removal markers for the next commit
//!
//! # Hash format
//!
//! blob hash = SHA256(content)
//!
//! commit id = SHA256 over the message, millisecond timestamp and the sorted
//! `(blob hash, name)` pairs. The parent is not part of the id.
//!
//! # Example usage
//!
//! ```no_run
//! use sprig::{ops, Repo};
//! use std::path::Path;
//!
//! // initialize a repository in a working directory
//! let repo = Repo::init(Path::new("/path/to/project")).unwrap();
//!
//! // stage and commit a file
//! ops::add(&repo, "notes.txt").unwrap();
//! let id = ops::commit(&repo, "add notes").unwrap();
//!
//! // branch, switch and merge back
//! ops::branch(&repo, "feature").unwrap();
//! ops::checkout_branch(&repo, "feature").unwrap();
//! ops::checkout_branch(&repo, "master").unwrap();
//! let outcome = ops::merge(&repo, "feature").unwrap();
//! println!("{} {:?}", id, outcome);
//! ```

mod config;
mod error;
mod graph;
mod hash;
mod object;
mod refs;
mod repo;
mod staging;
mod worktree;

pub mod fs;
pub mod merge;
pub mod ops;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use graph::{CommitGraph, ParentChain};
pub use hash::{compute_blob_hash, Hash};
pub use object::{
    blob_count, blob_exists, blob_path, commit_exists, commit_path, list_commits, read_blob,
    read_commit, write_blob, write_commit,
};
pub use refs::{list_refs, read_ref, ref_exists, validate_branch_name};
pub use repo::{Repo, REPO_DIR_NAME};
pub use staging::StagingArea;
pub use types::{Commit, FileMap};
pub use worktree::{validate_file_name, WorkTree};
