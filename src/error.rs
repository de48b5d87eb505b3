use std::path::PathBuf;

use crate::Hash;

/// error type for sprig operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not a sprig repository (no .sprig directory in {0})")]
    NoRepo(PathBuf),

    #[error("a sprig version-control system already exists in {0}")]
    RepoExists(PathBuf),

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("corrupt object: hash mismatch for {0}")]
    CorruptObject(Hash),

    #[error("No commit with that id exists: {0}")]
    NoSuchCommit(String),

    #[error("A branch with that name does not exist: {0}")]
    UnknownBranch(String),

    #[error("A branch with that name already exists: {0}")]
    BranchExists(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("Cannot remove the current branch: {0}")]
    CannotDeleteCurrentBranch(String),

    #[error("No need to checkout the current branch: {0}")]
    AlreadyOnBranch(String),

    #[error("File does not exist: {0}")]
    FileNotFound(String),

    #[error("File does not exist in that commit: {0}")]
    FileNotInCommit(String),

    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    #[error("No reason to remove the file: {0}")]
    NothingToRemove(String),

    #[error("Found no commit with that message.")]
    NoCommitWithMessage(String),

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No changes added to the commit.")]
    NothingStaged,

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("There is an untracked file in the way; delete it or add it first: {0}")]
    WorkingTreeConflict(String),

    #[error("Cannot merge a branch with itself.")]
    SelfMerge,

    #[error("Given branch is an ancestor of the current branch.")]
    AlreadyAncestor,

    #[error("inconsistent commit graph: {0}")]
    ConsistencyError(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cbor serialization error: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("cbor deserialization error: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}

/// map a not-found io error onto a domain error, keeping other failures as io errors
pub(crate) fn not_found_or_io(
    e: std::io::Error,
    path: impl Into<PathBuf>,
    not_found: impl FnOnce() -> Error,
) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        not_found()
    } else {
        Error::Io {
            path: path.into(),
            source: e,
        }
    }
}
