use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::graph::CommitGraph;
use crate::worktree::WorkTree;

/// name of the metadata directory inside the working tree
pub const REPO_DIR_NAME: &str = ".sprig";

/// a sprig repository: a working tree plus its `.sprig` metadata directory
///
/// Every mutating operation loads the whole repository state, applies its
/// change and persists it again before returning. There is no locking: two
/// processes running commands against the same repository at once may
/// interleave and lose updates.
pub struct Repo {
    root: PathBuf,
    path: PathBuf,
    config: Config,
}

impl Repo {
    /// initialize a new repository in the given working tree
    ///
    /// creates the directory structure, the root commit and the default branch.
    pub fn init(root: &Path) -> Result<Self> {
        Self::init_with_config(root, Config::default())
    }

    /// initialize with an explicit configuration
    pub fn init_with_config(root: &Path, config: Config) -> Result<Self> {
        let path = root.join(REPO_DIR_NAME);
        if path.exists() {
            return Err(Error::RepoExists(root.to_path_buf()));
        }

        std::fs::create_dir_all(path.join("objects/blobs")).with_path(&path)?;
        std::fs::create_dir_all(path.join("objects/commits")).with_path(&path)?;
        std::fs::create_dir_all(path.join("refs/heads")).with_path(&path)?;
        std::fs::create_dir_all(path.join("staging")).with_path(&path)?;
        std::fs::create_dir_all(path.join("removed")).with_path(&path)?;
        std::fs::create_dir_all(path.join("tmp")).with_path(&path)?;

        let repo = Self {
            root: root.to_path_buf(),
            path,
            config,
        };
        repo.config.save(&repo.config_path())?;

        let mut graph = CommitGraph::empty(&repo.config.default_branch);
        let root_commit =
            graph.create(&repo.config.initial_message, None, Default::default())?;
        graph.move_head(&repo.config.default_branch, root_commit)?;
        graph.save(&repo)?;

        info!(root = %repo.root.display(), commit = %root_commit.short(), "initialized repository");
        Ok(repo)
    }

    /// open an existing repository rooted at the given working tree
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(REPO_DIR_NAME);
        let config_path = path.join("config.toml");
        if !config_path.exists() {
            return Err(Error::NoRepo(root.to_path_buf()));
        }

        let config = Config::load(&config_path)?;

        Ok(Self {
            root: root.to_path_buf(),
            path,
            config,
        })
    }

    /// working tree root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// metadata directory (`<root>/.sprig`)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// repository configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// adapter over the working tree files
    pub fn worktree(&self) -> WorkTree {
        WorkTree::new(&self.root)
    }

    /// path to config.toml
    pub fn config_path(&self) -> PathBuf {
        self.path.join("config.toml")
    }

    /// path to objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.path.join("objects")
    }

    /// path to blobs directory
    pub fn blobs_path(&self) -> PathBuf {
        self.objects_path().join("blobs")
    }

    /// path to commits directory
    pub fn commits_path(&self) -> PathBuf {
        self.objects_path().join("commits")
    }

    /// path to branch refs directory
    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs/heads")
    }

    /// file holding the current branch name
    pub fn head_path(&self) -> PathBuf {
        self.path.join("HEAD")
    }

    /// file holding the current head commit id
    pub fn head_commit_path(&self) -> PathBuf {
        self.path.join("HEAD_COMMIT")
    }

    /// staged file contents
    pub fn staging_path(&self) -> PathBuf {
        self.path.join("staging")
    }

    /// removal markers
    pub fn removed_path(&self) -> PathBuf {
        self.path.join("removed")
    }

    /// path to tmp directory (for atomic writes)
    pub fn tmp_path(&self) -> PathBuf {
        self.path.join("tmp")
    }
}
