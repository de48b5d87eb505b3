use tracing::info;

use crate::error::Result;
use crate::graph::CommitGraph;
use crate::hash::Hash;
use crate::repo::Repo;

/// create a branch at the head commit without switching to it
pub fn branch(repo: &Repo, name: &str) -> Result<Hash> {
    let mut graph = CommitGraph::load(repo)?;
    graph.create_branch(name)?;
    graph.save(repo)?;

    let head = graph.head();
    info!(branch = name, commit = %head.short(), "created branch");
    Ok(head)
}

/// delete a branch pointer; its commits are kept
pub fn rm_branch(repo: &Repo, name: &str) -> Result<()> {
    let mut graph = CommitGraph::load(repo)?;
    graph.delete_branch(name)?;
    graph.save(repo)?;

    info!(branch = name, "deleted branch");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::ref_exists;
    use crate::Error;
    use tempfile::tempdir;

    #[test]
    fn test_branch_points_at_head() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        let id = branch(&repo, "feature").unwrap();

        let graph = CommitGraph::load(&repo).unwrap();
        assert_eq!(graph.get_branch("feature"), Some(id));
        assert_eq!(graph.head(), id);
        assert_eq!(graph.current_branch(), "master");
    }

    #[test]
    fn test_branch_errors() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        branch(&repo, "feature").unwrap();

        assert!(matches!(
            branch(&repo, "feature"),
            Err(Error::BranchExists(_))
        ));
        assert!(matches!(
            branch(&repo, "../escape"),
            Err(Error::InvalidBranchName(_))
        ));
    }

    #[test]
    fn test_branch_nested_under_existing_is_rejected() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        branch(&repo, "a/b").unwrap();

        assert!(matches!(branch(&repo, "a"), Err(Error::InvalidBranchName(_))));
        assert!(matches!(
            branch(&repo, "a/b/c"),
            Err(Error::InvalidBranchName(_))
        ));
        assert!(ref_exists(&repo, "a/b"));
        assert!(!ref_exists(&repo, "a"));
    }

    #[test]
    fn test_rm_branch() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        let id = branch(&repo, "feature").unwrap();

        rm_branch(&repo, "feature").unwrap();

        assert!(!ref_exists(&repo, "feature"));
        let graph = CommitGraph::load(&repo).unwrap();
        assert_eq!(graph.get_branch("feature"), None);
        // the commit itself survives
        assert!(graph.lookup(&id).is_some());
    }

    #[test]
    fn test_rm_branch_errors() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        assert!(matches!(
            rm_branch(&repo, "nope"),
            Err(Error::UnknownBranch(_))
        ));
        assert!(matches!(
            rm_branch(&repo, "master"),
            Err(Error::CannotDeleteCurrentBranch(_))
        ));
    }
}
