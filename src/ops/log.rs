use chrono::{DateTime, Local, Utc};

use crate::error::{Error, Result};
use crate::graph::CommitGraph;
use crate::hash::Hash;
use crate::repo::Repo;
use crate::types::Commit;

/// commit with its id for log output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub id: Hash,
    pub commit: Commit,
}

/// history of the head commit, newest first
pub fn log(repo: &Repo) -> Result<Vec<LogEntry>> {
    let graph = CommitGraph::load(repo)?;
    Ok(graph
        .parent_chain(graph.head())
        .map(|(id, commit)| LogEntry {
            id,
            commit: commit.clone(),
        })
        .collect())
}

/// every commit ever made, newest first
pub fn global_log(repo: &Repo) -> Result<Vec<LogEntry>> {
    let graph = CommitGraph::load(repo)?;
    let mut entries: Vec<LogEntry> = graph
        .all()
        .map(|(id, commit)| LogEntry {
            id: *id,
            commit: commit.clone(),
        })
        .collect();

    entries.sort_by(|a, b| b.commit.timestamp.cmp(&a.commit.timestamp));
    Ok(entries)
}

/// ids of all commits with exactly this message
pub fn find(repo: &Repo, message: &str) -> Result<Vec<Hash>> {
    let graph = CommitGraph::load(repo)?;
    let ids = graph.find(message);
    if ids.is_empty() {
        return Err(Error::NoCommitWithMessage(message.to_string()));
    }
    Ok(ids)
}

/// format a log entry for display
impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===")?;
        writeln!(f, "commit {}", self.id)?;
        writeln!(f, "Date: {}", format_timestamp(self.commit.timestamp))?;
        writeln!(f, "{}", self.commit.message)?;
        Ok(())
    }
}

/// local time, e.g. `Thu Nov 09 20:00:05 2017 -0800`
fn format_timestamp(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%a %b %d %H:%M:%S %Y %z")
            .to_string(),
        None => millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{add, branch, checkout_branch, commit};
    use std::fs;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn commit_file(dir: &std::path::Path, repo: &Repo, name: &str, content: &str, msg: &str) -> Hash {
        fs::write(dir.join(name), content).unwrap();
        add(repo, name).unwrap();
        commit(repo, msg).unwrap()
    }

    #[test]
    fn test_log_after_first_commit() {
        let (dir, repo) = test_repo();
        commit_file(dir.path(), &repo, "a.txt", "x", "first");

        let entries = log(&repo).unwrap();
        let messages: Vec<&str> = entries.iter().map(|e| e.commit.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "initial commit"]);
        assert_eq!(messages.iter().filter(|m| **m == "first").count(), 1);
    }

    #[test]
    fn test_log_follows_current_branch_only() {
        let (dir, repo) = test_repo();
        branch(&repo, "side").unwrap();
        commit_file(dir.path(), &repo, "a.txt", "x", "on master");

        checkout_branch(&repo, "side").unwrap();
        commit_file(dir.path(), &repo, "b.txt", "y", "on side");

        let messages: Vec<String> = log(&repo)
            .unwrap()
            .into_iter()
            .map(|e| e.commit.message)
            .collect();
        assert_eq!(messages, vec!["on side", "initial commit"]);

        let global: Vec<String> = global_log(&repo)
            .unwrap()
            .into_iter()
            .map(|e| e.commit.message)
            .collect();
        assert_eq!(global, vec!["on side", "on master", "initial commit"]);
    }

    #[test]
    fn test_find() {
        let (dir, repo) = test_repo();
        let a = commit_file(dir.path(), &repo, "a.txt", "1", "same message");
        let b = commit_file(dir.path(), &repo, "a.txt", "2", "same message");

        let mut found = find(&repo, "same message").unwrap();
        found.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(found, expected);

        assert!(matches!(
            find(&repo, "nothing"),
            Err(Error::NoCommitWithMessage(_))
        ));
    }

    #[test]
    fn test_log_entry_display() {
        let entry = LogEntry {
            id: Hash::ZERO,
            commit: Commit::new("hello", 0, None, Default::default()),
        };
        let text = entry.to_string();
        assert!(text.starts_with("===\ncommit 0000"));
        assert!(text.contains("\nDate: "));
        assert!(text.ends_with("hello\n"));
    }
}
