//! Commit retrieval from a git repository.
//!
//! Shells out to `git log --numstat` with a machine-parsable pretty format
//! and turns the output into a time-sorted commit stream for the core.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;

use wt_core::{Descriptor, TrackedActivity};

/// Record separator starting each commit header.
const COMMIT_SEP: char = '\u{1e}';
/// Field separator inside a commit header.
const FIELD_SEP: char = '\u{1f}';

/// Per-file change statistics from `--numstat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: String,
    /// Lines added; zero for binary files, which numstat reports as `-`.
    pub insertions: u64,
    /// Lines removed; zero for binary files.
    pub deletions: u64,
}

/// A parsed commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub id: String,
    pub author: String,
    pub summary: String,
    pub instant: DateTime<Utc>,
    pub files: Vec<FileChange>,
}

impl Commit {
    /// Short hash for display.
    #[must_use]
    pub fn short_id(&self) -> &str {
        &self.id[..7.min(self.id.len())]
    }
}

/// A commit paired with its trackedness under a descriptor, for validation.
#[derive(Debug)]
pub struct CommitActivity<'a> {
    commit: &'a Commit,
    tracked: bool,
}

impl<'a> CommitActivity<'a> {
    pub fn new(commit: &'a Commit, descriptor: &Descriptor) -> Self {
        let tracked = commit
            .files
            .iter()
            .any(|file| descriptor.is_tracked(&file.path));
        Self { commit, tracked }
    }
}

impl TrackedActivity for CommitActivity<'_> {
    fn instant(&self) -> DateTime<Utc> {
        self.commit.instant
    }

    fn identifier(&self) -> &str {
        &self.commit.id
    }

    fn touches_tracked_paths(&self) -> bool {
        self.tracked
    }
}

/// Retrieves commits from `repo`, optionally scoped to a subtree, sorted
/// ascending by commit time.
pub fn load_commits(git_binary: &str, repo: &Path, subtree: Option<&str>) -> Result<Vec<Commit>> {
    let mut command = Command::new(git_binary);
    command
        .arg("-C")
        .arg(repo)
        .arg("log")
        .arg("--numstat")
        .arg(format!(
            "--pretty=format:{COMMIT_SEP}%H{FIELD_SEP}%at{FIELD_SEP}%an{FIELD_SEP}%s"
        ));
    if let Some(subtree) = subtree {
        command.arg("--").arg(subtree);
    }

    let output = command
        .output()
        .with_context(|| format!("failed to run {git_binary}"))?;
    if !output.status.success() {
        bail!(
            "git log failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8(output.stdout).context("git log output was not UTF-8")?;
    let mut commits = parse_git_log(&stdout)?;
    // git log is newest-first; the core requires ascending order.
    commits.sort_by_key(|commit| commit.instant);

    tracing::debug!(commits = commits.len(), repo = %repo.display(), "loaded commits");
    Ok(commits)
}

/// Parses `git log --numstat` output in the format produced by
/// [`load_commits`]. Order is preserved as given.
pub fn parse_git_log(output: &str) -> Result<Vec<Commit>> {
    let mut commits = Vec::new();

    for block in output.split(COMMIT_SEP).skip(1) {
        let mut lines = block.lines();
        let header = lines.next().unwrap_or_default();

        let fields: Vec<&str> = header.split(FIELD_SEP).collect();
        let [id, epoch, author, summary] = fields.as_slice() else {
            bail!("malformed commit header: `{header}`");
        };

        let epoch: i64 = epoch
            .parse()
            .with_context(|| format!("commit {id}: bad timestamp `{epoch}`"))?;
        let instant = DateTime::<Utc>::from_timestamp(epoch, 0)
            .with_context(|| format!("commit {id}: timestamp out of range"))?;

        let mut files = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.splitn(3, '\t');
            let (Some(insertions), Some(deletions), Some(path)) =
                (parts.next(), parts.next(), parts.next())
            else {
                tracing::debug!(line, "skipping malformed numstat line");
                continue;
            };
            files.push(FileChange {
                path: path.to_string(),
                // `-` marks binary files
                insertions: insertions.parse().unwrap_or(0),
                deletions: deletions.parse().unwrap_or(0),
            });
        }

        commits.push(Commit {
            id: (*id).to_string(),
            author: (*author).to_string(),
            summary: (*summary).to_string(),
            instant,
            files,
        });
    }

    Ok(commits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_log() -> String {
        format!(
            "{COMMIT_SEP}aaaa111{FIELD_SEP}1741597200{FIELD_SEP}Sami{FIELD_SEP}add wire codec\n\
             10\t2\tsrc/wire.rs\n\
             3\t0\tsrc/codec.rs\n\
             \n\
             {COMMIT_SEP}bbbb222{FIELD_SEP}1741582800{FIELD_SEP}Sami{FIELD_SEP}initial import\n\
             100\t0\tREADME.md\n\
             -\t-\tassets/logo.png\n"
        )
    }

    #[test]
    fn parses_commits_with_numstat() {
        let commits = parse_git_log(&sample_log()).unwrap();
        assert_eq!(commits.len(), 2);

        let first = &commits[0];
        assert_eq!(first.id, "aaaa111");
        assert_eq!(first.author, "Sami");
        assert_eq!(first.summary, "add wire codec");
        assert_eq!(
            first.instant,
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
        );
        assert_eq!(first.files.len(), 2);
        assert_eq!(first.files[0].path, "src/wire.rs");
        assert_eq!(first.files[0].insertions, 10);
        assert_eq!(first.files[0].deletions, 2);
    }

    #[test]
    fn binary_numstat_counts_as_zero() {
        let commits = parse_git_log(&sample_log()).unwrap();
        let logo = &commits[1].files[1];
        assert_eq!(logo.path, "assets/logo.png");
        assert_eq!(logo.insertions, 0);
        assert_eq!(logo.deletions, 0);
    }

    #[test]
    fn empty_log_parses_to_no_commits() {
        assert!(parse_git_log("").unwrap().is_empty());
    }

    #[test]
    fn malformed_header_is_an_error() {
        let output = format!("{COMMIT_SEP}only-a-hash\n");
        assert!(parse_git_log(&output).is_err());
    }

    #[test]
    fn commit_activity_reflects_descriptor() {
        let commits = parse_git_log(&sample_log()).unwrap();
        let descriptor: Descriptor = serde_json::from_str(
            r#"{"protocol": ["src/wire.rs"], "proof": []}"#,
        )
        .unwrap();

        let touched = CommitActivity::new(&commits[0], &descriptor);
        let untouched = CommitActivity::new(&commits[1], &descriptor);
        assert!(touched.touches_tracked_paths());
        assert!(!untouched.touches_tracked_paths());
        assert_eq!(touched.identifier(), "aaaa111");
    }

    #[test]
    fn short_id_truncates_long_hashes() {
        let commit = Commit {
            id: "0123456789abcdef".to_string(),
            author: String::new(),
            summary: String::new(),
            instant: Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
            files: vec![],
        };
        assert_eq!(commit.short_id(), "0123456");
    }
}
