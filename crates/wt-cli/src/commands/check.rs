//! Check command: tracked-file activity must fall inside punched segments.

use std::path::Path;

use anyhow::{Context, Result};

use wt_core::{Descriptor, parse_timecard_file, validate_activity};

use crate::config::Config;
use crate::repo::{CommitActivity, load_commits};

/// Runs the check command.
///
/// Validates the untrimmed commit stream so activity before the first
/// punch-in or after the last punch-out is caught too. Fails with the
/// offending commit's id and instant.
pub fn run(
    config: &Config,
    project_dir: &Path,
    repo: Option<&Path>,
    subtree: Option<&str>,
) -> Result<()> {
    let store = parse_timecard_file(&project_dir.join(&config.timecard_file))
        .context("failed to load timecard")?;
    let descriptor = Descriptor::load(&project_dir.join(&config.descriptor_file))
        .context("failed to load descriptor")?;

    let repo = repo.unwrap_or(project_dir);
    let commits = load_commits(&config.git_binary, repo, subtree)?;

    let activities: Vec<_> = commits
        .iter()
        .map(|commit| CommitActivity::new(commit, &descriptor))
        .collect();

    validate_activity(&store, &activities)
        .context("timecard does not cover all tracked-file activity")?;

    println!(
        "OK: {} commit(s) checked against {} segment(s).",
        commits.len(),
        store.len()
    );
    Ok(())
}
