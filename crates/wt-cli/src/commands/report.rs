//! Report command for rendering the normalized commit timeline.
//!
//! Loads the project's timecard and descriptor, retrieves commits, trims
//! and normalizes them, and renders the result as a table or JSON.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use wt_core::{
    Descriptor, NormalizedTimeline, SegmentStore, TimedEvent, normalize_timeline,
    parse_timecard_file,
};

use crate::config::Config;
use crate::repo::{Commit, load_commits};

/// One commit on the compressed time axis.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub elapsed_active_ms: i64,
    pub id: String,
    pub summary: String,
    pub insertions: u64,
    pub deletions: u64,
    /// Tracked categories touched by the commit, sorted.
    pub categories: Vec<String>,
}

/// Computed report data.
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub project: String,
    pub generated_at: DateTime<Utc>,
    pub genesis: DateTime<Utc>,
    pub horizon: DateTime<Utc>,
    pub segment_count: usize,
    /// Sum of punched segment lengths.
    pub active_ms: i64,
    /// Unpunched time between genesis and horizon.
    pub downtime_ms: i64,
    pub dropped_beyond_horizon: usize,
    pub entries: Vec<ReportEntry>,
}

/// Builds report data from the store and an untrimmed, time-sorted stream.
///
/// The stream goes to the normalizer untrimmed so commits past the last
/// punch-out surface in `dropped_beyond_horizon` instead of vanishing.
pub fn generate_report_data(
    project: &str,
    store: &SegmentStore,
    descriptor: &Descriptor,
    commits: Vec<Commit>,
    generated_at: DateTime<Utc>,
) -> ReportData {
    let events = commits
        .into_iter()
        .map(|commit| TimedEvent::new(commit.instant, commit))
        .collect();

    let NormalizedTimeline {
        events,
        downtime: _,
        dropped_beyond_horizon,
    } = normalize_timeline(store, events);

    let entries = events
        .into_iter()
        .map(|event| {
            let commit = event.payload;
            let mut categories: Vec<String> = commit
                .files
                .iter()
                .filter_map(|file| descriptor.category_of(&file.path))
                .map(str::to_string)
                .collect();
            categories.sort_unstable();
            categories.dedup();

            ReportEntry {
                elapsed_active_ms: event.elapsed_active.num_milliseconds(),
                id: commit.id,
                summary: commit.summary,
                insertions: commit.files.iter().map(|f| f.insertions).sum(),
                deletions: commit.files.iter().map(|f| f.deletions).sum(),
                categories,
            }
        })
        .collect();

    let active_ms: i64 = store
        .iter()
        .map(|segment| segment.length().num_milliseconds())
        .sum();
    let span_ms = (store.horizon() - store.genesis()).num_milliseconds();

    ReportData {
        project: project.to_string(),
        generated_at,
        genesis: store.genesis(),
        horizon: store.horizon(),
        segment_count: store.len(),
        active_ms,
        downtime_ms: span_ms - active_ms,
        dropped_beyond_horizon,
        entries,
    }
}

/// Formats milliseconds as duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0m".to_string();
    }
    let total_minutes = ms / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    writeln!(output, "WORK TIMELINE: {}", data.project).unwrap();
    writeln!(
        output,
        "Punched range: {} -> {} ({} segments)",
        data.genesis.format("%Y-%m-%d %H:%M"),
        data.horizon.format("%Y-%m-%d %H:%M"),
        data.segment_count
    )
    .unwrap();
    writeln!(output).unwrap();

    if data.entries.is_empty() {
        writeln!(output, "No commits inside the punched range.").unwrap();
    } else {
        writeln!(
            output,
            "{:<10}{:<9}{:>8} {:>8}  {:<12}{}",
            "ELAPSED", "COMMIT", "+LINES", "-LINES", "CATEGORIES", "SUMMARY"
        )
        .unwrap();
        for entry in &data.entries {
            let categories = if entry.categories.is_empty() {
                "-".to_string()
            } else {
                entry.categories.join(",")
            };
            let short_id = &entry.id[..7.min(entry.id.len())];
            writeln!(
                output,
                "{:<10}{:<9}{:>8} {:>8}  {:<12}{}",
                format_duration(entry.elapsed_active_ms),
                short_id,
                format!("+{}", entry.insertions),
                format!("-{}", entry.deletions),
                categories,
                entry.summary
            )
            .unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Active time:  {}", format_duration(data.active_ms)).unwrap();
    writeln!(output, "Downtime:     {}", format_duration(data.downtime_ms)).unwrap();
    writeln!(output, "Commits:      {}", data.entries.len()).unwrap();
    if data.dropped_beyond_horizon > 0 {
        writeln!(
            output,
            "Note: {} commit(s) past the last punch-out were dropped.",
            data.dropped_beyond_horizon
        )
        .unwrap();
    }

    output
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Runs the report command.
pub fn run(
    config: &Config,
    project_dir: &Path,
    repo: Option<&Path>,
    subtree: Option<&str>,
    json: bool,
) -> Result<()> {
    let store = parse_timecard_file(&project_dir.join(&config.timecard_file))
        .context("failed to load timecard")?;
    let descriptor = Descriptor::load(&project_dir.join(&config.descriptor_file))
        .context("failed to load descriptor")?;

    let repo = repo.unwrap_or(project_dir);
    let commits = load_commits(&config.git_binary, repo, subtree)?;

    let project = project_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("project");
    let data = generate_report_data(project, &store, &descriptor, commits, Utc::now());

    if json {
        println!("{}", format_report_json(&data)?);
    } else {
        print!("{}", format_report(&data));
    }

    Ok(())
}
