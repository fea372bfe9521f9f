//! Timecard parsing.
//!
//! A timecard is a two-column CSV (header row, then `kind,timestamp` rows)
//! where `kind` strictly alternates `start` / `end` and timestamps use the
//! `%m/%d/%Y %H:%M:%S %Z` format. Each start/end pair becomes one punched
//! segment.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

use crate::segment::{Segment, SegmentStore, SegmentStoreError};

const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Errors raised while parsing a timecard.
#[derive(Debug, Error)]
pub enum TimecardError {
    #[error("failed to read timecard")]
    Csv(#[from] csv::Error),

    #[error("timecard row {row} has fewer than two columns")]
    MissingColumns { row: usize },

    #[error("timecard row {row}: unknown kind `{kind}` (expected `start` or `end`)")]
    UnknownKind { row: usize, kind: String },

    #[error("timecard row {row}: `start` while the previous punch is still open")]
    UnexpectedStart { row: usize },

    #[error("timecard row {row}: `end` with no open punch")]
    UnexpectedEnd { row: usize },

    #[error("timecard row {row}: cannot parse timestamp `{value}`")]
    Timestamp {
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("timecard ends with an open punch")]
    UnclosedPunch,

    #[error("timecard segments are malformed")]
    Store(#[from] SegmentStoreError),
}

/// Parses a timecard file into a validated segment store.
pub fn parse_timecard_file(path: &Path) -> Result<SegmentStore, TimecardError> {
    let file = File::open(path).map_err(csv::Error::from)?;
    parse_timecard(file)
}

/// Parses timecard CSV from any reader.
///
/// The first row is a header and is skipped. Rows must strictly alternate
/// `start` then `end`; any other pattern is a hard error rather than a
/// repairable condition.
pub fn parse_timecard<R: Read>(reader: R) -> Result<SegmentStore, TimecardError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut segments = Vec::new();
    let mut open_punch: Option<DateTime<Utc>> = None;

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        // Header is row 1; data rows start at 2.
        let row = index + 2;

        let (kind, raw_timestamp) = match (record.get(0), record.get(1)) {
            (Some(kind), Some(ts)) => (kind.trim(), ts.trim()),
            _ => return Err(TimecardError::MissingColumns { row }),
        };

        let timestamp = parse_punch_timestamp(raw_timestamp).map_err(|source| {
            TimecardError::Timestamp {
                row,
                value: raw_timestamp.to_string(),
                source,
            }
        })?;

        match kind {
            "start" => {
                if open_punch.is_some() {
                    return Err(TimecardError::UnexpectedStart { row });
                }
                open_punch = Some(timestamp);
            }
            "end" => {
                let Some(start) = open_punch.take() else {
                    return Err(TimecardError::UnexpectedEnd { row });
                };
                segments.push(Segment {
                    start,
                    end: timestamp,
                });
            }
            other => {
                return Err(TimecardError::UnknownKind {
                    row,
                    kind: other.to_string(),
                });
            }
        }
    }

    if open_punch.is_some() {
        return Err(TimecardError::UnclosedPunch);
    }

    let store = SegmentStore::new(segments)?;
    tracing::debug!(segments = store.len(), "parsed timecard");
    Ok(store)
}

/// Parses `%m/%d/%Y %H:%M:%S %Z` timestamps.
///
/// The zone label is accepted and discarded; punch instants are recorded in
/// UTC.
fn parse_punch_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let trimmed = match value.rsplit_once(' ') {
        Some((head, zone)) if zone.chars().all(char::is_alphabetic) => head,
        _ => value,
    };
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT).map(|dt| dt.and_utc())
}
