//! Timestamped events and the validator's view of tracked activity.

use chrono::{DateTime, Utc};

/// A timestamped event with an opaque payload.
///
/// Streams handed to [`crate::trim_to_range`] and
/// [`crate::normalize_timeline`] must be sorted ascending by `instant`;
/// callers sort after retrieval, the core does not re-sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent<T> {
    pub instant: DateTime<Utc>,
    pub payload: T,
}

impl<T> TimedEvent<T> {
    pub fn new(instant: DateTime<Utc>, payload: T) -> Self {
        Self { instant, payload }
    }
}

/// An event the activity validator can inspect.
///
/// This trait lets validation work with different event representations
/// (e.g., parsed commits in wt-cli, or test fixtures).
pub trait TrackedActivity {
    /// When the activity occurred.
    fn instant(&self) -> DateTime<Utc>;

    /// Identifier reported in violations (e.g., a commit hash).
    fn identifier(&self) -> &str;

    /// Whether the activity touched any tracked path.
    ///
    /// Events returning false are exempt from the in-segment requirement.
    fn touches_tracked_paths(&self) -> bool;
}
