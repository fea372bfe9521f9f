//! Activity validation.
//!
//! Checks that every event touching tracked paths falls inside some punched
//! segment. Runs on the untrimmed stream, so activity recorded before the
//! first punch-in or after the last punch-out is caught too.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::event::TrackedActivity;
use crate::segment::SegmentStore;

/// Tracked activity found outside every punched segment.
///
/// Terminal for the validation pass; callers choose whether to abort or to
/// flag and continue.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("activity {identifier} at {instant} falls outside every punched segment")]
pub struct ActivityViolation {
    pub identifier: String,
    pub instant: DateTime<Utc>,
}

/// Verifies that every event with tracked-path activity lies inside at
/// least one segment, bounds inclusive at both ends (the same boundary
/// policy as normalization).
///
/// Fails on the first violation; succeeds with no output otherwise. Events
/// that touch no tracked path are ignored regardless of their instant.
pub fn validate_activity<E: TrackedActivity>(
    store: &SegmentStore,
    events: &[E],
) -> Result<(), ActivityViolation> {
    for event in events {
        if !event.touches_tracked_paths() {
            continue;
        }

        let instant = event.instant();
        if !contains(store, instant) {
            tracing::warn!(
                identifier = event.identifier(),
                %instant,
                "tracked activity outside every segment"
            );
            return Err(ActivityViolation {
                identifier: event.identifier().to_string(),
                instant,
            });
        }
    }

    Ok(())
}

/// Binary search over segment starts; segments are sorted and disjoint, so
/// only the last segment starting at or before `instant` can contain it.
fn contains(store: &SegmentStore, instant: DateTime<Utc>) -> bool {
    let segments = store.as_slice();
    let candidates = segments.partition_point(|segment| segment.start <= instant);
    candidates
        .checked_sub(1)
        .is_some_and(|index| segments[index].contains(instant))
}
