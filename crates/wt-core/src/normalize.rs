//! Timeline normalization.
//!
//! Projects a time-sorted event stream onto a compressed time axis that
//! excludes unpunched intervals: each event is re-expressed as the active
//! time elapsed since the first segment's start, with the gaps between
//! segments subtracted.
//!
//! # Algorithm summary
//!
//! 1. Trim events to the closed range `[genesis, horizon]`.
//! 2. Sweep segments and events in lockstep with an immutable segment
//!    index, accumulating gap downtime as the cursor crosses segment
//!    boundaries.

use chrono::Duration;

use crate::event::TimedEvent;
use crate::segment::SegmentStore;

/// An event re-expressed on the compressed active-time axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent<T> {
    /// Active time elapsed since genesis, downtime excluded.
    pub elapsed_active: Duration,
    pub payload: T,
}

/// Result of a normalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTimeline<T> {
    /// Normalized events, in stream order (ascending `elapsed_active`).
    pub events: Vec<NormalizedEvent<T>>,

    /// Total unpunched time between segments the sweep traversed.
    pub downtime: Duration,

    /// Events dropped because they lay past the last segment's end.
    ///
    /// Always zero for streams trimmed with [`trim_to_range`] first; kept
    /// explicit so untrimmed callers see the truncation instead of silent
    /// data loss.
    pub dropped_beyond_horizon: usize,
}

/// Returns the subsequence of events whose instant lies in the closed
/// interval `[genesis, horizon]`, preserving order.
///
/// Trimming an already-trimmed stream yields the same stream. An empty
/// result is valid and yields no normalized events downstream.
pub fn trim_to_range<T>(store: &SegmentStore, events: Vec<TimedEvent<T>>) -> Vec<TimedEvent<T>> {
    let genesis = store.genesis();
    let horizon = store.horizon();

    let before = events.len();
    let trimmed: Vec<_> = events
        .into_iter()
        .filter(|event| genesis <= event.instant && event.instant <= horizon)
        .collect();

    if trimmed.len() < before {
        tracing::debug!(
            kept = trimmed.len(),
            dropped = before - trimmed.len(),
            "trimmed events outside the punched range"
        );
    }

    trimmed
}

/// Normalizes a trimmed, time-sorted event stream against the store.
///
/// Each emitted event carries `(instant - genesis) - downtime`, where
/// downtime is the sum of gaps between segments the sweep has fully
/// consumed. An event exactly at a segment's `end` counts as inside that
/// segment, not inside the following gap; the same inclusive policy holds
/// at `start`.
///
/// Events strictly before the cursor's current segment are skipped: after
/// trimming against the global range this branch is only reachable for
/// events landing in a gap the cursor has already crossed. Events past the
/// last segment are dropped and counted in
/// [`NormalizedTimeline::dropped_beyond_horizon`].
pub fn normalize_timeline<T>(
    store: &SegmentStore,
    events: Vec<TimedEvent<T>>,
) -> NormalizedTimeline<T> {
    debug_assert!(
        events.windows(2).all(|w| w[0].instant <= w[1].instant),
        "event stream must be sorted ascending by instant"
    );

    let genesis = store.genesis();
    let total = events.len();
    let mut cursor = 0;
    let mut segment = store.get(cursor).expect("store is never empty");
    let mut downtime = Duration::zero();

    let mut normalized = Vec::with_capacity(total);
    let mut dropped_beyond_horizon = 0;

    'events: for (position, event) in events.into_iter().enumerate() {
        loop {
            if event.instant < segment.start {
                // The event fell in a gap the cursor already crossed.
                tracing::debug!(
                    instant = %event.instant,
                    segment_start = %segment.start,
                    "skipping event before the active segment"
                );
                continue 'events;
            }

            if event.instant <= segment.end {
                normalized.push(NormalizedEvent {
                    elapsed_active: (event.instant - genesis) - downtime,
                    payload: event.payload,
                });
                continue 'events;
            }

            // Event belongs to a later segment; advance the cursor and
            // re-test the same event.
            let Some(next) = store.get(cursor + 1) else {
                // The stream is sorted, so this and every remaining event
                // lie past the last segment's end.
                dropped_beyond_horizon = total - position;
                break 'events;
            };
            cursor += 1;
            downtime += next.start - segment.end;
            segment = next;
        }
    }

    NormalizedTimeline {
        events: normalized,
        downtime,
        dropped_beyond_horizon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    use crate::segment::Segment;

    fn ts(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn seg(start: DateTime<Utc>, end: DateTime<Utc>) -> Segment {
        Segment { start, end }
    }

    fn store(segments: Vec<Segment>) -> SegmentStore {
        SegmentStore::new(segments).expect("valid test store")
    }

    fn events(instants: &[DateTime<Utc>]) -> Vec<TimedEvent<&'static str>> {
        let labels = ["e1", "e2", "e3", "e4", "e5"];
        instants
            .iter()
            .zip(labels)
            .map(|(&instant, label)| TimedEvent::new(instant, label))
            .collect()
    }

    #[test]
    fn single_segment_elapsed_is_offset_from_start() {
        let store = store(vec![seg(ts(9, 0), ts(12, 0))]);
        let result = normalize_timeline(&store, events(&[ts(10, 30)]));

        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].elapsed_active, Duration::minutes(90));
        assert_eq!(result.downtime, Duration::zero());
        assert_eq!(result.dropped_beyond_horizon, 0);
    }

    #[test]
    fn gap_between_segments_is_subtracted() {
        let store = store(vec![seg(ts(9, 0), ts(12, 0)), seg(ts(13, 0), ts(17, 0))]);
        let result = normalize_timeline(&store, events(&[ts(14, 0)]));

        // (14:00 - 09:00) - 1h gap = 4h
        assert_eq!(result.events[0].elapsed_active, Duration::hours(4));
        assert_eq!(result.downtime, Duration::hours(1));
    }

    #[test]
    fn two_segment_day_with_a_late_event() {
        let store = store(vec![seg(ts(9, 0), ts(12, 0)), seg(ts(13, 0), ts(17, 0))]);
        let stream = events(&[ts(10, 0), ts(14, 0), ts(20, 0)]);

        let trimmed = trim_to_range(&store, stream);
        assert_eq!(trimmed.len(), 2, "20:00 event is past the horizon");

        let result = normalize_timeline(&store, trimmed);
        assert_eq!(result.events.len(), 2);
        assert_eq!(result.events[0].elapsed_active, Duration::hours(1));
        assert_eq!(result.events[0].payload, "e1");
        assert_eq!(result.events[1].elapsed_active, Duration::hours(4));
        assert_eq!(result.events[1].payload, "e2");
        assert_eq!(result.downtime, Duration::hours(1));
    }

    #[test]
    fn trim_is_idempotent() {
        let store = store(vec![seg(ts(9, 0), ts(12, 0)), seg(ts(13, 0), ts(17, 0))]);
        let stream = events(&[ts(8, 0), ts(10, 0), ts(14, 0), ts(18, 0)]);

        let once = trim_to_range(&store, stream);
        let twice = trim_to_range(&store, once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn trim_keeps_events_exactly_on_the_bounds() {
        let store = store(vec![seg(ts(9, 0), ts(12, 0)), seg(ts(13, 0), ts(17, 0))]);
        let trimmed = trim_to_range(&store, events(&[ts(9, 0), ts(17, 0)]));
        assert_eq!(trimmed.len(), 2);
    }

    #[test]
    fn trim_of_empty_stream_is_empty() {
        let store = store(vec![seg(ts(9, 0), ts(12, 0))]);
        let trimmed = trim_to_range(&store, Vec::<TimedEvent<&str>>::new());
        assert!(trimmed.is_empty());
    }

    #[test]
    fn empty_stream_normalizes_to_empty_result() {
        let store = store(vec![seg(ts(9, 0), ts(12, 0))]);
        let result = normalize_timeline(&store, Vec::<TimedEvent<&str>>::new());

        assert!(result.events.is_empty());
        assert_eq!(result.downtime, Duration::zero());
        assert_eq!(result.dropped_beyond_horizon, 0);
    }

    #[test]
    fn event_at_segment_end_belongs_to_that_segment() {
        let store = store(vec![seg(ts(9, 0), ts(12, 0)), seg(ts(13, 0), ts(17, 0))]);
        let result = normalize_timeline(&store, events(&[ts(12, 0)]));

        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].elapsed_active, Duration::hours(3));
        // The cursor never crossed into the gap, so no downtime accrued.
        assert_eq!(result.downtime, Duration::zero());
    }

    #[test]
    fn event_at_segment_start_belongs_to_that_segment() {
        let store = store(vec![seg(ts(9, 0), ts(12, 0)), seg(ts(13, 0), ts(17, 0))]);
        let result = normalize_timeline(&store, events(&[ts(13, 0)]));

        assert_eq!(result.events[0].elapsed_active, Duration::hours(3));
        assert_eq!(result.downtime, Duration::hours(1));
    }

    #[test]
    fn event_in_a_gap_is_skipped_without_output() {
        // 12:30 falls between the segments: the cursor advances past the
        // gap, then the before-segment branch skips the event.
        let store = store(vec![seg(ts(9, 0), ts(12, 0)), seg(ts(13, 0), ts(17, 0))]);
        let result = normalize_timeline(&store, events(&[ts(12, 30), ts(14, 0)]));

        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].payload, "e2");
        assert_eq!(result.events[0].elapsed_active, Duration::hours(4));
        assert_eq!(result.downtime, Duration::hours(1));
    }

    #[test]
    fn empty_segments_still_charge_their_gap() {
        // No event lands in the middle segment, but both gaps around it are
        // charged once the cursor sweeps through.
        let store = store(vec![
            seg(ts(9, 0), ts(10, 0)),
            seg(ts(11, 0), ts(12, 0)),
            seg(ts(14, 0), ts(17, 0)),
        ]);
        let result = normalize_timeline(&store, events(&[ts(9, 30), ts(15, 0)]));

        // (15:00 - 09:00) - (1h + 2h) = 3h
        assert_eq!(result.events[1].elapsed_active, Duration::hours(3));
        assert_eq!(result.downtime, Duration::hours(3));
    }

    #[test]
    fn events_beyond_last_segment_are_counted_not_emitted() {
        let store = store(vec![seg(ts(9, 0), ts(12, 0))]);
        let result = normalize_timeline(&store, events(&[ts(10, 0), ts(13, 0), ts(15, 0)]));

        assert_eq!(result.events.len(), 1);
        assert_eq!(result.dropped_beyond_horizon, 2);
    }

    #[test]
    fn normalized_elapsed_is_monotonic() {
        let store = store(vec![
            seg(ts(9, 0), ts(10, 0)),
            seg(ts(11, 0), ts(12, 0)),
            seg(ts(14, 0), ts(17, 0)),
        ]);
        let stream = events(&[ts(9, 15), ts(10, 0), ts(11, 0), ts(11, 45), ts(16, 0)]);

        let result = normalize_timeline(&store, trim_to_range(&store, stream));
        for pair in result.events.windows(2) {
            assert!(pair[0].elapsed_active <= pair[1].elapsed_active);
        }
    }

    #[test]
    fn single_segment_store_never_accumulates_downtime() {
        let store = store(vec![seg(ts(9, 0), ts(17, 0))]);
        let result = normalize_timeline(&store, events(&[ts(9, 0), ts(12, 0), ts(17, 0)]));

        assert_eq!(result.downtime, Duration::zero());
        assert_eq!(result.events.len(), 3);
        assert_eq!(result.events[2].elapsed_active, Duration::hours(8));
    }
}
