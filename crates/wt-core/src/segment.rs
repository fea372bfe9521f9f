//! Punched segments and the validated segment store.
//!
//! A segment is one punch-in/punch-out interval. The store holds the full
//! ordered sequence and is the immutable ground truth every other pass
//! reads from; it is validated once at construction and never mutated.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One punched-in interval, bounds inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Segment {
    /// Whether `instant` lies inside the segment. An instant exactly on
    /// `start` or `end` is inside.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Punched duration of the segment.
    #[must_use]
    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}

/// Errors raised while validating a segment sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentStoreError {
    #[error("segment store must hold at least one segment")]
    Empty,

    #[error("segment {index} ends at {end}, before its start {start}")]
    InvertedSegment {
        index: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("segment {index} starts before the previous segment")]
    Unordered { index: usize },

    #[error("segment {index} starting at {start} overlaps the previous segment ending at {previous_end}")]
    Overlapping {
        index: usize,
        start: DateTime<Utc>,
        previous_end: DateTime<Utc>,
    },
}

/// A validated, time-ordered sequence of disjoint segments.
///
/// Invariants established by [`SegmentStore::new`] and relied on by every
/// consumer: at least one segment, each segment's `start <= end`, strictly
/// ascending order, and no two segments sharing an instant. Because bounds
/// are inclusive, segments that merely touch (one's `end` equal to the
/// next's `start`) count as overlapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct SegmentStore(Vec<Segment>);

impl SegmentStore {
    /// Validates and wraps a segment sequence.
    pub fn new(segments: Vec<Segment>) -> Result<Self, SegmentStoreError> {
        if segments.is_empty() {
            return Err(SegmentStoreError::Empty);
        }

        for (index, segment) in segments.iter().enumerate() {
            if segment.end < segment.start {
                return Err(SegmentStoreError::InvertedSegment {
                    index,
                    start: segment.start,
                    end: segment.end,
                });
            }
        }

        for (index, pair) in segments.windows(2).enumerate() {
            let (previous, next) = (&pair[0], &pair[1]);
            let index = index + 1;
            if next.start < previous.start {
                return Err(SegmentStoreError::Unordered { index });
            }
            if next.start <= previous.end {
                return Err(SegmentStoreError::Overlapping {
                    index,
                    start: next.start,
                    previous_end: previous.end,
                });
            }
        }

        Ok(Self(segments))
    }

    /// Start of the first segment.
    #[must_use]
    pub fn genesis(&self) -> DateTime<Utc> {
        self.0[0].start
    }

    /// End of the last segment.
    #[must_use]
    pub fn horizon(&self) -> DateTime<Utc> {
        self.0[self.0.len() - 1].end
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the store cannot be constructed empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Segment] {
        &self.0
    }
}

impl TryFrom<Vec<Segment>> for SegmentStore {
    type Error = SegmentStoreError;

    fn try_from(segments: Vec<Segment>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl From<SegmentStore> for Vec<Segment> {
    fn from(store: SegmentStore) -> Self {
        store.0
    }
}

impl<'a> IntoIterator for &'a SegmentStore {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
