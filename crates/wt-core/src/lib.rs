//! Core timeline logic for work-timeline.
//!
//! This crate contains the fundamental types and logic for:
//! - Segments: validated punched-in intervals from a timecard
//! - Normalization: projecting commit events onto a compressed active-time axis
//! - Validation: asserting tracked-file activity happened while punched in

pub mod descriptor;
pub mod event;
mod normalize;
pub mod segment;
pub mod timecard;
mod validate;

pub use descriptor::{Descriptor, DescriptorError};
pub use event::{TimedEvent, TrackedActivity};
pub use normalize::{NormalizedEvent, NormalizedTimeline, normalize_timeline, trim_to_range};
pub use segment::{Segment, SegmentStore, SegmentStoreError};
pub use timecard::{TimecardError, parse_timecard, parse_timecard_file};
pub use validate::{ActivityViolation, validate_activity};
