//! Annotation intervals.

use serde::{Deserialize, Serialize};

use super::{AnnotationId, EventId, TimelineId};

/// A labeled time interval on a timeline, in milliseconds.
///
/// Annotations stored in a [`Timeline`](super::Timeline) are finalized:
/// `event` is set and `start_time <= end_time`. An annotation that is still
/// being drawn lives in the controller's draft instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub timeline: TimelineId,
    pub event: Option<EventId>,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub comment: String,
}

impl Annotation {
    pub fn duration_ms(&self) -> i64 {
        self.end_time - self.start_time
    }

    pub fn is_finalized(&self) -> bool {
        self.event.is_some()
    }

    /// Closed-interval membership, endpoints included.
    pub fn contains(&self, time: i64) -> bool {
        self.start_time <= time && time <= self.end_time
    }

    /// Whether the interiors of the two intervals intersect. Touching
    /// endpoints do not count.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann(id: u64, start: i64, end: i64) -> Annotation {
        Annotation {
            id: AnnotationId(id),
            timeline: TimelineId(0),
            event: Some(EventId(1)),
            start_time: start,
            end_time: end,
            comment: String::new(),
        }
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        assert!(!ann(1, 1000, 2000).overlaps(&ann(2, 2000, 3000)));
        assert!(ann(1, 1000, 2001).overlaps(&ann(2, 2000, 3000)));
    }

    #[test]
    fn contains_includes_endpoints() {
        let a = ann(1, 1000, 2000);
        assert!(a.contains(1000));
        assert!(a.contains(2000));
        assert!(!a.contains(999));
        assert_eq!(a.duration_ms(), 1000);
    }
}
