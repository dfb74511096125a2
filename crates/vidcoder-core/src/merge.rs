//! Merging of touching, same-label annotations.
//!
//! Two annotations on one timeline can be merged when one ends exactly where
//! the other starts and both carry a label of the same name. The annotation
//! the merge is invoked on survives and grows to cover both; the neighbor is
//! removed. Without such a neighbor a merge is a no-op.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::timeline::{Annotation, AnnotationId, Timeline, TimelineId, TimelineRegistry};

/// Record of a merge that took place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOperation {
    /// The annotation that was kept and extended.
    pub survivor: AnnotationId,
    /// The neighbor that was absorbed and removed.
    pub absorbed: AnnotationId,
    pub start_time: i64,
    pub end_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Previous,
    Next,
}

/// The annotation ending exactly where `annotation` starts, with the same
/// label name.
pub fn previous_candidate<'t>(timeline: &'t Timeline, annotation: &Annotation) -> Option<&'t Annotation> {
    candidate(timeline, annotation, Side::Previous)
}

/// The annotation starting exactly where `annotation` ends, with the same
/// label name.
pub fn next_candidate<'t>(timeline: &'t Timeline, annotation: &Annotation) -> Option<&'t Annotation> {
    candidate(timeline, annotation, Side::Next)
}

fn candidate<'t>(timeline: &'t Timeline, annotation: &Annotation, side: Side) -> Option<&'t Annotation> {
    let label = timeline.label_of(annotation)?;
    timeline.annotations().iter().find(|other| {
        other.id != annotation.id
            && match side {
                Side::Previous => other.end_time == annotation.start_time,
                Side::Next => other.start_time == annotation.end_time,
            }
            && timeline.label_of(other) == Some(label)
    })
}

impl TimelineRegistry {
    /// Whether the annotation has a mergeable neighbor on each side, for
    /// hosts deciding which merge actions to offer.
    pub fn merge_candidates(
        &self,
        timeline: TimelineId,
        annotation: AnnotationId,
    ) -> Result<(bool, bool), ModelError> {
        let t = self.timeline(timeline)?;
        let a = t
            .annotation(annotation)
            .ok_or(ModelError::UnknownAnnotation { timeline, annotation })?;
        Ok((previous_candidate(t, a).is_some(), next_candidate(t, a).is_some()))
    }

    /// Absorb the touching, same-label annotation that ends where this one
    /// starts.
    pub fn merge_previous(
        &mut self,
        timeline: TimelineId,
        annotation: AnnotationId,
    ) -> Result<Option<MergeOperation>, ModelError> {
        self.merge(timeline, annotation, Side::Previous)
    }

    /// Absorb the touching, same-label annotation that starts where this one
    /// ends.
    pub fn merge_next(
        &mut self,
        timeline: TimelineId,
        annotation: AnnotationId,
    ) -> Result<Option<MergeOperation>, ModelError> {
        self.merge(timeline, annotation, Side::Next)
    }

    fn merge(
        &mut self,
        timeline: TimelineId,
        annotation: AnnotationId,
        side: Side,
    ) -> Result<Option<MergeOperation>, ModelError> {
        let t = self.timeline(timeline)?;
        let a = t
            .annotation(annotation)
            .ok_or(ModelError::UnknownAnnotation { timeline, annotation })?;
        let Some(neighbor) = candidate(t, a, side) else {
            return Ok(None);
        };
        let absorbed = neighbor.id;
        let start_time = a.start_time.min(neighbor.start_time);
        let end_time = a.end_time.max(neighbor.end_time);

        self.take_annotation(timeline, absorbed)?;
        let t = self.timeline_mut(timeline)?;
        if let Some(survivor) = t.annotation_mut(annotation) {
            survivor.start_time = start_time;
            survivor.end_time = end_time;
        }
        t.resort();
        self.clear_annotation_selection();
        debug!(?annotation, ?absorbed, start_time, end_time, ?side, "annotations merged");

        Ok(Some(MergeOperation {
            survivor: annotation,
            absorbed,
            start_time,
            end_time,
        }))
    }
}
