//! The ordered collection of a project's timelines.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AnnotationId, EventId, Timeline, TimelineId};
use crate::color::Rgba;
use crate::error::ModelError;
use crate::placement::{neighbor_bounds, Bounds};
use crate::prompt::Confirm;

/// An existing annotation picked by the user, with the gap it may move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedAnnotation {
    pub timeline: TimelineId,
    pub annotation: AnnotationId,
    pub bounds: Bounds,
}

/// What is remembered about a selection. Its bounds are derived on every
/// read so they follow neighbors that moved since.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Selection {
    timeline: TimelineId,
    annotation: AnnotationId,
    half_frame_ms: i64,
}

/// All timelines of a project, the selected timeline (the only one new
/// annotations may start on) and the selected annotation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineRegistry {
    timelines: Vec<Timeline>,
    selected: Option<TimelineId>,
    selection: Option<Selection>,
    next_timeline_id: u32,
    /// Finalized annotations changed since the last save.
    needs_save: bool,
}

impl TimelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    pub fn timeline(&self, id: TimelineId) -> Result<&Timeline, ModelError> {
        self.timelines
            .iter()
            .find(|t| t.id() == id)
            .ok_or(ModelError::UnknownTimeline(id))
    }

    pub(crate) fn timeline_mut(&mut self, id: TimelineId) -> Result<&mut Timeline, ModelError> {
        self.timelines
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or(ModelError::UnknownTimeline(id))
    }

    pub fn timeline_by_name(&self, name: &str) -> Option<&Timeline> {
        self.timelines.iter().find(|t| t.name() == name)
    }

    /// Timelines sorted by name, the order used for export.
    pub fn timelines_by_name(&self) -> Vec<&Timeline> {
        let mut sorted: Vec<_> = self.timelines.iter().collect();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));
        sorted
    }

    pub fn selected(&self) -> Option<TimelineId> {
        self.selected
    }

    pub fn selected_timeline(&self) -> Option<&Timeline> {
        self.selected.and_then(|id| self.timeline(id).ok())
    }

    /// The selected annotation with the gap around it as it is now.
    pub fn selected_annotation(&self) -> Option<SelectedAnnotation> {
        let s = self.selection?;
        let t = self.timeline(s.timeline).ok()?;
        let a = t.annotation(s.annotation)?;
        Some(SelectedAnnotation {
            timeline: s.timeline,
            annotation: s.annotation,
            bounds: neighbor_bounds(t.annotations(), s.annotation, a.start_time, a.end_time, s.half_frame_ms),
        })
    }

    pub fn has_annotations(&self) -> bool {
        self.timelines.iter().any(Timeline::has_annotations)
    }

    /// Whether there is anything worth writing to CSV.
    pub fn is_exportable(&self) -> bool {
        !self.timelines.is_empty() && self.has_annotations()
    }

    pub fn needs_save(&self) -> bool {
        self.needs_save
    }

    pub fn mark_saved(&mut self) {
        self.needs_save = false;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.needs_save = true;
    }

    // ── Timelines ────────────────────────────────────────────────────

    /// Append a timeline and select it.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateTimeline`] if the name is taken.
    pub fn add_timeline(&mut self, name: impl Into<String>) -> Result<TimelineId, ModelError> {
        let name = name.into();
        if self.timeline_by_name(&name).is_some() {
            return Err(ModelError::DuplicateTimeline(name));
        }
        let id = TimelineId(self.next_timeline_id);
        self.next_timeline_id += 1;
        debug!(timeline = %name, "timeline added");
        self.timelines.push(Timeline::new(id, name));
        self.selected = Some(id);
        Ok(id)
    }

    pub fn rename_timeline(&mut self, id: TimelineId, name: impl Into<String>) -> Result<(), ModelError> {
        let name = name.into();
        if self.timelines.iter().any(|t| t.id() != id && t.name() == name) {
            return Err(ModelError::DuplicateTimeline(name));
        }
        self.timeline_mut(id)?.rename(name);
        Ok(())
    }

    /// Delete a timeline. When it owns annotations the user is asked first
    /// and the annotations go with it. Returns `false` if the user declined.
    pub fn remove_timeline(&mut self, id: TimelineId, confirm: &mut dyn Confirm) -> Result<bool, ModelError> {
        let timeline = self.timeline(id)?;
        if timeline.has_annotations()
            && !confirm.confirm("There are annotations present. Do you want to remove this timeline?")
        {
            return Ok(false);
        }
        let removed = self.timeline_mut(id)?.clear_annotations();
        if removed > 0 {
            self.mark_dirty();
        }
        self.timelines.retain(|t| t.id() != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.selection.is_some_and(|s| s.timeline == id) {
            self.selection = None;
        }
        debug!(timeline = ?id, annotations = removed, "timeline removed");
        Ok(true)
    }

    pub fn select_timeline(&mut self, id: TimelineId) -> Result<(), ModelError> {
        self.timeline(id)?;
        self.selected = Some(id);
        Ok(())
    }

    pub fn select_next_timeline(&mut self) -> Option<TimelineId> {
        self.shift_selection(1)
    }

    pub fn select_previous_timeline(&mut self) -> Option<TimelineId> {
        self.shift_selection(-1)
    }

    fn shift_selection(&mut self, delta: isize) -> Option<TimelineId> {
        if self.timelines.is_empty() {
            return None;
        }
        let len = self.timelines.len() as isize;
        let index = match self.selected.and_then(|id| self.timelines.iter().position(|t| t.id() == id)) {
            Some(current) => (current as isize + delta).rem_euclid(len),
            None if delta > 0 => 0,
            None => len - 1,
        };
        let id = self.timelines[index as usize].id();
        self.selected = Some(id);
        Some(id)
    }

    // ── Events ───────────────────────────────────────────────────────

    pub fn add_event(
        &mut self,
        timeline: TimelineId,
        name: impl Into<String>,
        color: Rgba,
    ) -> Result<EventId, ModelError> {
        self.timeline_mut(timeline)?.add_event(name, color)
    }

    pub fn set_event_color(&mut self, timeline: TimelineId, event: EventId, color: Rgba) -> Result<(), ModelError> {
        self.timeline_mut(timeline)?.set_event_color(event, color)
    }

    pub fn remove_event(&mut self, timeline: TimelineId, event: EventId) -> Result<(), ModelError> {
        self.timeline_mut(timeline)?.remove_event(event).map(|_| ())
    }

    // ── Annotations ──────────────────────────────────────────────────

    /// Delete an annotation after confirmation. Returns `false` if declined.
    pub fn remove_annotation(
        &mut self,
        timeline: TimelineId,
        annotation: AnnotationId,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, ModelError> {
        self.timeline(timeline)?
            .annotation(annotation)
            .ok_or(ModelError::UnknownAnnotation { timeline, annotation })?;
        if !confirm.confirm("Do you want to remove the annotation?") {
            return Ok(false);
        }
        self.take_annotation(timeline, annotation)?;
        Ok(true)
    }

    /// Remove an annotation without asking, keeping the selection consistent.
    pub(crate) fn take_annotation(
        &mut self,
        timeline: TimelineId,
        annotation: AnnotationId,
    ) -> Result<super::Annotation, ModelError> {
        let removed = self
            .timeline_mut(timeline)?
            .remove_annotation(annotation)
            .ok_or(ModelError::UnknownAnnotation { timeline, annotation })?;
        if self
            .selection
            .is_some_and(|s| s.timeline == timeline && s.annotation == annotation)
        {
            self.selection = None;
        }
        self.mark_dirty();
        Ok(removed)
    }

    pub fn change_annotation_label(
        &mut self,
        timeline: TimelineId,
        annotation: AnnotationId,
        event: EventId,
    ) -> Result<(), ModelError> {
        let t = self.timeline_mut(timeline)?;
        t.event(event).ok_or(ModelError::UnknownEvent { timeline, event })?;
        t.annotation_mut(annotation)
            .ok_or(ModelError::UnknownAnnotation { timeline, annotation })?
            .event = Some(event);
        self.mark_dirty();
        Ok(())
    }

    pub fn set_annotation_comment(
        &mut self,
        timeline: TimelineId,
        annotation: AnnotationId,
        comment: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.timeline_mut(timeline)?
            .annotation_mut(annotation)
            .ok_or(ModelError::UnknownAnnotation { timeline, annotation })?
            .comment = comment.into();
        self.mark_dirty();
        Ok(())
    }

    /// Select an existing annotation and compute the gap it sits in.
    pub fn select_annotation(
        &mut self,
        timeline: TimelineId,
        annotation: AnnotationId,
        half_frame_ms: i64,
    ) -> Result<SelectedAnnotation, ModelError> {
        self.timeline(timeline)?
            .annotation(annotation)
            .ok_or(ModelError::UnknownAnnotation { timeline, annotation })?;
        self.selection = Some(Selection {
            timeline,
            annotation,
            half_frame_ms,
        });
        self.selected_annotation()
            .ok_or(ModelError::UnknownAnnotation { timeline, annotation })
    }

    /// Flip the selection state of an annotation. Returns whether it is now
    /// selected.
    pub fn toggle_annotation_selection(
        &mut self,
        timeline: TimelineId,
        annotation: AnnotationId,
        half_frame_ms: i64,
    ) -> Result<bool, ModelError> {
        if self
            .selection
            .is_some_and(|s| s.timeline == timeline && s.annotation == annotation)
        {
            self.selection = None;
            return Ok(false);
        }
        self.select_annotation(timeline, annotation, half_frame_ms)?;
        Ok(true)
    }

    pub fn clear_annotation_selection(&mut self) {
        self.selection = None;
    }
}
