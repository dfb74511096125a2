//! A single named timeline.

use serde::{Deserialize, Serialize};

use super::{Annotation, AnnotationId, Event, EventId, TimelineId};
use crate::color::Rgba;
use crate::error::ModelError;

/// A named track owning an event catalog and its finalized annotations.
///
/// Events are kept sorted by name; annotations are kept sorted by start
/// time. The non-overlap invariant among annotations is maintained by the
/// controller before anything is inserted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    id: TimelineId,
    name: String,
    events: Vec<Event>,
    annotations: Vec<Annotation>,
    next_event_id: u32,
    next_annotation_id: u64,
}

impl Timeline {
    pub fn new(id: TimelineId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            events: Vec::new(),
            annotations: Vec::new(),
            next_event_id: 1,
            next_annotation_id: 1,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> TimelineId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn event_by_name(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Name of the label an annotation carries, if any.
    pub fn label_of(&self, annotation: &Annotation) -> Option<&str> {
        annotation
            .event
            .and_then(|id| self.event(id))
            .map(|e| e.name.as_str())
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// Annotations carrying the given label, in start order.
    pub fn annotations_for_event(&self, event: EventId) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(move |a| a.event == Some(event))
    }

    /// The annotation whose closed interval contains `time`. When two
    /// annotations touch at `time`, the earlier one wins.
    pub fn annotation_at(&self, time: i64) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.contains(time))
    }

    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty()
    }

    // ── Event catalog ────────────────────────────────────────────────

    /// Add a new label. Ids follow the catalog size, so the first label a
    /// user creates on an empty timeline gets id 1.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateEvent`] if the name is taken.
    pub fn add_event(&mut self, name: impl Into<String>, color: Rgba) -> Result<EventId, ModelError> {
        let name = name.into();
        if self.event_by_name(&name).is_some() {
            return Err(ModelError::DuplicateEvent {
                timeline: self.name.clone(),
                event: name,
            });
        }
        let id = EventId(self.next_event_id.max(self.events.len() as u32 + 1));
        self.insert_event(Event::new(id, name, color));
        Ok(id)
    }

    /// Insert a label with a predetermined id, as read from a project file.
    pub(crate) fn insert_event(&mut self, event: Event) {
        self.next_event_id = self.next_event_id.max(event.id.0 + 1);
        let pos = self.events.partition_point(|e| e.name <= event.name);
        self.events.insert(pos, event);
    }

    /// Remove a label no annotation uses any more.
    ///
    /// # Errors
    /// Returns [`ModelError::UnknownEvent`] or [`ModelError::EventInUse`].
    pub fn remove_event(&mut self, id: EventId) -> Result<Event, ModelError> {
        let pos = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or(ModelError::UnknownEvent {
                timeline: self.id,
                event: id,
            })?;
        let count = self.annotations_for_event(id).count();
        if count > 0 {
            return Err(ModelError::EventInUse {
                event: self.events[pos].name.clone(),
                count,
            });
        }
        Ok(self.events.remove(pos))
    }

    pub(crate) fn set_event_color(&mut self, id: EventId, color: Rgba) -> Result<(), ModelError> {
        let timeline = self.id;
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(ModelError::UnknownEvent { timeline, event: id })?;
        event.color = color;
        Ok(())
    }

    // ── Annotations ──────────────────────────────────────────────────

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn annotation_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    /// Store a finalized annotation. A reversed interval is swapped first;
    /// no overlap check is made against existing annotations.
    pub(crate) fn insert_finalized(
        &mut self,
        event: EventId,
        mut start_time: i64,
        mut end_time: i64,
        comment: String,
    ) -> AnnotationId {
        if start_time > end_time {
            std::mem::swap(&mut start_time, &mut end_time);
        }
        let id = AnnotationId(self.next_annotation_id);
        self.next_annotation_id += 1;
        let pos = self.annotations.partition_point(|a| a.start_time <= start_time);
        self.annotations.insert(
            pos,
            Annotation {
                id,
                timeline: self.id,
                event: Some(event),
                start_time,
                end_time,
                comment,
            },
        );
        id
    }

    pub(crate) fn remove_annotation(&mut self, id: AnnotationId) -> Option<Annotation> {
        let pos = self.annotations.iter().position(|a| a.id == id)?;
        Some(self.annotations.remove(pos))
    }

    pub(crate) fn clear_annotations(&mut self) -> usize {
        let count = self.annotations.len();
        self.annotations.clear();
        count
    }

    /// Restore start order after an endpoint was moved in place.
    pub(crate) fn resort(&mut self) {
        self.annotations.sort_by_key(|a| a.start_time);
    }
}
