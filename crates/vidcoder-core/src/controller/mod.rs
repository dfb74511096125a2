//! Annotation lifecycle controller.
//!
//! The controller is a synchronous state machine driven by user actions and
//! by the host's playback-position feed. It owns no timer and no thread;
//! every call runs to completion against the registry it is handed.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Drawing -> (finish | abort) -> Idle
//! Idle -> Dragging(handle of a finalized annotation) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut controller = AnnotationController::new(FrameClock::from_fps(25.0)?);
//! controller.start_annotation(&mut registry, position)?;
//! // On every playback position change:
//! let update = controller.on_playback_position_changed(&mut registry, position)?;
//! controller.finish_annotation(&mut registry, &mut chooser)?;
//! ```

mod draft;

pub use draft::Draft;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::frame::FrameClock;
use crate::placement::{can_initiate, neighbor_bounds, Bounds, Placement};
use crate::prompt::{Confirm, EventChoice, EventChooser};
use crate::timeline::{Annotation, AnnotationId, EventId, TimelineId, TimelineRegistry};

/// Which endpoint of a finalized annotation is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Start,
    End,
}

/// An endpoint drag in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleDrag {
    pub timeline: TimelineId,
    pub annotation: AnnotationId,
    pub handle: Handle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerState {
    Idle,
    Drawing(Draft),
    Dragging(HandleDrag),
}

impl ControllerState {
    fn name(&self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Drawing(_) => "drawing an annotation",
            ControllerState::Dragging(_) => "dragging a handle",
        }
    }
}

/// Result of `start_annotation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StartOutcome {
    /// A draft was created and the controller is drawing.
    Started { bounds: Bounds },
    /// The position lies inside an existing annotation; its selection was
    /// toggled instead.
    Toggled {
        annotation: AnnotationId,
        selected: bool,
    },
}

/// Result of `finish_annotation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FinishOutcome {
    Finalized {
        annotation: AnnotationId,
        event: EventId,
        created_event: bool,
    },
    /// The chooser aborted; the draft was discarded.
    Aborted,
    /// The chooser was closed; still drawing.
    Cancelled,
}

/// What the host should do with a playback position it reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// Position after clamping; the host moves its cursor here.
    pub position: i64,
    /// An upper bound was hit; the host should pause playback.
    pub pause: bool,
}

/// Drives create, drag, finalize and abort against a [`TimelineRegistry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationController {
    clock: FrameClock,
    state: ControllerState,
}

impl AnnotationController {
    pub fn new(clock: FrameClock) -> Self {
        Self {
            clock,
            state: ControllerState::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ControllerState::Idle
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            ControllerState::Drawing(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn clock(&self) -> FrameClock {
        self.clock
    }

    pub fn half_frame_ms(&self) -> i64 {
        self.clock.half_frame_ms()
    }

    /// The annotation of the selected timeline under the playback cursor,
    /// highlighted by the host. Nothing is highlighted while drawing.
    pub fn cursor_annotation<'r>(&self, registry: &'r TimelineRegistry, position: i64) -> Option<&'r Annotation> {
        if matches!(self.state, ControllerState::Drawing(_)) {
            return None;
        }
        registry.selected_timeline()?.annotation_at(position)
    }

    // ── Drawing ──────────────────────────────────────────────────────

    /// Start drawing on the selected timeline at `position`, or toggle the
    /// selection of the annotation already covering it.
    ///
    /// # Errors
    /// [`ModelError::NoTimelineSelected`], or [`ModelError::InvalidState`]
    /// when not idle.
    pub fn start_annotation(
        &mut self,
        registry: &mut TimelineRegistry,
        position: i64,
    ) -> Result<StartOutcome, ModelError> {
        self.require_idle("start an annotation")?;
        let timeline_id = registry.selected().ok_or(ModelError::NoTimelineSelected)?;
        let timeline = registry.timeline(timeline_id)?;
        let h = self.half_frame_ms();
        let name = timeline.name().to_string();
        let placement = can_initiate(timeline.annotations(), position, h);

        match placement {
            Placement::Blocked { annotation } => {
                let selected = registry.toggle_annotation_selection(timeline_id, annotation, h)?;
                debug!(?annotation, selected, position, "position covered, selection toggled");
                Ok(StartOutcome::Toggled { annotation, selected })
            }
            Placement::Clear { bounds } => {
                registry.clear_annotation_selection();
                let draft = Draft::new(timeline_id, position, bounds, h);
                debug!(
                    timeline = %name,
                    start = draft.start_time(),
                    end = draft.end_time(),
                    ?bounds,
                    "annotation started"
                );
                self.state = ControllerState::Drawing(draft);
                Ok(StartOutcome::Started { bounds })
            }
        }
    }

    /// Feed a playback position. While drawing, the free endpoint follows the
    /// clamped position; while dragging, the dragged handle does; otherwise a
    /// selected annotation keeps the cursor inside its gap.
    pub fn on_playback_position_changed(
        &mut self,
        registry: &mut TimelineRegistry,
        position: i64,
    ) -> Result<PositionUpdate, ModelError> {
        match &mut self.state {
            ControllerState::Drawing(draft) => {
                let (bounded, pause) = draft.bounds().clamp_reporting_upper(position);
                if draft.track(bounded) {
                    debug!(
                        start = draft.start_time(),
                        end = draft.end_time(),
                        "annotation endpoints flipped"
                    );
                }
                Ok(PositionUpdate { position: bounded, pause })
            }
            ControllerState::Dragging(drag) => {
                let drag = *drag;
                let (bounded, pause) = self.drag_bounds(registry, drag)?.clamp_reporting_upper(position);
                self.on_handle_drag(registry, drag.timeline, drag.annotation, drag.handle, bounded)?;
                Ok(PositionUpdate { position: bounded, pause })
            }
            ControllerState::Idle => match registry.selected_annotation() {
                Some(selection) => {
                    let (bounded, pause) = selection.bounds.clamp_reporting_upper(position);
                    Ok(PositionUpdate { position: bounded, pause })
                }
                None => Ok(PositionUpdate { position, pause: false }),
            },
        }
    }

    /// Ask the chooser for a label and store the draft on its timeline.
    ///
    /// # Errors
    /// [`ModelError::InvalidState`] when not drawing; label errors from the
    /// timeline, in which case the controller keeps drawing.
    pub fn finish_annotation(
        &mut self,
        registry: &mut TimelineRegistry,
        chooser: &mut dyn EventChooser,
    ) -> Result<FinishOutcome, ModelError> {
        let draft = match &self.state {
            ControllerState::Drawing(draft) => draft.clone(),
            other => {
                return Err(ModelError::InvalidState {
                    operation: "finish an annotation",
                    state: other.name(),
                })
            }
        };
        let timeline_id = draft.timeline();
        let choice = chooser.choose(registry.timeline(timeline_id)?);

        let (event, created_event) = match choice {
            EventChoice::Cancel => return Ok(FinishOutcome::Cancelled),
            EventChoice::Abort => {
                self.state = ControllerState::Idle;
                debug!("annotation aborted from label chooser");
                return Ok(FinishOutcome::Aborted);
            }
            EventChoice::Existing(event) => {
                registry
                    .timeline(timeline_id)?
                    .event(event)
                    .ok_or(ModelError::UnknownEvent {
                        timeline: timeline_id,
                        event,
                    })?;
                (event, false)
            }
            EventChoice::New { name, color } => {
                let existing = registry.timeline(timeline_id)?.event_by_name(&name).map(|e| e.id);
                match existing {
                    Some(event) => (event, false),
                    None => (registry.add_event(timeline_id, name, color)?, true),
                }
            }
        };

        let annotation = registry.timeline_mut(timeline_id)?.insert_finalized(
            event,
            draft.start_time(),
            draft.end_time(),
            String::new(),
        );
        registry.mark_dirty();
        self.state = ControllerState::Idle;
        debug!(
            ?annotation,
            ?event,
            start = draft.start_time(),
            end = draft.end_time(),
            "annotation finalized"
        );
        Ok(FinishOutcome::Finalized {
            annotation,
            event,
            created_event,
        })
    }

    /// Discard the draft after confirmation. Returns whether anything was
    /// discarded.
    pub fn abort_annotation(&mut self, confirm: &mut dyn Confirm) -> bool {
        if !matches!(self.state, ControllerState::Drawing(_)) {
            return false;
        }
        if !confirm.confirm("Are you sure to abort the creation of this annotation?") {
            return false;
        }
        self.state = ControllerState::Idle;
        debug!("annotation aborted");
        true
    }

    // ── Editing finalized annotations ────────────────────────────────

    pub fn select_annotation(
        &mut self,
        registry: &mut TimelineRegistry,
        timeline: TimelineId,
        annotation: AnnotationId,
    ) -> Result<(), ModelError> {
        self.require_idle("select an annotation")?;
        registry.select_annotation(timeline, annotation, self.half_frame_ms())?;
        Ok(())
    }

    /// Grab an endpoint handle; playback positions now move it.
    pub fn begin_handle_drag(
        &mut self,
        registry: &mut TimelineRegistry,
        timeline: TimelineId,
        annotation: AnnotationId,
        handle: Handle,
    ) -> Result<(), ModelError> {
        self.require_idle("drag a handle")?;
        registry.select_annotation(timeline, annotation, self.half_frame_ms())?;
        self.state = ControllerState::Dragging(HandleDrag {
            timeline,
            annotation,
            handle,
        });
        Ok(())
    }

    /// Release the handle. The annotation stays selected with refreshed
    /// bounds.
    pub fn end_handle_drag(&mut self, registry: &mut TimelineRegistry) -> Result<(), ModelError> {
        let drag = match self.state {
            ControllerState::Dragging(drag) => drag,
            ref other => {
                return Err(ModelError::InvalidState {
                    operation: "release a handle",
                    state: other.name(),
                })
            }
        };
        self.state = ControllerState::Idle;
        registry.select_annotation(drag.timeline, drag.annotation, self.half_frame_ms())?;
        Ok(())
    }

    /// Move one endpoint of a finalized annotation toward `time`.
    ///
    /// Bounds come from the annotation's neighbors with the annotation
    /// itself excluded. `time` is a frame centre, so the start handle lands
    /// half a frame before it and the end handle half a frame after; neither
    /// crosses the other endpoint. Returns the new endpoint value.
    pub fn on_handle_drag(
        &mut self,
        registry: &mut TimelineRegistry,
        timeline: TimelineId,
        annotation: AnnotationId,
        handle: Handle,
        time: i64,
    ) -> Result<i64, ModelError> {
        if matches!(self.state, ControllerState::Drawing(_)) {
            return Err(ModelError::InvalidState {
                operation: "drag a handle",
                state: self.state.name(),
            });
        }
        let h = self.half_frame_ms();
        let bounds = self.drag_bounds(
            registry,
            HandleDrag {
                timeline,
                annotation,
                handle,
            },
        )?;
        let bounded = bounds.clamp(time);

        let t = registry.timeline_mut(timeline)?;
        let a = t
            .annotation_mut(annotation)
            .ok_or(ModelError::UnknownAnnotation { timeline, annotation })?;
        // Neighbor edges are bounds ± h; clip to them as well since the lower
        // bound wins when a gap is narrower than one frame.
        let value = match handle {
            Handle::Start => {
                let start = bounds.lower.map_or(bounded - h, |l| (bounded - h).max(l - h));
                a.start_time = start.min(a.end_time);
                a.start_time
            }
            Handle::End => {
                let end = bounds.upper.map_or(bounded + h, |u| (bounded + h).min(u + h));
                a.end_time = end.max(a.start_time);
                a.end_time
            }
        };
        t.resort();
        registry.mark_dirty();
        debug!(?annotation, ?handle, value, "handle moved");
        Ok(value)
    }

    fn drag_bounds(&self, registry: &TimelineRegistry, drag: HandleDrag) -> Result<Bounds, ModelError> {
        let t = registry.timeline(drag.timeline)?;
        let a = t.annotation(drag.annotation).ok_or(ModelError::UnknownAnnotation {
            timeline: drag.timeline,
            annotation: drag.annotation,
        })?;
        Ok(neighbor_bounds(
            t.annotations(),
            drag.annotation,
            a.start_time,
            a.end_time,
            self.half_frame_ms(),
        ))
    }

    fn require_idle(&self, operation: &'static str) -> Result<(), ModelError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(ModelError::InvalidState {
                operation,
                state: self.state.name(),
            })
        }
    }
}

impl Default for AnnotationController {
    fn default() -> Self {
        Self::new(FrameClock::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::prompt::{Answer, LabelByName};

    fn gaze_registry() -> (TimelineRegistry, TimelineId) {
        let mut reg = TimelineRegistry::new();
        let id = reg.add_timeline("Gaze").unwrap();
        (reg, id)
    }

    fn controller() -> AnnotationController {
        AnnotationController::new(FrameClock::from_half_frame(20))
    }

    fn draw(
        c: &mut AnnotationController,
        reg: &mut TimelineRegistry,
        from: i64,
        to: i64,
        label: &str,
    ) -> AnnotationId {
        c.start_annotation(reg, from).unwrap();
        c.on_playback_position_changed(reg, to).unwrap();
        match c.finish_annotation(reg, &mut LabelByName::new(label)).unwrap() {
            FinishOutcome::Finalized { annotation, .. } => annotation,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn start_requires_a_selected_timeline() {
        let mut reg = TimelineRegistry::new();
        let mut c = controller();
        assert_eq!(c.start_annotation(&mut reg, 0), Err(ModelError::NoTimelineSelected));
    }

    #[test]
    fn draws_and_finalizes_with_a_new_label() {
        let (mut reg, id) = gaze_registry();
        let mut c = controller();
        assert_eq!(
            c.start_annotation(&mut reg, 1000).unwrap(),
            StartOutcome::Started { bounds: Bounds::UNBOUNDED }
        );
        let update = c.on_playback_position_changed(&mut reg, 1980).unwrap();
        assert_eq!(update, PositionUpdate { position: 1980, pause: false });

        let outcome = c
            .finish_annotation(&mut reg, &mut LabelByName::new("Look").with_color(Rgba::opaque(0, 0, 255)))
            .unwrap();
        let FinishOutcome::Finalized { annotation, created_event, .. } = outcome else {
            panic!("expected finalized, got {outcome:?}");
        };
        assert!(created_event);
        assert!(c.is_idle());

        let t = reg.timeline(id).unwrap();
        let a = t.annotation(annotation).unwrap();
        assert_eq!((a.start_time, a.end_time), (980, 2000));
        assert_eq!(t.label_of(a), Some("Look"));
        assert_eq!(t.event_by_name("Look").unwrap().color, Rgba::opaque(0, 0, 255));
        assert!(reg.needs_save());
    }

    #[test]
    fn starting_inside_an_annotation_toggles_its_selection() {
        let (mut reg, id) = gaze_registry();
        let mut c = controller();
        let a = draw(&mut c, &mut reg, 1020, 1980, "Look");

        assert_eq!(
            c.start_annotation(&mut reg, 1500).unwrap(),
            StartOutcome::Toggled { annotation: a, selected: true }
        );
        assert!(c.is_idle());
        assert_eq!(reg.selected_annotation().unwrap().annotation, a);
        assert_eq!(
            c.start_annotation(&mut reg, 1500).unwrap(),
            StartOutcome::Toggled { annotation: a, selected: false }
        );
        assert_eq!(reg.timeline(id).unwrap().annotations().len(), 1);
    }

    #[test]
    fn live_updates_are_clamped_and_pause_at_the_next_annotation() {
        let (mut reg, id) = gaze_registry();
        let mut c = controller();
        draw(&mut c, &mut reg, 3020, 3980, "Look");

        c.start_annotation(&mut reg, 1000).unwrap();
        let update = c.on_playback_position_changed(&mut reg, 3500).unwrap();
        assert_eq!(update, PositionUpdate { position: 2980, pause: true });
        let draft = c.draft().unwrap();
        assert_eq!((draft.start_time(), draft.end_time()), (980, 3000));

        c.finish_annotation(&mut reg, &mut LabelByName::new("Look")).unwrap();
        let t = reg.timeline(id).unwrap();
        assert_eq!(t.annotations()[0].end_time, t.annotations()[1].start_time);
    }

    #[test]
    fn finishing_a_backward_drag_stores_ordered_endpoints() {
        let (mut reg, id) = gaze_registry();
        let mut c = controller();
        c.start_annotation(&mut reg, 5000).unwrap();
        c.on_playback_position_changed(&mut reg, 4000).unwrap();
        c.on_playback_position_changed(&mut reg, 3000).unwrap();
        c.finish_annotation(&mut reg, &mut LabelByName::new("Look")).unwrap();
        let a = &reg.timeline(id).unwrap().annotations()[0];
        assert_eq!((a.start_time, a.end_time), (2980, 4980));
    }

    #[test]
    fn cancel_keeps_drawing_and_abort_discards() {
        let (mut reg, id) = gaze_registry();
        let mut c = controller();
        c.start_annotation(&mut reg, 1000).unwrap();

        let outcome = c.finish_annotation(&mut reg, &mut |_: &crate::timeline::Timeline| EventChoice::Cancel);
        assert_eq!(outcome, Ok(FinishOutcome::Cancelled));
        assert!(c.draft().is_some());

        let outcome = c.finish_annotation(&mut reg, &mut |_: &crate::timeline::Timeline| EventChoice::Abort);
        assert_eq!(outcome, Ok(FinishOutcome::Aborted));
        assert!(c.is_idle());
        assert!(!reg.timeline(id).unwrap().has_annotations());
        assert!(reg.timeline(id).unwrap().events().is_empty());
    }

    #[test]
    fn abort_asks_for_confirmation() {
        let (mut reg, _) = gaze_registry();
        let mut c = controller();
        assert!(!c.abort_annotation(&mut Answer(true)));

        c.start_annotation(&mut reg, 1000).unwrap();
        assert!(!c.abort_annotation(&mut Answer(false)));
        assert!(c.draft().is_some());
        assert!(c.abort_annotation(&mut Answer(true)));
        assert!(c.is_idle());
        assert!(!reg.needs_save());
    }

    #[test]
    fn unknown_existing_event_keeps_the_draft() {
        let (mut reg, _) = gaze_registry();
        let mut c = controller();
        c.start_annotation(&mut reg, 1000).unwrap();
        let result = c.finish_annotation(&mut reg, &mut |_: &crate::timeline::Timeline| {
            EventChoice::Existing(EventId(42))
        });
        assert!(matches!(result, Err(ModelError::UnknownEvent { .. })));
        assert!(c.draft().is_some());
    }

    #[test]
    fn operations_out_of_order_are_rejected() {
        let (mut reg, _) = gaze_registry();
        let mut c = controller();
        assert!(matches!(
            c.finish_annotation(&mut reg, &mut LabelByName::new("Look")),
            Err(ModelError::InvalidState { .. })
        ));
        c.start_annotation(&mut reg, 1000).unwrap();
        assert!(matches!(
            c.start_annotation(&mut reg, 9000),
            Err(ModelError::InvalidState { .. })
        ));
        assert!(c.end_handle_drag(&mut reg).is_err());
    }

    #[test]
    fn handle_drag_is_bounded_by_neighbors() {
        let (mut reg, id) = gaze_registry();
        let mut c = controller();
        let first = draw(&mut c, &mut reg, 1020, 1980, "Look");
        let second = draw(&mut c, &mut reg, 3020, 3980, "Look");

        // Stretch the first annotation's end into the second one.
        let end = c.on_handle_drag(&mut reg, id, first, Handle::End, 3500).unwrap();
        assert_eq!(end, 3000);
        // Pull the second one's start back past the first one.
        let start = c.on_handle_drag(&mut reg, id, second, Handle::Start, 500).unwrap();
        assert_eq!(start, 3000);
        // A start handle never passes its own end.
        let start = c.on_handle_drag(&mut reg, id, second, Handle::Start, 9000).unwrap();
        assert_eq!(start, 4000);

        let t = reg.timeline(id).unwrap();
        let a = t.annotation(first).unwrap();
        let b = t.annotation(second).unwrap();
        assert!(!a.overlaps(b));
    }

    #[test]
    fn playback_feed_moves_a_grabbed_handle() {
        let (mut reg, id) = gaze_registry();
        let mut c = controller();
        let first = draw(&mut c, &mut reg, 1020, 1980, "Look");
        draw(&mut c, &mut reg, 3020, 3980, "Look");

        c.begin_handle_drag(&mut reg, id, first, Handle::End).unwrap();
        let update = c.on_playback_position_changed(&mut reg, 2480).unwrap();
        assert_eq!(update, PositionUpdate { position: 2480, pause: false });
        let update = c.on_playback_position_changed(&mut reg, 5000).unwrap();
        assert_eq!(update, PositionUpdate { position: 2980, pause: true });
        c.end_handle_drag(&mut reg).unwrap();

        let a = reg.timeline(id).unwrap().annotation(first).unwrap().clone();
        assert_eq!((a.start_time, a.end_time), (1000, 3000));
        assert_eq!(reg.selected_annotation().unwrap().annotation, first);
    }

    #[test]
    fn selected_annotation_keeps_cursor_in_its_gap() {
        let (mut reg, id) = gaze_registry();
        let mut c = controller();
        let first = draw(&mut c, &mut reg, 1020, 1980, "Look");
        draw(&mut c, &mut reg, 4020, 4980, "Look");

        c.select_annotation(&mut reg, id, first).unwrap();
        let update = c.on_playback_position_changed(&mut reg, 6000).unwrap();
        assert_eq!(update, PositionUpdate { position: 3980, pause: true });

        reg.clear_annotation_selection();
        let update = c.on_playback_position_changed(&mut reg, 6000).unwrap();
        assert_eq!(update, PositionUpdate { position: 6000, pause: false });
    }

    #[test]
    fn selection_gap_follows_a_moved_neighbor() {
        let (mut reg, id) = gaze_registry();
        let mut c = controller();
        let first = draw(&mut c, &mut reg, 1020, 1980, "Look");
        let second = draw(&mut c, &mut reg, 3020, 3980, "Look");

        c.select_annotation(&mut reg, id, first).unwrap();
        let start = c.on_handle_drag(&mut reg, id, second, Handle::Start, 2100).unwrap();
        assert_eq!(start, 2080);

        let update = c.on_playback_position_changed(&mut reg, 2900).unwrap();
        assert_eq!(update, PositionUpdate { position: 2060, pause: true });
        assert_eq!(reg.selected_annotation().unwrap().annotation, first);
    }

    #[test]
    fn cursor_annotation_follows_the_selected_timeline() {
        let (mut reg, _) = gaze_registry();
        let mut c = controller();
        let a = draw(&mut c, &mut reg, 1020, 1980, "Look");
        assert_eq!(c.cursor_annotation(&reg, 1500).map(|x| x.id), Some(a));
        assert!(c.cursor_annotation(&reg, 2500).is_none());

        c.start_annotation(&mut reg, 5000).unwrap();
        assert!(c.cursor_annotation(&reg, 1500).is_none());
    }
}
