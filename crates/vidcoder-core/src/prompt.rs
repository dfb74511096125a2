//! Collaborators the engine consults synchronously: a yes/no confirmation
//! and the label chooser shown when an annotation is finished.
//!
//! Hosts implement these with dialogs; closures work too, which is how the
//! CLI and the tests drive the engine.

use crate::color::Rgba;
use crate::timeline::{EventId, Timeline};

/// Yes/no prompt asked before data is discarded.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

/// A confirmation with a fixed answer, e.g. from a `--yes` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer(pub bool);

impl Confirm for Answer {
    fn confirm(&mut self, _question: &str) -> bool {
        self.0
    }
}

/// What the user picked when finishing an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventChoice {
    /// Use a label already in the timeline's catalog.
    Existing(EventId),
    /// Create a label. A name already in the catalog selects that label.
    New { name: String, color: Rgba },
    /// Discard the annotation being drawn. Any confirmation has already
    /// been given by the chooser.
    Abort,
    /// Close the chooser and keep drawing.
    Cancel,
}

/// Label chooser shown by `finish_annotation`.
pub trait EventChooser {
    fn choose(&mut self, timeline: &Timeline) -> EventChoice;
}

impl<F> EventChooser for F
where
    F: FnMut(&Timeline) -> EventChoice,
{
    fn choose(&mut self, timeline: &Timeline) -> EventChoice {
        self(timeline)
    }
}

/// Chooser that picks a label by name, creating it with `color` if the
/// catalog does not have it yet.
#[derive(Debug, Clone)]
pub struct LabelByName {
    pub name: String,
    pub color: Rgba,
}

impl LabelByName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Rgba::WHITE,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }
}

impl EventChooser for LabelByName {
    fn choose(&mut self, timeline: &Timeline) -> EventChoice {
        match timeline.event_by_name(&self.name) {
            Some(event) => EventChoice::Existing(event.id),
            None => EventChoice::New {
                name: self.name.clone(),
                color: self.color,
            },
        }
    }
}
