//! Timelines, their event catalogs and annotations.
//!
//! This module provides:
//! - The annotation and event label data model
//! - Timelines, which own both and keep annotations sorted by start time
//! - The registry holding every timeline of a project plus the selection
//!
//! Ownership is index based: a [`Timeline`] owns its events and annotations,
//! and an [`Annotation`] only refers back to them through [`TimelineId`] and
//! [`EventId`] handles.

mod annotation;
mod event;
mod registry;
mod track;

use serde::{Deserialize, Serialize};

pub use annotation::Annotation;
pub use event::Event;
pub use registry::{SelectedAnnotation, TimelineRegistry};
pub use track::Timeline;

/// Handle of a timeline inside a [`TimelineRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimelineId(pub u32);

/// Per-timeline sequence number of an event label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u32);

/// Per-timeline handle of a finalized annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnotationId(pub u64);
