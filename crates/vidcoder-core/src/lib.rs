//! # Vidcoder Core Library
//!
//! This library provides the timeline annotation engine of a video coder:
//! labeled, non-overlapping time intervals marked on named timelines while
//! a video plays. Video decoding, rendering and dialogs belong to the host;
//! the engine only sees playback positions, a frame rate and the answers of
//! its collaborator traits.
//!
//! ## Architecture
//!
//! - **Timeline**: Timelines owning their event catalogs and annotations,
//!   held by a registry that also tracks the selection
//! - **Placement**: Pure bound computation that keeps new and resized
//!   intervals off their neighbors
//! - **Controller**: The create, drag, finalize and abort state machine fed
//!   by the playback position
//! - **Merge**: Joining touching annotations that share a label
//! - **Storage**: TOML project configuration and CSV annotation files
//!
//! ## Key Components
//!
//! - [`AnnotationController`]: Annotation lifecycle state machine
//! - [`TimelineRegistry`]: All timelines of a project
//! - [`Project`]: A project directory on disk
//! - [`EventChooser`] / [`Confirm`]: Traits for the host's dialogs

pub mod coders;
pub mod color;
pub mod controller;
pub mod error;
pub mod frame;
pub mod merge;
pub mod placement;
pub mod prompt;
pub mod storage;
pub mod timeline;

pub use coders::{Coder, Coders};
pub use color::Rgba;
pub use controller::{AnnotationController, ControllerState, FinishOutcome, Handle, PositionUpdate, StartOutcome};
pub use error::{ConfigError, CoreError, CsvError, ModelError};
pub use frame::FrameClock;
pub use merge::MergeOperation;
pub use placement::{can_initiate, clamp, Bounds, Placement};
pub use prompt::{Answer, Confirm, EventChoice, EventChooser, LabelByName};
pub use storage::{ImportReport, Project, ProjectConfig};
pub use timeline::{Annotation, AnnotationId, Event, EventId, Timeline, TimelineId, TimelineRegistry};
