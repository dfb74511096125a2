//! Core error types for vidcoder-core.
//!
//! This module defines the error hierarchy using thiserror. Outcomes the
//! engine treats as normal (a blocked creation, a skipped CSV row, a merge
//! with no neighbor) are not errors and never show up here.

use std::path::PathBuf;
use thiserror::Error;

use crate::timeline::{AnnotationId, EventId, TimelineId};

/// Core error type for vidcoder-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Project configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CSV import/export errors
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Timeline/annotation model errors
    #[error("{0}")]
    Model(#[from] ModelError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Refused to overwrite an existing project
    #[error("A project already exists at {0}")]
    AlreadyExists(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// CSV-specific errors.
#[derive(Error, Debug)]
pub enum CsvError {
    /// The input has no header row
    #[error("CSV input is empty")]
    Empty,

    /// A required column is absent from the header row
    #[error("CSV header is missing the '{0}' column")]
    MissingColumn(&'static str),

    /// A time column does not hold an integer
    #[error("Line {line}: '{value}' in column '{column}' is not an integer")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// Errors raised when the caller addresses something that does not exist or
/// drives the annotation controller out of order.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown timeline {0:?}")]
    UnknownTimeline(TimelineId),

    #[error("No timeline named '{0}'")]
    UnknownTimelineName(String),

    #[error("Unknown annotation {annotation:?} on timeline {timeline:?}")]
    UnknownAnnotation {
        timeline: TimelineId,
        annotation: AnnotationId,
    },

    #[error("Unknown event {event:?} on timeline {timeline:?}")]
    UnknownEvent { timeline: TimelineId, event: EventId },

    #[error("A timeline named '{0}' already exists")]
    DuplicateTimeline(String),

    #[error("Timeline '{timeline}' already has an event named '{event}'")]
    DuplicateEvent { timeline: String, event: String },

    #[error("Event '{event}' is still used by {count} annotation(s)")]
    EventInUse { event: String, count: usize },

    #[error("No timeline selected")]
    NoTimelineSelected,

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f64),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
