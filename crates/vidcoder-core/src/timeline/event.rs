//! Event labels.

use serde::{Deserialize, Serialize};

use super::EventId;
use crate::color::Rgba;

/// A named, colored label that annotations of one timeline can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub color: Rgba,
}

impl Event {
    pub fn new(id: EventId, name: impl Into<String>, color: Rgba) -> Self {
        Self {
            id,
            name: name.into(),
            color,
        }
    }
}
