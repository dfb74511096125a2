//! Interval placement: where a new annotation may start and how far its
//! endpoints may travel.
//!
//! Everything here is a pure function of a timeline's finalized annotations
//! (sorted by start time, non-overlapping) and a query time. Bounds keep one
//! half-frame of slack from each neighbor because the live endpoint sits
//! half a frame beyond the playback position.

use serde::{Deserialize, Serialize};

use crate::timeline::{Annotation, AnnotationId};

/// Elastic limits for a playback position. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
}

impl Bounds {
    pub const UNBOUNDED: Bounds = Bounds {
        lower: None,
        upper: None,
    };

    pub fn new(lower: Option<i64>, upper: Option<i64>) -> Self {
        Self { lower, upper }
    }

    pub fn clamp(&self, time: i64) -> i64 {
        clamp(time, self.lower, self.upper)
    }

    /// Clamp and report whether the upper bound was hit.
    pub fn clamp_reporting_upper(&self, time: i64) -> (i64, bool) {
        let bounded = self.clamp(time);
        let hit_upper = matches!(self.upper, Some(u) if time > u && bounded == u);
        (bounded, hit_upper)
    }

    pub fn contains(&self, time: i64) -> bool {
        self.lower.map_or(true, |l| time >= l) && self.upper.map_or(true, |u| time <= u)
    }
}

/// Outcome of asking whether an annotation may start at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Placement {
    /// The time falls inside this existing annotation.
    Blocked { annotation: AnnotationId },
    /// Free space; a new interval must stay within the bounds.
    Clear { bounds: Bounds },
}

impl Placement {
    pub fn is_clear(&self) -> bool {
        matches!(self, Placement::Clear { .. })
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Placement::Clear { bounds } => Some(*bounds),
            Placement::Blocked { .. } => None,
        }
    }

    pub fn blocking(&self) -> Option<AnnotationId> {
        match self {
            Placement::Blocked { annotation } => Some(*annotation),
            Placement::Clear { .. } => None,
        }
    }
}

/// Decide whether a new annotation can be initiated at `value`.
///
/// Blocked if some annotation's closed interval contains `value`. Otherwise
/// the lower bound is the latest end before `value` plus a half-frame and the
/// upper bound is the earliest start after `value` minus a half-frame.
pub fn can_initiate(annotations: &[Annotation], value: i64, half_frame_ms: i64) -> Placement {
    let mut lower: Option<i64> = None;
    let mut upper: Option<i64> = None;

    for a in annotations {
        if a.start_time <= value && value <= a.end_time {
            return Placement::Blocked { annotation: a.id };
        }
        if a.end_time < value {
            let candidate = a.end_time + half_frame_ms;
            lower = Some(lower.map_or(candidate, |l| l.max(candidate)));
        }
        if a.start_time > value {
            let candidate = a.start_time - half_frame_ms;
            upper = Some(upper.map_or(candidate, |u| u.min(candidate)));
        }
    }

    Placement::Clear {
        bounds: Bounds { lower, upper },
    }
}

/// Bounds for moving the endpoints of an existing annotation, found from its
/// neighbors with the annotation itself left out of the scan. A neighbor that
/// touches the annotation still bounds it.
pub fn neighbor_bounds(
    annotations: &[Annotation],
    exclude: AnnotationId,
    start_time: i64,
    end_time: i64,
    half_frame_ms: i64,
) -> Bounds {
    let others = || annotations.iter().filter(move |a| a.id != exclude);
    let lower = others()
        .filter(|a| a.end_time <= start_time)
        .map(|a| a.end_time)
        .max()
        .map(|end| end + half_frame_ms);
    let upper = others()
        .filter(|a| a.start_time >= end_time)
        .map(|a| a.start_time)
        .min()
        .map(|start| start - half_frame_ms);
    Bounds { lower, upper }
}

/// Clamp `time` into `[lower, upper]`, either side optional. If the bounds
/// cross, the lower bound wins.
pub fn clamp(time: i64, lower: Option<i64>, upper: Option<i64>) -> i64 {
    match (lower, upper) {
        (Some(l), _) if time < l => l,
        (_, Some(u)) if time > u => u,
        _ => time,
    }
}
