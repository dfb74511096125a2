//! The annotation being drawn.
//!
//! One endpoint (the anchor) is fixed when drawing starts; the other
//! follows the playback position. When the position crosses the anchor the
//! two swap roles. The state is kept as `{anchor, anchor_is_start, free}`
//! and only collapsed into `(start, end)` when read, so the flip rule is a
//! single function of the previous state and the new position.

use serde::{Deserialize, Serialize};

use crate::placement::Bounds;
use crate::timeline::TimelineId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    timeline: TimelineId,
    /// Playback position at which drawing started.
    origin: i64,
    anchor_time: i64,
    anchor_is_start: bool,
    free_time: i64,
    bounds: Bounds,
    half_frame_ms: i64,
}

impl Draft {
    /// Start a draft one frame wide, centred on `origin`. Endpoints are kept
    /// off the neighboring annotations that produced `bounds`.
    pub(crate) fn new(timeline: TimelineId, origin: i64, bounds: Bounds, half_frame_ms: i64) -> Self {
        let mut draft = Self {
            timeline,
            origin,
            anchor_time: origin - half_frame_ms,
            anchor_is_start: true,
            free_time: origin + half_frame_ms,
            bounds,
            half_frame_ms,
        };
        draft.anchor_time = draft.keep_after_previous(draft.anchor_time);
        draft.free_time = draft.keep_before_next(draft.free_time);
        draft
    }

    pub fn timeline(&self) -> TimelineId {
        self.timeline
    }

    pub fn origin(&self) -> i64 {
        self.origin
    }

    pub fn anchor_time(&self) -> i64 {
        self.anchor_time
    }

    pub fn anchor_is_start(&self) -> bool {
        self.anchor_is_start
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn start_time(&self) -> i64 {
        if self.anchor_is_start {
            self.anchor_time
        } else {
            self.free_time
        }
    }

    pub fn end_time(&self) -> i64 {
        if self.anchor_is_start {
            self.free_time
        } else {
            self.anchor_time
        }
    }

    /// Follow an already clamped playback position. Returns true if the
    /// endpoints flipped.
    ///
    /// While the position stays on the free side of the anchor the free
    /// endpoint sits half a frame beyond it. Crossing the anchor moves the
    /// anchor to the other side and opens the interval by one half-frame.
    pub(crate) fn track(&mut self, bounded: i64) -> bool {
        let h = self.half_frame_ms;
        if self.anchor_is_start {
            if bounded >= self.anchor_time {
                self.free_time = self.keep_before_next(bounded + h);
                false
            } else {
                self.anchor_is_start = false;
                self.free_time = self.keep_after_previous(self.anchor_time - h);
                true
            }
        } else if bounded <= self.anchor_time {
            self.free_time = self.keep_after_previous(bounded - h);
            false
        } else {
            self.anchor_is_start = true;
            self.free_time = self.keep_before_next(self.anchor_time + h);
            true
        }
    }

    /// End of the previous annotation, recovered from the lower bound.
    fn keep_after_previous(&self, time: i64) -> i64 {
        match self.bounds.lower {
            Some(lower) => time.max(lower - self.half_frame_ms),
            None => time,
        }
    }

    /// Start of the next annotation, recovered from the upper bound.
    fn keep_before_next(&self, time: i64) -> i64 {
        match self.bounds.upper {
            Some(upper) => time.min(upper + self.half_frame_ms),
            None => time,
        }
    }
}
