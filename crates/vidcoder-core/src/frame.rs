//! Frame quantum derived from the loaded video's frame rate.
//!
//! The playback host reports the frame rate once per media file. Every
//! interval computation in the engine snaps to half a frame, so the clock
//! is the single place that turns fps into milliseconds.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Frame duration and half-frame quantum in whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameClock {
    frame_ms: i64,
    half_frame_ms: i64,
}

impl FrameClock {
    /// Default rate assumed when the host has not reported one.
    pub const DEFAULT_FPS: f64 = 25.0;

    /// Build a clock from a frame rate.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidFrameRate`] for non-finite or
    /// non-positive rates, or rates above 1000 fps (sub-millisecond frames).
    pub fn from_fps(fps: f64) -> Result<Self, ModelError> {
        if !fps.is_finite() || fps <= 0.0 || fps > 1000.0 {
            return Err(ModelError::InvalidFrameRate(fps));
        }
        let frame = 1000.0 / fps;
        Ok(Self {
            frame_ms: frame.floor() as i64,
            half_frame_ms: (frame / 2.0).floor() as i64,
        })
    }

    /// Build a clock directly from a half-frame quantum.
    pub fn from_half_frame(half_frame_ms: i64) -> Self {
        let half_frame_ms = half_frame_ms.max(0);
        Self {
            frame_ms: (half_frame_ms * 2).max(1),
            half_frame_ms,
        }
    }

    pub fn frame_ms(&self) -> i64 {
        self.frame_ms
    }

    pub fn half_frame_ms(&self) -> i64 {
        self.half_frame_ms
    }

    /// Map a position onto the centre of the frame that contains it.
    pub fn snap(&self, position: i64) -> i64 {
        if position < 0 {
            return self.half_frame_ms;
        }
        self.frame_ms * position.div_euclid(self.frame_ms) + self.half_frame_ms
    }

    /// Move by a signed number of frames, then snap.
    pub fn step(&self, position: i64, frames: i64) -> i64 {
        self.snap(position + self.frame_ms * frames)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        // 25 fps: 40 ms frames, 20 ms half-frames.
        Self {
            frame_ms: 40,
            half_frame_ms: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_frame_is_floored() {
        assert_eq!(FrameClock::from_fps(25.0).unwrap().half_frame_ms(), 20);
        assert_eq!(FrameClock::from_fps(30.0).unwrap().half_frame_ms(), 16);
        assert_eq!(FrameClock::from_fps(29.97).unwrap().frame_ms(), 33);
        assert_eq!(FrameClock::from_fps(60.0).unwrap().half_frame_ms(), 8);
    }

    #[test]
    fn default_matches_25_fps() {
        assert_eq!(FrameClock::default(), FrameClock::from_fps(FrameClock::DEFAULT_FPS).unwrap());
    }

    #[test]
    fn rejects_bad_rates() {
        assert!(FrameClock::from_fps(0.0).is_err());
        assert!(FrameClock::from_fps(-24.0).is_err());
        assert!(FrameClock::from_fps(f64::NAN).is_err());
        assert!(FrameClock::from_fps(f64::INFINITY).is_err());
    }

    #[test]
    fn snap_lands_on_frame_centres() {
        let clock = FrameClock::from_fps(25.0).unwrap();
        assert_eq!(clock.snap(0), 20);
        assert_eq!(clock.snap(39), 20);
        assert_eq!(clock.snap(40), 60);
        assert_eq!(clock.snap(1013), 1020);
        assert_eq!(clock.snap(-5), 20);
    }

    #[test]
    fn step_moves_whole_frames() {
        let clock = FrameClock::from_fps(25.0).unwrap();
        assert_eq!(clock.step(1020, 1), 1060);
        assert_eq!(clock.step(1020, -10), 620);
        assert_eq!(clock.step(20, -5), 20);
    }
}
