//! Per-frame display time.
//!
//! `DurationPolicy` covers the two built-in strategies. Anything else can
//! implement `FramePacing` and be handed to `Converter` directly.
use std::time::Duration;

pub trait FramePacing {
    /// Display time applied to every frame of a set holding `frame_count` frames.
    fn frame_duration(&self, frame_count: usize) -> Duration;
}

impl<F> FramePacing for F
where
    F: Fn(usize) -> Duration,
{
    fn frame_duration(&self, frame_count: usize) -> Duration {
        self(frame_count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationPolicy {
    Fixed(Duration),
    Adaptive(AdaptiveCurve),
}

impl DurationPolicy {
    pub const DEFAULT_FIXED: Duration = Duration::from_millis(100);

    pub fn fixed_ms(millis: u64) -> Self {
        Self::Fixed(Duration::from_millis(millis))
    }

    pub fn adaptive() -> Self {
        Self::Adaptive(AdaptiveCurve::default())
    }
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self::Fixed(Self::DEFAULT_FIXED)
    }
}

impl FramePacing for DurationPolicy {
    fn frame_duration(&self, frame_count: usize) -> Duration {
        match self {
            Self::Fixed(duration) => *duration,
            Self::Adaptive(curve) => curve.frame_duration(frame_count),
        }
    }
}

/// Saturating curve that shortens frames as the set grows:
/// `floor + (ceiling - floor) * (1 - tanh(rate * n))`.
///
/// Starts at `ceiling` for an empty set and approaches `floor` from above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveCurve {
    pub ceiling_ms: f64,
    pub floor_ms: f64,
    pub rate: f64,
}

impl AdaptiveCurve {
    /// Per-frame steepness giving ~100 ms for a handful of frames and ~50 ms
    /// by a thousand.
    pub const DEFAULT_RATE: f64 = 0.003;

    pub fn with_rate(rate: f64) -> Self {
        Self {
            rate,
            ..Self::default()
        }
    }

    pub fn millis(&self, frame_count: usize) -> f64 {
        let span = (self.ceiling_ms - self.floor_ms).max(0.0);
        let x = (self.rate * frame_count as f64).max(0.0);
        let ms = self.floor_ms + span * (1.0 - x.tanh());
        if ms.is_finite() {
            ms.max(0.0)
        } else {
            self.floor_ms.max(0.0)
        }
    }
}

impl Default for AdaptiveCurve {
    fn default() -> Self {
        Self {
            ceiling_ms: 100.0,
            floor_ms: 50.0,
            rate: Self::DEFAULT_RATE,
        }
    }
}

impl FramePacing for AdaptiveCurve {
    fn frame_duration(&self, frame_count: usize) -> Duration {
        Duration::from_secs_f64(self.millis(frame_count) / 1000.0)
    }
}
