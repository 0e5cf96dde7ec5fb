//! Keyframed property curves
//!
//! Every animatable particle property (color, opacity, size, rotation,
//! frame, blur time) is driven by a [`KeyframeCurve`]: a start value, an
//! ordered list of timed keyframes, and a per-particle random offset. Curves
//! are built once when an emitter definition is loaded and are immutable
//! afterwards, except for wholesale replacement through [`KeyframeCurve::replace`]
//! (runtime VFX parameter overrides).

use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// One timed keyframe on a property curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// Time of this keyframe in milliseconds since particle spawn
    pub time_ms: u32,
    /// Property value at that time
    pub value: T,
}

/// Sampled property curve: start value + keyframed deltas + random jitter
///
/// There is an implicit keyframe at time 0 holding the start value, so a
/// curve with no explicit keyframes is a constant function. Keyframe times
/// must be non-decreasing; enforcing that is the definition loader's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeCurve<T> {
    start: T,
    random: T,
    keyframes: Vec<Keyframe<T>>,
}

impl<T> KeyframeCurve<T>
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    /// Create a curve from its start value, jitter amplitude and keyframes
    pub fn new(start: T, random: T, keyframes: Vec<Keyframe<T>>) -> Self {
        Self {
            start,
            random,
            keyframes,
        }
    }

    /// Create a constant curve with no jitter
    pub fn constant(value: T) -> Self {
        Self {
            start: value,
            random: value * 0.0,
            keyframes: Vec::new(),
        }
    }

    /// The value at time 0
    pub fn start(&self) -> T {
        self.start
    }

    /// The jitter amplitude added by [`Self::sample_with_random`]
    pub fn random(&self) -> T {
        self.random
    }

    /// Sample the curve at a particle age in milliseconds
    ///
    /// Linearly interpolates between the keyframe pair bracketing `time_ms`
    /// and holds the last keyframe's value past the end of the curve. Pure:
    /// repeated calls with the same age yield identical results.
    pub fn sample(&self, time_ms: u32) -> T {
        if time_ms == 0 || self.keyframes.is_empty() {
            return self.start;
        }

        let mut prev_time = 0u32;
        let mut prev_value = self.start;

        for key in &self.keyframes {
            if time_ms <= key.time_ms {
                let span = key.time_ms - prev_time;
                if span == 0 {
                    return key.value;
                }
                let t = (time_ms - prev_time) as f32 / span as f32;
                return lerp(prev_value, key.value, t);
            }
            prev_time = key.time_ms;
            prev_value = key.value;
        }

        prev_value
    }

    /// Sample the curve plus the particle's fixed jitter offset
    ///
    /// `draw` is drawn once at spawn time (uniform in `[0, 1)`) and held for
    /// the particle's whole lifetime, so the jitter is a constant offset per
    /// particle, not per-frame noise.
    pub fn sample_with_random(&self, time_ms: u32, draw: f32) -> T {
        self.sample(time_ms) + self.random * draw
    }

    /// Replace the entire curve, keeping live particles on the new shape
    pub fn replace(&mut self, other: Self) {
        *self = other;
    }
}

fn lerp<T>(a: T, b: T, t: f32) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    a * (1.0 - t) + b * t
}
