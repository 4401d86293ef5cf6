//! Animatable numeric parameters.
//!
//! Every numeric table parameter (size, counts, border widths, font size,
//! padding, line height, outline width) is an [`Animation`]: a bounded value
//! that may carry several keyframes spread evenly across the item's
//! duration. The host asks for the value at a given [`FrameTime`].

use serde::{Deserialize, Serialize};

/// Timing of the frame being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTime {
    /// Frame index relative to the start of the item.
    pub frame: i32,
    /// Item duration in frames.
    pub length: i32,
    /// Frames per second.
    pub fps: i32,
}

impl FrameTime {
    pub fn new(frame: i32, length: i32, fps: i32) -> Self {
        Self { frame, length, fps }
    }

    /// Position inside the item in 0.0..=1.0.
    pub fn progress(&self) -> f64 {
        if self.length <= 1 {
            return 0.0;
        }
        (f64::from(self.frame) / f64::from(self.length - 1)).clamp(0.0, 1.0)
    }
}

/// Anything that yields a number for a frame.
pub trait Animatable {
    fn value_at(&self, time: &FrameTime) -> f64;
}

impl Animatable for f64 {
    fn value_at(&self, _time: &FrameTime) -> f64 {
        *self
    }
}

/// A bounded, optionally keyframed numeric value.
///
/// One value is a constant. With N values the keyframes are spaced evenly
/// over the item and interpolated linearly. Results are clamped to
/// `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    values: Vec<f64>,
    min: f64,
    max: f64,
}

impl Animation {
    /// Create a constant animation; the value is clamped into range.
    pub fn new(value: f64, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let mut anim = Self {
            values: Vec::new(),
            min,
            max,
        };
        anim.set_value(value);
        anim
    }

    /// Create an animation with several keyframes.
    pub fn keyframes(values: Vec<f64>, min: f64, max: f64) -> Self {
        let mut anim = Self::new(values.first().copied().unwrap_or(min), min, max);
        anim.set_keyframes(values);
        anim
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(min, max)` in ascending order. A NaN bound leaves that side open.
    ///
    /// Deserialized ranges are not checked, so clamping always goes
    /// through here.
    fn bounds(&self) -> (f64, f64) {
        let lo = if self.min.is_nan() { f64::NEG_INFINITY } else { self.min };
        let hi = if self.max.is_nan() { f64::INFINITY } else { self.max };
        if lo <= hi {
            (lo, hi)
        } else {
            (hi, lo)
        }
    }

    /// First keyframe (the static value for non-animated parameters).
    pub fn value(&self) -> f64 {
        self.values.first().copied().unwrap_or(self.min)
    }

    /// Replace all keyframes with a single constant.
    pub fn set_value(&mut self, value: f64) {
        self.values.clear();
        let (min, max) = self.bounds();
        self.values.push(value.clamp(min, max));
    }

    /// Replace the keyframes. An empty list resets to `min`.
    pub fn set_keyframes(&mut self, values: Vec<f64>) {
        let (min, max) = self.bounds();
        self.values = values.into_iter().map(|v| v.clamp(min, max)).collect();
        if self.values.is_empty() {
            self.values.push(if min.is_finite() { min } else { 0.0_f64.clamp(min, max) });
        }
    }

    /// Shift every keyframe by `delta`.
    pub fn add_to_each_value(&mut self, delta: f64) {
        let (min, max) = self.bounds();
        for v in &mut self.values {
            *v = (*v + delta).clamp(min, max);
        }
    }

    pub fn is_animated(&self) -> bool {
        self.values.len() > 1
    }
}

impl Animatable for Animation {
    fn value_at(&self, time: &FrameTime) -> f64 {
        let raw = match self.values.as_slice() {
            [] => self.min,
            [single] => *single,
            values => {
                let segments = values.len() - 1;
                #[allow(clippy::cast_precision_loss)]
                let pos = time.progress() * segments as f64;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let idx = (pos.floor() as usize).min(segments - 1);
                #[allow(clippy::cast_precision_loss)]
                let t = pos - idx as f64;
                let from = values.get(idx).copied().unwrap_or(self.min);
                let to = values.get(idx + 1).copied().unwrap_or(from);
                from + (to - from) * t
            }
        };
        let (min, max) = self.bounds();
        raw.clamp(min, max)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_value() {
        let anim = Animation::new(500.0, 0.0, 10000.0);
        assert_eq!(anim.value_at(&FrameTime::new(0, 100, 60)), 500.0);
        assert_eq!(anim.value_at(&FrameTime::new(99, 100, 60)), 500.0);
        assert!(!anim.is_animated());
    }

    #[test]
    fn test_new_clamps_default() {
        let anim = Animation::new(0.0, 1.0, 100.0);
        assert_eq!(anim.value(), 1.0);
    }

    #[test]
    fn test_linear_interpolation() {
        let anim = Animation::keyframes(vec![0.0, 100.0], 0.0, 1000.0);
        assert_eq!(anim.value_at(&FrameTime::new(0, 11, 30)), 0.0);
        assert_eq!(anim.value_at(&FrameTime::new(5, 11, 30)), 50.0);
        assert_eq!(anim.value_at(&FrameTime::new(10, 11, 30)), 100.0);
        // Past the end holds the last keyframe
        assert_eq!(anim.value_at(&FrameTime::new(20, 11, 30)), 100.0);
    }

    #[test]
    fn test_three_keyframes() {
        let anim = Animation::keyframes(vec![0.0, 10.0, 0.0], 0.0, 100.0);
        assert_eq!(anim.value_at(&FrameTime::new(5, 11, 30)), 10.0);
        assert_eq!(anim.value_at(&FrameTime::new(10, 11, 30)), 0.0);
    }

    #[test]
    fn test_keyframes_are_clamped() {
        let anim = Animation::keyframes(vec![-5.0, 500.0], 0.0, 100.0);
        assert_eq!(anim.values(), &[0.0, 100.0]);
    }

    #[test]
    fn test_add_to_each_value() {
        let mut anim = Animation::keyframes(vec![10.0, 20.0], 0.0, 25.0);
        anim.add_to_each_value(10.0);
        assert_eq!(anim.values(), &[20.0, 25.0]);
    }

    #[test]
    fn test_zero_length_item() {
        let anim = Animation::keyframes(vec![3.0, 9.0], 0.0, 10.0);
        assert_eq!(anim.value_at(&FrameTime::new(0, 0, 30)), 3.0);
    }

    #[test]
    fn test_deserialized_inverted_range_clamps() {
        let mut anim: Animation =
            serde_json::from_str(r#"{"values":[5.0, 20.0],"min":10.0,"max":0.0}"#).unwrap();
        assert_eq!(anim.value_at(&FrameTime::new(0, 11, 30)), 5.0);
        assert_eq!(anim.value_at(&FrameTime::new(10, 11, 30)), 10.0);
        anim.set_value(-3.0);
        assert_eq!(anim.value(), 0.0);
    }

    #[test]
    fn test_deserialized_nan_bound_is_open() {
        let anim = Animation {
            values: vec![5.0, 50.0],
            min: f64::NAN,
            max: 10.0,
        };
        assert_eq!(anim.value_at(&FrameTime::new(0, 2, 30)), 5.0);
        assert_eq!(anim.value_at(&FrameTime::new(1, 2, 30)), 10.0);
    }
}
