use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
}

/// A single authored sample: `value` at `time` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    #[must_use]
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Keyframes of one property, stored as parallel time/value arrays.
///
/// Times are expected in ascending order. Duplicates and out-of-order keys are
/// tolerated: an interval that does not move forward in time collapses to its
/// right-hand key instead of dividing by zero.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(mut times: Vec<f32>, mut values: Vec<T>, interpolation: InterpolationMode) -> Self {
        if times.len() != values.len() {
            log::warn!(
                "Keyframe track has {} times but {} values, truncating",
                times.len(),
                values.len()
            );
            let len = times.len().min(values.len());
            times.truncate(len);
            values.truncate(len);
        }

        Self {
            times,
            values,
            interpolation,
        }
    }

    #[must_use]
    pub fn from_keyframes(
        keyframes: impl IntoIterator<Item = Keyframe<T>>,
        interpolation: InterpolationMode,
    ) -> Self {
        let (times, values) = keyframes.into_iter().map(|k| (k.time, k.value)).unzip();
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last keyframe, `None` for an empty track.
    #[must_use]
    pub fn end_time(&self) -> Option<f32> {
        self.times.last().copied()
    }

    /// Samples the track at `time`.
    ///
    /// Before the first key the first value is returned, after the last key
    /// the last value is held. Returns `None` only for an empty track.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        // First index whose time is strictly greater than `time`
        let next_idx = self.times.partition_point(|&t| t <= time);

        if next_idx == 0 {
            return Some(self.values[0]);
        }

        let prev_idx = next_idx - 1;
        if next_idx >= self.len() {
            return Some(self.values[prev_idx]);
        }

        let v0 = self.values[prev_idx];
        let v1 = self.values[next_idx];

        match self.interpolation {
            InterpolationMode::Step => Some(v0),
            InterpolationMode::Linear => {
                let t0 = self.times[prev_idx];
                let t1 = self.times[next_idx];
                let dt = t1 - t0;

                let t = if dt > 0.0 {
                    ((time - t0) / dt).clamp(0.0, 1.0)
                } else {
                    1.0
                };

                Some(T::interpolate_linear(v0, v1, t))
            }
        }
    }
}
