use crate::animation::action::{Advance, PlaybackState};
use crate::animation::pose::Pose;

/// Clip player.
///
/// Advances playbacks and feeds their sampled tracks into a [`Pose`].
pub struct ClipPlayer;

impl ClipPlayer {
    #[inline]
    pub fn advance(state: &mut PlaybackState, dt: f32) -> Advance {
        state.advance(dt)
    }

    /// Samples every bound track of `state` at its local time and accumulates
    /// `weight * value` into `pose`.
    ///
    /// Tracks that failed to bind were dropped by the binder; empty tracks
    /// sample to nothing and are skipped here.
    pub fn apply(state: &PlaybackState, weight: f32, pose: &mut Pose) {
        if weight <= 0.0 {
            return;
        }

        for binding in state.bindings() {
            if let Some(value) = state.sample_track(binding.track_index) {
                pose.accumulate(binding.part, binding.target, value, weight);
            }
        }
    }
}
