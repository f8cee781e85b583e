use std::sync::Arc;

use crate::animation::binder::Binder;
use crate::animation::binding::PropertyBinding;
use crate::animation::clip::{AnimationClip, LoopPolicy};
use crate::animation::values::TrackValue;
use crate::scene::Rig;

/// Relative float slack when deciding a `Once` playback has reached its end.
const END_TOLERANCE: f32 = 1e-5;

/// Identity of one playback instance, unique per entity context.
///
/// Completion signals carry it so a listener can tell whether the playback it
/// registered for is the one that finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackId(u64);

impl PlaybackId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Instance-level playback settings layered over a clip's authored defaults.
///
/// Lets one shared clip play two ways (e.g. `"Run"` as a looping gait and as
/// an accelerated one-shot lunge) without touching the clip itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackOverrides {
    pub time_scale: Option<f32>,
    pub loop_policy: Option<LoopPolicy>,
}

impl PlaybackOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = Some(time_scale);
        self
    }

    #[must_use]
    pub fn with_loop_policy(mut self, loop_policy: LoopPolicy) -> Self {
        self.loop_policy = Some(loop_policy);
        self
    }
}

/// Result of advancing a playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Advance {
    /// True only on the call where a `Once` playback reached its end.
    pub completed: bool,
}

/// One live instance of a clip on one entity.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    id: PlaybackId,
    clip: Arc<AnimationClip>,

    pub local_time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_policy: LoopPolicy,

    completed: bool,
    bindings: Vec<PropertyBinding>,
}

impl PlaybackState {
    /// Creates a playback at `local_time = 0`, bound against `rig`.
    ///
    /// A non-positive or non-finite time scale override falls back to 1.
    #[must_use]
    pub fn new(
        id: PlaybackId,
        clip: Arc<AnimationClip>,
        overrides: PlaybackOverrides,
        rig: &Rig,
    ) -> Self {
        let time_scale = match overrides.time_scale {
            Some(scale) if scale.is_finite() && scale > 0.0 => scale,
            Some(scale) => {
                log::warn!("Ignoring time scale {scale} for clip {:?}", clip.name);
                1.0
            }
            None => 1.0,
        };
        let loop_policy = overrides.loop_policy.unwrap_or(clip.loop_policy);
        let bindings = Binder::bind(rig, &clip);

        Self {
            id,
            clip,
            local_time: 0.0,
            time_scale,
            weight: 1.0,
            loop_policy,
            completed: false,
            bindings,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> PlaybackId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[inline]
    #[must_use]
    pub fn clip_name(&self) -> &str {
        &self.clip.name
    }

    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }

    /// Whether a `Once` playback has reached its end. Sticky.
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// True when neither time scale nor loop policy differ from the clip's
    /// authored defaults.
    #[must_use]
    pub fn plays_as_authored(&self) -> bool {
        (self.time_scale - 1.0).abs() <= f32::EPSILON && self.loop_policy == self.clip.loop_policy
    }

    /// Core logic: advance time.
    pub fn advance(&mut self, dt: f32) -> Advance {
        let duration = self.clip.duration;

        // Zero-length clips sit at t = 0; a one-shot finishes immediately.
        if !duration.is_finite() || duration <= 0.0 {
            self.local_time = 0.0;
            return match self.loop_policy {
                LoopPolicy::Once => self.mark_completed(),
                LoopPolicy::Repeat => Advance::default(),
            };
        }

        self.local_time += dt * self.time_scale;

        match self.loop_policy {
            LoopPolicy::Once => {
                if self.local_time >= duration * (1.0 - END_TOLERANCE) {
                    self.local_time = duration;
                    return self.mark_completed();
                }
                if self.local_time < 0.0 {
                    self.local_time = 0.0;
                }
            }
            LoopPolicy::Repeat => {
                self.local_time = self.local_time.rem_euclid(duration);
                // rem_euclid can round up to `duration` for tiny negatives
                if self.local_time >= duration {
                    self.local_time = 0.0;
                }
            }
        }

        Advance::default()
    }

    fn mark_completed(&mut self) -> Advance {
        let first = !self.completed;
        self.completed = true;
        Advance { completed: first }
    }

    /// Gets the value of the specified track at the current local time.
    #[must_use]
    pub fn sample_track(&self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        track.data.sample(self.local_time)
    }
}
