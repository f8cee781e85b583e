use glam::Vec3;

use crate::animation::action::PlaybackId;
use crate::animation::clip::ClipSet;
use crate::animation::context::{EntityAnimationContext, TransitionRequest};
use crate::config::EngineConfig;
use crate::scene::Rig;

/// Locomotion state controller for NPCs.
///
/// Priority, highest first:
/// 1. interrupt-locked: leave the current clip alone
/// 2. squared speed above the threshold: run clip
/// 3. idle clip
#[derive(Debug, Clone)]
pub struct StateController {
    run_clip: String,
    idle_clip: String,
    run_speed_threshold_sq: f32,
    fade_duration: f32,
}

impl StateController {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            run_clip: config.run_clip.clone(),
            idle_clip: config.idle_clip.clone(),
            run_speed_threshold_sq: config.run_speed_threshold_sq,
            fade_duration: config.fade_duration,
        }
    }

    /// Clip the entity should be playing, `None` while it is locked.
    #[must_use]
    pub fn desired_clip(&self, ctx: &EntityAnimationContext, velocity: Vec3) -> Option<&str> {
        if ctx.is_interrupt_locked() {
            return None;
        }
        if velocity.length_squared() > self.run_speed_threshold_sq {
            Some(self.run_clip.as_str())
        } else {
            Some(self.idle_clip.as_str())
        }
    }

    /// Starts a transition when the desired clip differs from what is active.
    ///
    /// The active playback only counts as the desired clip when it plays with
    /// the clip's authored settings; a finished one-shot reuse of the same
    /// clip is replaced. An entity with nothing playing is cut over without a
    /// fade.
    pub fn update(
        &self,
        ctx: &mut EntityAnimationContext,
        clips: &ClipSet,
        rig: &Rig,
        velocity: Vec3,
    ) -> Option<PlaybackId> {
        let desired = self.desired_clip(ctx, velocity)?;

        let fade = match ctx.active() {
            Some(active) if active.clip_name() == desired && active.plays_as_authored() => {
                return None;
            }
            Some(_) => self.fade_duration,
            None => 0.0,
        };

        let Some(clip) = clips.get(desired) else {
            log::debug!("Controller: clip {desired:?} missing from clip set");
            return None;
        };

        log::trace!(
            "Controller: {:?} -> {desired:?} (fade {fade}s)",
            ctx.active_clip_name()
        );
        ctx.start_transition(TransitionRequest::new(clip.clone(), fade), rig)
    }
}
