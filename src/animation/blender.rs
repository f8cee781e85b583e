//! Crossfade blender.
//!
//! Per-entity state machine `Empty → Playing ⇄ Fading`:
//!
//! - [`Crossfade::start`] while `Playing` fades from the active playback to the
//!   new one.
//! - [`Crossfade::start`] while `Fading` drops the outgoing playback on the
//!   spot, demotes the incoming one to outgoing and restarts the fade. There
//!   is never more than one transition and never more than two playbacks.
//! - A start with nothing to fade from, or with a zero fade, is a hard cut.
//!
//! [`Crossfade::tick`] advances both sides, feeds them into a [`Pose`] with
//! weights `1 - alpha` and `alpha`, and settles on the incoming playback once
//! `alpha` reaches 1.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::animation::action::{PlaybackId, PlaybackState};
use crate::animation::clip::AnimationClip;
use crate::animation::player::ClipPlayer;
use crate::animation::pose::Pose;
use crate::scene::PartKey;

/// Float slack when deciding a fade has run its full length.
const FADE_EPSILON: f32 = 1e-5;

/// An in-progress crossfade between two playbacks.
#[derive(Debug, Clone)]
pub struct Transition {
    outgoing: PlaybackState,
    incoming: PlaybackState,
    elapsed: f32,
    duration: f32,
}

impl Transition {
    #[must_use]
    pub fn outgoing(&self) -> &PlaybackState {
        &self.outgoing
    }

    #[must_use]
    pub fn incoming(&self) -> &PlaybackState {
        &self.incoming
    }

    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Blend factor of the incoming playback, in `[0, 1]`.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let alpha = (self.elapsed / self.duration).clamp(0.0, 1.0);
        if alpha >= 1.0 - FADE_EPSILON { 1.0 } else { alpha }
    }
}

#[derive(Debug, Clone, Default)]
enum BlendState {
    /// Nothing has been played yet (or playback was stopped).
    #[default]
    Empty,
    /// A single playback at full weight.
    Playing(PlaybackState),
    /// A crossfade is running.
    Fading(Transition),
}

/// "Animation finished" signal for one playback.
#[derive(Debug, Clone)]
pub struct Finished {
    pub playback: PlaybackId,
    pub clip: Arc<AnimationClip>,
    /// Distinct parts the finished playback was driving.
    pub parts: SmallVec<[PartKey; 8]>,
}

#[derive(Debug, Clone, Default)]
pub struct Crossfade {
    state: BlendState,
    reported: Option<PlaybackId>,
}

impl Crossfade {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn is_fading(&self) -> bool {
        matches!(self.state, BlendState::Fading(_))
    }

    #[must_use]
    pub fn transition(&self) -> Option<&Transition> {
        match &self.state {
            BlendState::Fading(transition) => Some(transition),
            _ => None,
        }
    }

    /// The playback the entity is heading towards: the sole playback, or the
    /// incoming side of a fade.
    #[must_use]
    pub fn active(&self) -> Option<&PlaybackState> {
        match &self.state {
            BlendState::Empty => None,
            BlendState::Playing(state) => Some(state),
            BlendState::Fading(transition) => Some(&transition.incoming),
        }
    }

    #[must_use]
    pub fn active_clip_name(&self) -> Option<&str> {
        self.active().map(PlaybackState::clip_name)
    }

    /// Whether `id` is still alive on either side of the blend.
    #[must_use]
    pub fn contains(&self, id: PlaybackId) -> bool {
        match &self.state {
            BlendState::Empty => false,
            BlendState::Playing(state) => state.id() == id,
            BlendState::Fading(transition) => {
                transition.outgoing.id() == id || transition.incoming.id() == id
            }
        }
    }

    /// Number of live playbacks, 0 to 2.
    #[must_use]
    pub fn playback_count(&self) -> usize {
        match &self.state {
            BlendState::Empty => 0,
            BlendState::Playing(_) => 1,
            BlendState::Fading(_) => 2,
        }
    }

    /// Starts fading into `incoming` over `fade` seconds.
    pub fn start(&mut self, mut incoming: PlaybackState, fade: f32) {
        let outgoing = match std::mem::take(&mut self.state) {
            BlendState::Empty => None,
            BlendState::Playing(state) => Some(state),
            BlendState::Fading(transition) => {
                log::trace!(
                    "Crossfade: dropping {:?} mid-fade for {:?}",
                    transition.outgoing.clip_name(),
                    incoming.clip_name()
                );
                Some(transition.incoming)
            }
        };

        self.state = match outgoing {
            Some(mut outgoing) if fade > 0.0 => {
                outgoing.weight = 1.0;
                incoming.weight = 0.0;
                BlendState::Fading(Transition {
                    outgoing,
                    incoming,
                    elapsed: 0.0,
                    duration: fade,
                })
            }
            _ => {
                incoming.weight = 1.0;
                BlendState::Playing(incoming)
            }
        };
    }

    /// Replaces everything with `state` at full weight, no fade.
    pub fn cut(&mut self, state: PlaybackState) {
        self.start(state, 0.0);
    }

    /// Drops every playback.
    pub fn stop(&mut self) {
        self.state = BlendState::Empty;
    }

    /// Advances the blend by `dt`, accumulating sampled values into `pose`.
    ///
    /// Returns the finished signal of a `Once` playback the first frame it is
    /// both completed and the only live playback.
    pub fn tick(&mut self, dt: f32, pose: &mut Pose) -> Option<Finished> {
        let fade_done = match &mut self.state {
            BlendState::Empty => return None,
            BlendState::Playing(state) => {
                state.weight = 1.0;
                ClipPlayer::advance(state, dt);
                ClipPlayer::apply(state, 1.0, pose);
                false
            }
            BlendState::Fading(transition) => {
                transition.elapsed += dt;
                let alpha = transition.alpha();

                transition.outgoing.weight = 1.0 - alpha;
                transition.incoming.weight = alpha;

                ClipPlayer::advance(&mut transition.outgoing, dt);
                ClipPlayer::advance(&mut transition.incoming, dt);
                ClipPlayer::apply(&transition.outgoing, transition.outgoing.weight, pose);
                ClipPlayer::apply(&transition.incoming, transition.incoming.weight, pose);

                alpha >= 1.0
            }
        };

        if fade_done {
            self.settle();
        }

        self.poll_finished()
    }

    fn settle(&mut self) {
        if let BlendState::Fading(transition) = std::mem::take(&mut self.state) {
            let mut incoming = transition.incoming;
            incoming.weight = 1.0;
            log::trace!("Crossfade: settled on {:?}", incoming.clip_name());
            self.state = BlendState::Playing(incoming);
        }
    }

    fn poll_finished(&mut self) -> Option<Finished> {
        let BlendState::Playing(state) = &self.state else {
            return None;
        };
        if !state.is_completed() || self.reported == Some(state.id()) {
            return None;
        }

        self.reported = Some(state.id());

        let mut parts: SmallVec<[PartKey; 8]> = SmallVec::new();
        for binding in state.bindings() {
            if !parts.contains(&binding.part) {
                parts.push(binding.part);
            }
        }

        Some(Finished {
            playback: state.id(),
            clip: Arc::clone(state.clip()),
            parts,
        })
    }
}
