use std::sync::Arc;

use smallvec::SmallVec;

use crate::animation::action::{PlaybackId, PlaybackOverrides, PlaybackState};
use crate::animation::blender::{Crossfade, Finished};
use crate::animation::clip::AnimationClip;
use crate::animation::pose::Pose;
use crate::scene::Rig;

/// A request to switch an entity to another clip.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub clip: Arc<AnimationClip>,
    /// Fade length in seconds; `0` is a hard cut.
    pub fade: f32,
    pub overrides: PlaybackOverrides,
    /// A locking request may replace an interrupt-locked clip and locks the
    /// entity until the new playback finishes.
    pub locking: bool,
}

impl TransitionRequest {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>, fade: f32) -> Self {
        Self {
            clip,
            fade,
            overrides: PlaybackOverrides::default(),
            locking: false,
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: PlaybackOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub fn locking(mut self) -> Self {
        self.locking = true;
        self
    }
}

/// What to do when a specific playback finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    /// Clear the interrupt lock held by the playback.
    ReleaseLock,
    /// Stop playing and put the parts the playback drove back to rest pose.
    ResetToRest,
}

/// Single-use listener bound to one playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionListener {
    pub playback: PlaybackId,
    pub action: CompletionAction,
}

/// Everything the engine keeps per animated entity.
#[derive(Debug, Clone, Default)]
pub struct EntityAnimationContext {
    crossfade: Crossfade,
    interrupt_lock: Option<PlaybackId>,
    listeners: SmallVec<[CompletionListener; 2]>,
    next_playback: u64,
}

impl EntityAnimationContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn crossfade(&self) -> &Crossfade {
        &self.crossfade
    }

    #[inline]
    #[must_use]
    pub fn is_interrupt_locked(&self) -> bool {
        self.interrupt_lock.is_some()
    }

    #[must_use]
    pub fn active(&self) -> Option<&PlaybackState> {
        self.crossfade.active()
    }

    #[must_use]
    pub fn active_clip_name(&self) -> Option<&str> {
        self.crossfade.active_clip_name()
    }

    #[must_use]
    pub fn listeners(&self) -> &[CompletionListener] {
        &self.listeners
    }

    fn allocate_id(&mut self) -> PlaybackId {
        self.next_playback += 1;
        PlaybackId::new(self.next_playback)
    }

    /// Starts a crossfade into `request.clip`.
    ///
    /// Dropped (returns `None`) when the entity is interrupt-locked and the
    /// request is not a locking one. A locking request takes over the lock.
    pub fn start_transition(&mut self, request: TransitionRequest, rig: &Rig) -> Option<PlaybackId> {
        if self.is_interrupt_locked() && !request.locking {
            log::debug!(
                "Transition to {:?} dropped: entity is interrupt-locked",
                request.clip.name
            );
            return None;
        }

        let id = self.allocate_id();
        let incoming = PlaybackState::new(id, request.clip, request.overrides, rig);
        self.crossfade.start(incoming, request.fade);

        if request.locking {
            self.interrupt_lock = Some(id);
        }
        self.prune();

        Some(id)
    }

    /// Registers a single-use listener for `playback`.
    ///
    /// Ignored if the playback is no longer alive.
    pub fn on_complete(&mut self, playback: PlaybackId, action: CompletionAction) {
        if !self.crossfade.contains(playback) {
            log::trace!("Listener for stale playback {playback:?} ignored");
            return;
        }
        self.listeners.push(CompletionListener { playback, action });
    }

    pub fn release_lock(&mut self) -> bool {
        self.listeners.retain(|l| l.action != CompletionAction::ReleaseLock);
        self.interrupt_lock.take().is_some()
    }

    /// Drops every playback, listener and lock.
    pub fn stop(&mut self) {
        self.crossfade.stop();
        self.listeners.clear();
        self.interrupt_lock = None;
    }

    /// Advances the blend; see [`Crossfade::tick`].
    pub fn tick(&mut self, dt: f32, pose: &mut Pose) -> Option<Finished> {
        let finished = self.crossfade.tick(dt, pose);
        self.prune();
        finished
    }

    /// Runs and removes the listeners registered for `finished.playback`.
    ///
    /// Call after the frame's pose is committed so a rest-pose reset is not
    /// overwritten. Calling twice, or for a playback nobody listens to, does
    /// nothing. Returns the number of listeners fired.
    pub fn dispatch_completion(&mut self, finished: &Finished, rig: &mut Rig) -> usize {
        let mut fired: SmallVec<[CompletionAction; 2]> = SmallVec::new();
        self.listeners.retain(|l| {
            if l.playback == finished.playback {
                fired.push(l.action);
                false
            } else {
                true
            }
        });

        for action in &fired {
            match action {
                CompletionAction::ReleaseLock => {
                    if self.interrupt_lock == Some(finished.playback) {
                        self.interrupt_lock = None;
                        log::debug!("Interrupt lock released after {:?}", finished.clip.name);
                    }
                }
                CompletionAction::ResetToRest => {
                    if self.crossfade.contains(finished.playback) {
                        self.crossfade.stop();
                    }
                    rig.reset_to_rest(finished.parts.iter().copied());
                }
            }
        }

        fired.len()
    }

    /// Forgets listeners and locks whose playback no longer exists, so a
    /// superseded playback can never fire or keep the entity locked.
    fn prune(&mut self) {
        let crossfade = &self.crossfade;
        self.listeners.retain(|l| crossfade.contains(l.playback));
        if self.interrupt_lock.is_some_and(|lock| !crossfade.contains(lock)) {
            self.interrupt_lock = None;
        }
    }
}
