//! Animation event gateway.
//!
//! Subscribes to the world bus once, when the engine is built, and turns the
//! two animation-related world events into playback requests:
//!
//! - `AnimationTriggered { entity, clip }`: generic entities cut straight to
//!   the clip (no crossfade, no priority ladder) and return the parts it
//!   drove to rest pose once it finishes.
//! - `NpcMeleeAttack { body }`: the NPC owning the body lunges, i.e. plays
//!   the run clip once at an accelerated rate while interrupt-locked.
//!
//! [`EventGateway::dispose`] hands the subscriptions back to the bus.

use std::sync::Arc;

use crate::animation::action::{PlaybackId, PlaybackOverrides};
use crate::animation::clip::{AnimationClip, LoopPolicy};
use crate::animation::context::{CompletionAction, TransitionRequest};
use crate::config::EngineConfig;
use crate::engine::{AnimatedEntity, EntityKind};
use crate::world::{EventBus, EventKind, Subscription, SubscriptionKey, WorldEvent};

#[derive(Debug)]
pub struct EventGateway {
    events: Subscription,
}

impl EventGateway {
    /// Subscribes to both event kinds on a single channel. Call once per
    /// engine lifetime.
    pub fn new(bus: &mut EventBus) -> Self {
        Self {
            events: bus.subscribe_to(&[EventKind::AnimationTriggered, EventKind::NpcMeleeAttack]),
        }
    }

    #[must_use]
    pub fn subscription_key(&self) -> SubscriptionKey {
        self.events.key()
    }

    /// Takes every event delivered since the last call, in publish order.
    #[must_use]
    pub fn pending(&self) -> Vec<WorldEvent> {
        self.events.drain().collect()
    }

    /// Unsubscribes from the bus.
    pub fn dispose(self, bus: &mut EventBus) {
        bus.unsubscribe(self.subscription_key());
    }

    /// Handles `AnimationTriggered` for one entity.
    ///
    /// Only generic entities take triggered clips; NPCs are driven by the
    /// locomotion controller. A missing clip is a no-op.
    ///
    /// The clip plays with its authored loop policy. Clips built with
    /// [`AnimationClip::new`] default to [`LoopPolicy::Repeat`], which never
    /// finishes and so never returns the parts to rest; author one-shot
    /// triggers with `.with_loop_policy(LoopPolicy::Once)`.
    pub fn trigger(entity: &mut AnimatedEntity, clip_name: &str, config: &EngineConfig) -> Option<PlaybackId> {
        if entity.kind != EntityKind::Generic {
            log::debug!("Trigger {clip_name:?} ignored: not a generic entity");
            return None;
        }
        if config.lock_generic_triggers && entity.context.is_interrupt_locked() {
            log::debug!("Trigger {clip_name:?} dropped: previous trigger still playing");
            return None;
        }
        let Some(clip) = entity.clips.get(clip_name).cloned() else {
            log::debug!("Trigger {clip_name:?} ignored: no such clip");
            return None;
        };

        play_triggered(entity, clip, config.lock_generic_triggers)
    }

    /// Handles `NpcMeleeAttack` for the NPC that owns the attacking body.
    ///
    /// Does nothing while the NPC is already interrupt-locked, so an attack in
    /// progress is never restarted.
    pub fn melee_attack(npc: &mut AnimatedEntity, config: &EngineConfig) -> Option<PlaybackId> {
        if npc.kind != EntityKind::Npc {
            log::debug!("Melee attack ignored: not an NPC");
            return None;
        }
        if npc.context.is_interrupt_locked() {
            log::debug!("Melee attack ignored: NPC already locked");
            return None;
        }
        let Some(clip) = npc.clips.get(&config.run_clip).cloned() else {
            log::debug!("Melee attack ignored: no {:?} clip", config.run_clip);
            return None;
        };

        let overrides = PlaybackOverrides::new()
            .with_time_scale(config.lunge_time_scale)
            .with_loop_policy(LoopPolicy::Once);
        let request = TransitionRequest::new(clip, config.lunge_fade_duration)
            .with_overrides(overrides)
            .locking();

        let id = npc.context.start_transition(request, &npc.rig)?;
        npc.context.on_complete(id, CompletionAction::ReleaseLock);
        Some(id)
    }
}

/// Cuts a generic entity over to `clip` and arranges the rest-pose reset.
pub(crate) fn play_triggered(
    entity: &mut AnimatedEntity,
    clip: Arc<AnimationClip>,
    locking: bool,
) -> Option<PlaybackId> {
    // Parts the interrupted clip was driving go back to rest first
    if let Some(previous) = entity.context.active() {
        let parts: Vec<_> = previous.bindings().iter().map(|b| b.part).collect();
        entity.rig.reset_to_rest(parts);
    }

    let mut request = TransitionRequest::new(clip, 0.0);
    if locking {
        request = request.locking();
    }

    let id = entity.context.start_transition(request, &entity.rig)?;
    entity.context.on_complete(id, CompletionAction::ResetToRest);
    if locking {
        entity.context.on_complete(id, CompletionAction::ReleaseLock);
    }
    Some(id)
}
