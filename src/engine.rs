//! Animation Engine
//!
//! [`AnimationEngine`] owns every animated entity and runs the whole frame in
//! one [`AnimationEngine::update`] call:
//!
//! 1. drain world events through the [`EventGateway`]
//! 2. let the [`StateController`] pick a clip for every NPC
//! 3. tick each entity's crossfade into its pose buffer
//! 4. commit the pose into the entity's parts
//! 5. run completion listeners and report finished playbacks
//!
//! Entities are independent of each other; nothing relies on the order they
//! are visited in.
//!
//! ```rust,ignore
//! let mut bus = EventBus::new();
//! let mut engine = AnimationEngine::new(EngineConfig::default(), &mut bus);
//! let npc = engine.spawn(AnimatedEntity::npc(rig, clips));
//!
//! loop {
//!     let finished = engine.update(dt, &physics);
//! }
//!
//! engine.dispose(&mut bus);
//! ```

use std::sync::Arc;

use glam::Vec3;
use slotmap::SlotMap;

use crate::animation::action::PlaybackId;
use crate::animation::blender::Finished;
use crate::animation::clip::{ClipSet, LoopPolicy};
use crate::animation::context::{CompletionAction, EntityAnimationContext, TransitionRequest};
use crate::animation::controller::StateController;
use crate::animation::gateway::{self, EventGateway};
use crate::animation::pose::Pose;
use crate::config::EngineConfig;
use crate::errors::{AnimationError, Result};
use crate::scene::Rig;
use crate::world::{EntityKey, EventBus, PhysicsView, WorldEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Driven by the locomotion controller and melee events.
    Npc,
    /// Plays whatever clip it is triggered with.
    Generic,
}

/// An entity together with its parts, clips and animation state.
#[derive(Debug, Clone)]
pub struct AnimatedEntity {
    pub(crate) kind: EntityKind,
    pub(crate) rig: Rig,
    pub(crate) clips: Arc<ClipSet>,
    pub(crate) context: EntityAnimationContext,
    pose: Pose,
}

impl AnimatedEntity {
    #[must_use]
    pub fn new(kind: EntityKind, rig: Rig, clips: Arc<ClipSet>) -> Self {
        Self {
            kind,
            rig,
            clips,
            context: EntityAnimationContext::new(),
            pose: Pose::new(),
        }
    }

    #[must_use]
    pub fn npc(rig: Rig, clips: Arc<ClipSet>) -> Self {
        Self::new(EntityKind::Npc, rig, clips)
    }

    #[must_use]
    pub fn generic(rig: Rig, clips: Arc<ClipSet>) -> Self {
        Self::new(EntityKind::Generic, rig, clips)
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> &EntityAnimationContext {
        &self.context
    }

    #[must_use]
    pub fn active_clip_name(&self) -> Option<&str> {
        self.context.active_clip_name()
    }

    #[must_use]
    pub fn is_interrupt_locked(&self) -> bool {
        self.context.is_interrupt_locked()
    }

    /// Ticks the blend, writes the pose and runs completion listeners.
    fn step(&mut self, dt: f32) -> Option<Finished> {
        let finished = self.context.tick(dt, &mut self.pose);
        self.pose.commit(&mut self.rig);

        if let Some(done) = &finished {
            self.context.dispatch_completion(done, &mut self.rig);
        }
        finished
    }
}

/// Reported by [`AnimationEngine::update`] for every playback that finished
/// during the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFinished {
    pub entity: EntityKey,
    pub playback: PlaybackId,
    pub clip: String,
}

pub struct AnimationEngine {
    config: EngineConfig,
    controller: StateController,
    entities: SlotMap<EntityKey, AnimatedEntity>,
    gateway: Option<EventGateway>,
}

impl AnimationEngine {
    /// Creates the engine and subscribes it to `bus`.
    pub fn new(config: EngineConfig, bus: &mut EventBus) -> Self {
        let controller = StateController::new(&config);
        Self {
            config,
            controller,
            entities: SlotMap::with_key(),
            gateway: Some(EventGateway::new(bus)),
        }
    }

    pub fn spawn(&mut self, entity: AnimatedEntity) -> EntityKey {
        self.entities.insert(entity)
    }

    pub fn despawn(&mut self, key: EntityKey) -> Option<AnimatedEntity> {
        self.entities.remove(key)
    }

    #[must_use]
    pub fn entity(&self, key: EntityKey) -> Option<&AnimatedEntity> {
        self.entities.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether [`AnimationEngine::dispose`] already ran.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.gateway.is_none()
    }

    /// Runs one frame for every entity.
    pub fn update(&mut self, dt: f32, physics: &impl PhysicsView) -> Vec<AnimationFinished> {
        self.ingest_events(physics);

        let mut finished = Vec::new();
        for (key, entity) in &mut self.entities {
            if entity.kind == EntityKind::Npc {
                let velocity = physics.linear_velocity(key).unwrap_or(Vec3::ZERO);
                self.controller
                    .update(&mut entity.context, &entity.clips, &entity.rig, velocity);
            }

            if let Some(done) = entity.step(dt) {
                finished.push(AnimationFinished {
                    entity: key,
                    playback: done.playback,
                    clip: done.clip.name.clone(),
                });
            }
        }

        finished
    }

    fn ingest_events(&mut self, physics: &impl PhysicsView) {
        let events = match &self.gateway {
            Some(gateway) => gateway.pending(),
            None => return,
        };

        for event in events {
            match event {
                WorldEvent::AnimationTriggered { entity, clip } => {
                    match self.entities.get_mut(entity) {
                        Some(target) => {
                            EventGateway::trigger(target, &clip, &self.config);
                        }
                        None => log::debug!("Trigger {clip:?} for unknown entity {entity:?}"),
                    }
                }
                WorldEvent::NpcMeleeAttack { body } => {
                    let npc = physics
                        .entity_for_body(body)
                        .and_then(|key| self.entities.get_mut(key));
                    match npc {
                        Some(npc) => {
                            EventGateway::melee_attack(npc, &self.config);
                        }
                        None => log::debug!("Melee attack from unowned body {body:?}"),
                    }
                }
            }
        }
    }

    #[must_use]
    pub fn is_interrupt_locked(&self, key: EntityKey) -> bool {
        self.entities
            .get(key)
            .is_some_and(AnimatedEntity::is_interrupt_locked)
    }

    /// Clears the entity's interrupt lock. Returns `false` if it had none.
    pub fn release_interrupt_lock(&mut self, key: EntityKey) -> bool {
        self.entities
            .get_mut(key)
            .is_some_and(|entity| entity.context.release_lock())
    }

    /// Plays `clip_name` on the entity outside the priority ladder.
    ///
    /// Any existing interrupt lock is replaced. On an NPC the clip fades in and
    /// locks the controller out: until it finishes for a `Once` clip, until
    /// [`AnimationEngine::release_interrupt_lock`] for a repeating one. On a
    /// generic entity it behaves like a trigger.
    pub fn force_trigger(&mut self, key: EntityKey, clip_name: &str) -> Result<PlaybackId> {
        let entity = self
            .entities
            .get_mut(key)
            .ok_or(AnimationError::EntityNotFound(key))?;
        let clip = entity
            .clips
            .get(clip_name)
            .cloned()
            .ok_or_else(|| AnimationError::ClipNotFound(clip_name.to_string()))?;

        entity.context.release_lock();

        let started = match entity.kind {
            EntityKind::Npc => {
                let one_shot = clip.loop_policy == LoopPolicy::Once;
                let request = TransitionRequest::new(clip, self.config.fade_duration).locking();
                let id = entity.context.start_transition(request, &entity.rig);
                if let (Some(id), true) = (id, one_shot) {
                    entity.context.on_complete(id, CompletionAction::ReleaseLock);
                }
                id
            }
            EntityKind::Generic => {
                gateway::play_triggered(entity, clip, self.config.lock_generic_triggers)
            }
        };

        log::debug!("Forced {clip_name:?} on {key:?}");
        started.ok_or_else(|| AnimationError::TransitionRejected(clip_name.to_string()))
    }

    /// Unsubscribes from `bus`. Safe to call more than once.
    pub fn dispose(&mut self, bus: &mut EventBus) {
        if let Some(gateway) = self.gateway.take() {
            gateway.dispose(bus);
            log::debug!("Animation engine disposed");
        }
    }
}
