use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::world::{BodyHandle, EntityKey};

/// Read-only view of the physics collaborator.
pub trait PhysicsView {
    /// Linear velocity of the entity's body, `None` if it has none.
    fn linear_velocity(&self, entity: EntityKey) -> Option<Vec3>;

    /// Entity that owns `body`.
    fn entity_for_body(&self, body: BodyHandle) -> Option<EntityKey>;
}

/// A per-frame copy of the physics data the engine reads.
///
/// Filled by the game loop after the physics step.
#[derive(Debug, Clone, Default)]
pub struct PhysicsSnapshot {
    velocities: FxHashMap<EntityKey, Vec3>,
    owners: FxHashMap<BodyHandle, EntityKey>,
}

impl PhysicsSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_velocity(&mut self, entity: EntityKey, velocity: Vec3) {
        self.velocities.insert(entity, velocity);
    }

    pub fn attach_body(&mut self, body: BodyHandle, entity: EntityKey) {
        self.owners.insert(body, entity);
    }

    /// Forgets the entity's velocity and every body it owns.
    pub fn remove_entity(&mut self, entity: EntityKey) {
        self.velocities.remove(&entity);
        self.owners.retain(|_, owner| *owner != entity);
    }
}

impl PhysicsView for PhysicsSnapshot {
    fn linear_velocity(&self, entity: EntityKey) -> Option<Vec3> {
        self.velocities.get(&entity).copied()
    }

    fn entity_for_body(&self, body: BodyHandle) -> Option<EntityKey> {
        self.owners.get(&body).copied()
    }
}
