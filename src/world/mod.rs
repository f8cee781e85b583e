//! World Collaborators
//!
//! Identifiers and interfaces for the parts of the game world the engine
//! listens to: the event bus and the physics state.

pub mod events;
pub mod physics;

use slotmap::new_key_type;

pub use events::{EventBus, EventKind, Subscription, SubscriptionKey, WorldEvent};
pub use physics::{PhysicsSnapshot, PhysicsView};

new_key_type! {
    /// Handle of an animated entity owned by the engine.
    pub struct EntityKey;
}

/// Rigid-body identifier assigned by the physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);
