//! # Myth Blend
//!
//! Frame-stepped animation blending for part-based entities.
//!
//! Each frame the engine drains world events, picks a clip per NPC by fixed
//! priority, crossfades between clips without popping, samples keyframes and
//! writes the result into the entities' part transforms for the renderer.
//!
//! - [`animation`]: sampling, playback, crossfades, controller, event gateway
//! - [`scene`]: parts and their rest pose
//! - [`world`]: event bus and physics interfaces the engine reads from
//! - [`engine`]: the [`AnimationEngine`] facade tying it together

pub mod animation;
pub mod config;
pub mod engine;
pub mod errors;
pub mod scene;
pub mod world;

pub use animation::{
    AnimationClip, ClipSet, Keyframe, KeyframeTrack, LoopPolicy, PlaybackOverrides, TargetProperty, Track,
    TrackData,
};
pub use config::EngineConfig;
pub use engine::{AnimatedEntity, AnimationEngine, AnimationFinished, EntityKind};
pub use errors::{AnimationError, Result};
pub use scene::{PartKey, PartTransform, Rig};
pub use world::{BodyHandle, EntityKey, EventBus, PhysicsSnapshot, PhysicsView, WorldEvent};
