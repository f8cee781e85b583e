//! Animation Blending
//!
//! Leaf-first:
//!
//! - [`tracks`] / [`values`]: keyframe storage and interpolation
//! - [`clip`]: immutable clips and per-entity clip sets
//! - [`binding`] / [`binder`]: typed part properties, resolved once per playback
//! - [`action`] / [`player`]: playback instances and how they feed a [`Pose`]
//! - [`blender`]: two-way crossfades
//! - [`context`]: per-entity state, interrupt lock and completion listeners
//! - [`controller`]: priority-driven locomotion clip selection
//! - [`gateway`]: world events turned into playback requests

pub mod action;
pub mod binder;
pub mod binding;
pub mod blender;
pub mod clip;
pub mod context;
pub mod controller;
pub mod gateway;
pub mod player;
pub mod pose;
pub mod tracks;
pub mod values;

pub use action::{Advance, PlaybackId, PlaybackOverrides, PlaybackState};
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetProperty};
pub use blender::{Crossfade, Finished, Transition};
pub use clip::{AnimationClip, ClipSet, LoopPolicy, Track, TrackData, TrackMeta};
pub use context::{CompletionAction, CompletionListener, EntityAnimationContext, TransitionRequest};
pub use controller::StateController;
pub use gateway::EventGateway;
pub use player::ClipPlayer;
pub use pose::Pose;
pub use tracks::{InterpolationMode, Keyframe, KeyframeTrack};
pub use values::{Interpolatable, TrackValue, ValueKind};
