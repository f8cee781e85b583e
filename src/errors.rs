//! Error Types
//!
//! This module defines the error types used by the blending engine.
//!
//! # Overview
//!
//! The per-frame path (`AnimationEngine::update`) never fails: missing clips,
//! unresolved parts and locked entities are logged and skipped so that a
//! broken asset never stops the animation of the rest of the world.
//!
//! [`AnimationError`] is reserved for explicit commands whose caller may want
//! to react:
//! - building clip sets and tracks at asset-load time
//! - parsing property paths such as `"position.z"`
//! - forcing a clip on a specific entity
//!
//! ```rust,ignore
//! use myth_blend::errors::Result;
//!
//! fn load() -> Result<()> {
//!     let target: TargetProperty = "position.z".parse()?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::world::EntityKey;

/// The main error type for the blending engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// A property path could not be mapped to a part property.
    #[error("Unknown property path: {0:?}")]
    UnknownPropertyPath(String),

    /// Two clips with the same name were added to one clip set.
    #[error("Duplicate clip name in clip set: {0}")]
    DuplicateClip(String),

    /// A clip was rejected while building it.
    #[error("Invalid clip {name}: {reason}")]
    InvalidClip {
        /// Name of the rejected clip
        name: String,
        /// What was wrong with it
        reason: String,
    },

    // ========================================================================
    // Command Errors
    // ========================================================================
    /// The entity's clip set has no clip with that name.
    #[error("Clip not found: {0}")]
    ClipNotFound(String),

    /// The entity refused to start the requested clip.
    #[error("Transition to {0} was rejected")]
    TransitionRejected(String),

    /// The entity key is stale or was never spawned.
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityKey),
}

/// Alias for `Result<T, AnimationError>`.
pub type Result<T> = std::result::Result<T, AnimationError>;
