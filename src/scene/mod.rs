//! Part Data
//!
//! The slice of the rendering side this engine touches: named parts with a
//! live transform the engine writes and a rest transform from asset data.

pub mod rig;
pub mod transform;

pub use rig::{Part, PartKey, Rig};
pub use transform::PartTransform;
