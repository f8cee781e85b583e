use std::fmt;
use std::str::FromStr;

use crate::animation::values::{TrackValue, ValueKind};
use crate::errors::AnimationError;
use crate::scene::{PartKey, PartTransform};

/// Defines the part property a track drives.
///
/// Parsed once from an authored path (`"position.z"`, `"rotation"`, ...) when
/// tracks are built, so nothing is looked up by string while playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetProperty {
    Position,  // transform.position
    PositionX,
    PositionY,
    PositionZ,
    Rotation, // transform.rotation (quaternion)
    Scale,    // transform.scale
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl TargetProperty {
    /// Value type a track must carry to drive this property.
    #[must_use]
    pub fn value_kind(self) -> ValueKind {
        match self {
            TargetProperty::Position | TargetProperty::Scale => ValueKind::Vector3,
            TargetProperty::Rotation => ValueKind::Quaternion,
            _ => ValueKind::Scalar,
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            TargetProperty::Position => "position",
            TargetProperty::PositionX => "position.x",
            TargetProperty::PositionY => "position.y",
            TargetProperty::PositionZ => "position.z",
            TargetProperty::Rotation => "rotation",
            TargetProperty::Scale => "scale",
            TargetProperty::ScaleX => "scale.x",
            TargetProperty::ScaleY => "scale.y",
            TargetProperty::ScaleZ => "scale.z",
        }
    }

    /// Reads the current value of this property from a transform.
    #[must_use]
    pub fn read(self, transform: &PartTransform) -> TrackValue {
        match self {
            TargetProperty::Position => TrackValue::Vector3(transform.position),
            TargetProperty::PositionX => TrackValue::Scalar(transform.position.x),
            TargetProperty::PositionY => TrackValue::Scalar(transform.position.y),
            TargetProperty::PositionZ => TrackValue::Scalar(transform.position.z),
            TargetProperty::Rotation => TrackValue::Quaternion(transform.rotation),
            TargetProperty::Scale => TrackValue::Vector3(transform.scale),
            TargetProperty::ScaleX => TrackValue::Scalar(transform.scale.x),
            TargetProperty::ScaleY => TrackValue::Scalar(transform.scale.y),
            TargetProperty::ScaleZ => TrackValue::Scalar(transform.scale.z),
        }
    }

    /// Writes `value` into the transform. Returns `false` when the value kind
    /// does not match the property.
    pub fn write(self, transform: &mut PartTransform, value: TrackValue) -> bool {
        match (self, value) {
            (TargetProperty::Position, TrackValue::Vector3(v)) => transform.position = v,
            (TargetProperty::PositionX, TrackValue::Scalar(v)) => transform.position.x = v,
            (TargetProperty::PositionY, TrackValue::Scalar(v)) => transform.position.y = v,
            (TargetProperty::PositionZ, TrackValue::Scalar(v)) => transform.position.z = v,
            (TargetProperty::Rotation, TrackValue::Quaternion(q)) => transform.rotation = q,
            (TargetProperty::Scale, TrackValue::Vector3(v)) => transform.scale = v,
            (TargetProperty::ScaleX, TrackValue::Scalar(v)) => transform.scale.x = v,
            (TargetProperty::ScaleY, TrackValue::Scalar(v)) => transform.scale.y = v,
            (TargetProperty::ScaleZ, TrackValue::Scalar(v)) => transform.scale.z = v,
            _ => return false,
        }
        true
    }
}

impl FromStr for TargetProperty {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim().to_ascii_lowercase();
        let target = match path.as_str() {
            "position" | "translation" => TargetProperty::Position,
            "position.x" | "translation.x" => TargetProperty::PositionX,
            "position.y" | "translation.y" => TargetProperty::PositionY,
            "position.z" | "translation.z" => TargetProperty::PositionZ,
            "rotation" | "quaternion" | "rotation.quaternion" => TargetProperty::Rotation,
            "scale" => TargetProperty::Scale,
            "scale.x" => TargetProperty::ScaleX,
            "scale.y" => TargetProperty::ScaleY,
            "scale.z" => TargetProperty::ScaleZ,
            _ => return Err(AnimationError::UnknownPropertyPath(s.to_string())),
        };
        Ok(target)
    }
}

impl fmt::Display for TargetProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Binding relationship: maps track `track_index` of a clip to the target
/// property of `part` on one entity's rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub part: PartKey,
    pub target: TargetProperty,
}
