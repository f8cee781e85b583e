use glam::{Quat, Vec3};

/// Value types a keyframe track can carry.
pub trait Interpolatable: Copy + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Quat {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }
}

/// Which value type a track or a part property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    Vector3,
    Quaternion,
}

/// A sampled track value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Scalar(f32),
    Vector3(Vec3),
    Quaternion(Quat),
}

impl TrackValue {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            TrackValue::Scalar(_) => ValueKind::Scalar,
            TrackValue::Vector3(_) => ValueKind::Vector3,
            TrackValue::Quaternion(_) => ValueKind::Quaternion,
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<f32> {
        match *self {
            TrackValue::Scalar(v) => Some(v),
            _ => None,
        }
    }
}
