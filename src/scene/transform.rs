use glam::{Affine3A, Mat4, Quat, Vec3};

/// Local TRS transform of one animated part.
///
/// The engine writes these fields every frame, the renderer reads them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl PartTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new() -> Self {
        Self::IDENTITY
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Local matrix as `Mat4`, the form the renderer uploads.
    #[inline]
    #[must_use]
    pub fn local_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.local_matrix())
    }
}

impl Default for PartTransform {
    fn default() -> Self {
        Self::new()
    }
}
