//! Node transforms
//!
//! Rotation is stored as Euler angles (radians, XYZ order) because the
//! controllers increment and clamp individual axes.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, Euler rotation and scale of a scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Rotation as a quaternion
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Local-to-parent matrix (scale, then rotate, then translate)
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }

    /// Uniform scale factor (the x axis; all axes move together)
    pub fn uniform_scale(&self) -> f32 {
        self.scale.x
    }

    /// Add `amount` to each of the three scale axes
    pub fn add_uniform_scale(&mut self, amount: f32) {
        self.scale += Vec3::splat(amount);
    }

    /// Set all three scale axes to `value`
    pub fn set_uniform_scale(&mut self, value: f32) {
        self.scale = Vec3::splat(value);
    }
}
