//! Perspective camera
//!
//! The desktop viewer places the camera once and never moves it; the model
//! pivot rotates instead. In AR the device pose replaces the camera transform
//! and projection verbatim on every frame.
//!
//! # Coordinate System
//!
//! Uses OpenGL convention:
//! - +X is right
//! - +Y is up
//! - -Z is forward (into the screen)

use glam::{Mat3, Mat4, Quat, Vec3};

/// Default vertical field of view: 50 degrees
pub const DEFAULT_VFOV: f32 = 50.0 * std::f32::consts::PI / 180.0;

/// Camera for 3D rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Camera rotation (orientation) as quaternion
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub vfov: f32,
    /// Viewport width / height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Projection supplied by the XR device, used instead of `vfov`/`aspect`
    projection_override: Option<Mat4>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    /// Create a new camera with default settings at the given position
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            vfov: DEFAULT_VFOV,
            aspect: 1.0,
            near: 0.01,
            far: 100.0,
            projection_override: None,
        }
    }

    /// Create camera with position looking at target
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - position).normalize();
        let right = forward.cross(up).normalize();
        let cam_up = right.cross(forward);

        // In camera space: right=+X, up=+Y, forward=-Z
        let rotation = Quat::from_mat3(&Mat3::from_cols(right, cam_up, -forward));

        Self {
            rotation,
            ..Self::new(position)
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Replace pose and projection with the raw matrices from an XR view
    pub fn set_from_xr(&mut self, transform: Mat4, projection: Mat4) {
        let (_, rotation, position) = transform.to_scale_rotation_translation();
        self.position = position;
        self.rotation = rotation;
        self.projection_override = Some(projection);
    }

    /// Drop any XR-supplied projection
    pub fn clear_xr_projection(&mut self) {
        self.projection_override = None;
    }

    /// Camera-to-world matrix
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// World-to-camera matrix
    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_override.unwrap_or_else(|| {
            Mat4::perspective_rh_gl(self.vfov, self.aspect, self.near, self.far)
        })
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
