//! Viewer variant configuration
//!
//! The desktop and AR viewers differ in their y-axis pointer convention and
//! in whether scale has a lower bound. Both presets live side by side.

use devices::PointerConvention;
use ron::extensions::Extensions;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Tunables for one viewer variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// How client coordinates are normalized
    pub pointer_convention: PointerConvention,
    /// `rotation.y += delta.x * yaw_rate`
    pub yaw_rate: f32,
    /// `rotation.x -= delta.y * pitch_rate`
    pub pitch_rate: f32,
    /// `rotation.x` is clamped to `[-pitch_limit, pitch_limit]`
    pub pitch_limit: f32,
    /// Wheel scale increment is `-delta_y / wheel_divisor`
    pub wheel_divisor: f32,
    /// Scale updates landing at or below this are rejected; `None` is unclamped
    pub min_scale: Option<f32>,
    /// Multiplier on the two-finger pinch distance delta
    pub pinch_rate: f32,
    /// Radians added to `rotation.y` per frame while auto-rotating
    pub auto_rotate_speed: f32,
    /// Frames after pointer release before auto-rotate resumes
    pub auto_rotate_resume_frames: u32,
    /// Distance of the desktop camera from the origin along +Z
    pub camera_distance: f32,
    /// Vertical field of view of the non-XR camera
    pub vfov_degrees: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::desktop()
    }
}

impl ViewerConfig {
    /// Orbiting desktop viewer
    pub fn desktop() -> Self {
        Self {
            pointer_convention: PointerConvention::Centered,
            yaw_rate: 2.0,
            pitch_rate: 1.0,
            pitch_limit: 1.0,
            wheel_divisor: 1000.0,
            min_scale: Some(0.1),
            pinch_rate: 1.0,
            auto_rotate_speed: 0.005,
            auto_rotate_resume_frames: 100,
            camera_distance: 3.0,
            vfov_degrees: 50.0,
        }
    }

    /// WebXR hit-test viewer
    pub fn ar() -> Self {
        Self {
            pointer_convention: PointerConvention::TopDown,
            min_scale: None,
            ..Self::desktop()
        }
    }

    /// Apply RON overrides on top of a preset
    ///
    /// Only the fields present in `source` are changed, e.g.
    /// `(yaw_rate: 3.0, auto_rotate_resume_frames: 60)`.
    pub fn from_ron(base: Self, source: &str) -> Result<Self> {
        let overrides: Overrides = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(source)?;
        Ok(overrides.apply(base))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Overrides {
    pointer_convention: Option<PointerConvention>,
    yaw_rate: Option<f32>,
    pitch_rate: Option<f32>,
    pitch_limit: Option<f32>,
    wheel_divisor: Option<f32>,
    /// `Some(None)` when listed as `None`, which removes the floor
    #[serde(deserialize_with = "listed")]
    min_scale: Option<Option<f32>>,
    pinch_rate: Option<f32>,
    auto_rotate_speed: Option<f32>,
    auto_rotate_resume_frames: Option<u32>,
    camera_distance: Option<f32>,
    vfov_degrees: Option<f32>,
}

impl Overrides {
    fn apply(self, base: ViewerConfig) -> ViewerConfig {
        ViewerConfig {
            pointer_convention: self.pointer_convention.unwrap_or(base.pointer_convention),
            yaw_rate: self.yaw_rate.unwrap_or(base.yaw_rate),
            pitch_rate: self.pitch_rate.unwrap_or(base.pitch_rate),
            pitch_limit: self.pitch_limit.unwrap_or(base.pitch_limit),
            wheel_divisor: self.wheel_divisor.unwrap_or(base.wheel_divisor),
            min_scale: self.min_scale.unwrap_or(base.min_scale),
            pinch_rate: self.pinch_rate.unwrap_or(base.pinch_rate),
            auto_rotate_speed: self.auto_rotate_speed.unwrap_or(base.auto_rotate_speed),
            auto_rotate_resume_frames: self
                .auto_rotate_resume_frames
                .unwrap_or(base.auto_rotate_resume_frames),
            camera_distance: self.camera_distance.unwrap_or(base.camera_distance),
            vfov_degrees: self.vfov_degrees.unwrap_or(base.vfov_degrees),
        }
    }
}

/// Marks a field as present even when its own value is `None`
fn listed<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
