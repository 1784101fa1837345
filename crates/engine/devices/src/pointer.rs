//! Pointer coordinate normalization
//!
//! This module provides the viewport extent type and the two normalized
//! coordinate conventions used by the viewers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Size of the drawing surface in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

impl Viewport {
    /// Create a new viewport
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width / height, never dividing by zero
    pub fn aspect(&self) -> f32 {
        self.safe_width() / self.safe_height()
    }

    fn safe_width(&self) -> f32 {
        if self.width > 0.0 { self.width } else { 1.0 }
    }

    fn safe_height(&self) -> f32 {
        if self.height > 0.0 { self.height } else { 1.0 }
    }
}

/// How client pixel coordinates map into normalized space
///
/// The x axis is always centered (`[-1, 1]`). The y axis differs per
/// viewer variant and the two must not be unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerConvention {
    /// Desktop viewer: y is centered and inverted, `[-1, 1]` with +1 at the top
    #[default]
    Centered,
    /// AR viewer: y is neither centered nor inverted, `[0, 1]` with 0 at the top
    TopDown,
}

impl PointerConvention {
    /// Normalize a client-space position against the viewport
    pub fn normalize(&self, client: Vec2, viewport: Viewport) -> Vec2 {
        let x = (client.x / viewport.safe_width()) * 2.0 - 1.0;
        let y = match self {
            PointerConvention::Centered => -(client.y / viewport.safe_height()) * 2.0 + 1.0,
            PointerConvention::TopDown => client.y / viewport.safe_height(),
        };
        Vec2::new(x, y)
    }
}
