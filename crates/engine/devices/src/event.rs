//! Tagged input events
//!
//! Browser handlers convert DOM pointer, wheel, touch and XR select events
//! into these values. All positions are in client (CSS pixel) space;
//! normalization happens on the viewer side because the convention is a
//! property of the viewer variant, not of the device.

use glam::Vec2;

use crate::pointer::Viewport;

/// A single input event delivered to a viewer
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary pointer pressed
    PointerDown { position: Vec2 },
    /// Pointer moved (delivered whether or not a button is held)
    PointerMove { position: Vec2 },
    /// Primary pointer released
    PointerUp,
    /// Wheel scrolled; positive `delta_y` scrolls down
    Wheel { delta_y: f32 },
    /// One or more fingers touched; carries all currently active touches
    TouchStart(Vec<Vec2>),
    /// Active touches moved
    TouchMove(Vec<Vec2>),
    /// A finger was lifted; carries the remaining active touches
    TouchEnd(Vec<Vec2>),
    /// XR controller / screen tap (`select`)
    Tap,
    /// Scale slider input value
    ScaleSlider(f32),
    /// Drawing surface was resized
    Resize(Viewport),
}
