//! AR touch gestures
//!
//! One finger rotates the placed object around Y; two fingers pinch-scale
//! it. Unlike the desktop wheel there is no lower bound on scale here.

use devices::{InputEvent, PointerConvention, TouchPhase, TouchState, Viewport};
use glam::Vec2;

use crate::config::ViewerConfig;
use crate::transform::Transform;

/// Touch gesture state for the AR viewer
#[derive(Debug, Clone)]
pub struct GestureController {
    convention: PointerConvention,
    yaw_rate: f32,
    pinch_rate: f32,
    /// Active touches in normalized coordinates
    touches: TouchState,
    last_pinch_distance: f32,
    /// Touch count seen on the previous touch event
    last_count: usize,
}

impl GestureController {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            convention: config.pointer_convention,
            yaw_rate: config.yaw_rate,
            pinch_rate: config.pinch_rate,
            touches: TouchState::new(),
            last_pinch_distance: 0.0,
            last_count: 0,
        }
    }

    /// Apply a touch event; `target` is `None` until an object is placed
    ///
    /// Touches are tracked either way so a gesture that starts before
    /// placement does not jump once it lands on the object.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        viewport: Viewport,
        mut target: Option<&mut Transform>,
    ) {
        let (phase, points) = match event {
            InputEvent::TouchStart(points) => (TouchPhase::Started, points),
            InputEvent::TouchMove(points) => (TouchPhase::Moved, points),
            InputEvent::TouchEnd(points) => (TouchPhase::Ended, points),
            _ => return,
        };

        let normalized: Vec<Vec2> = points
            .iter()
            .map(|&p| self.convention.normalize(p, viewport))
            .collect();
        self.touches.update(phase, &normalized);

        let count = self.touches.touch_count();
        match (phase, count) {
            (TouchPhase::Moved, 1) => {
                if let (Some(touch), Some(t)) = (self.touches.primary_touch(), target.as_deref_mut())
                {
                    t.rotation.y += touch.delta().x * self.yaw_rate;
                }
            }
            // Entering a two-finger gesture from any phase establishes the
            // baseline, including a third finger lifting off
            (_, 2) if self.last_count != 2 => {
                if let Some(distance) = self.touches.pinch_distance() {
                    self.last_pinch_distance = distance;
                }
            }
            (TouchPhase::Moved, 2) => {
                self.pinch(target.as_deref_mut());
            }
            _ => {}
        }

        self.last_count = count;
    }

    fn pinch(&mut self, target: Option<&mut Transform>) {
        let Some(distance) = self.touches.pinch_distance() else {
            return;
        };

        let delta = (distance - self.last_pinch_distance) * self.pinch_rate;
        self.last_pinch_distance = distance;
        if let Some(t) = target {
            t.add_uniform_scale(delta);
        }
    }

    /// Forget all touches (session ended)
    pub fn reset(&mut self) {
        self.touches.clear();
        self.last_pinch_distance = 0.0;
        self.last_count = 0;
    }

    pub fn active_touches(&self) -> usize {
        self.touches.touch_count()
    }

    pub fn last_pinch_distance(&self) -> f32 {
        self.last_pinch_distance
    }
}
