//! Touch input support
//!
//! This module provides types for tracking touch points on mobile devices
//! and touch-enabled displays, including the two-finger pinch distance used
//! by the AR gesture controller.

use glam::Vec2;

/// Touch event phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// A finger touched the screen
    Started,
    /// A finger moved on the screen
    Moved,
    /// A finger was lifted from the screen
    Ended,
}

/// A single touch point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Position of the touch (client or normalized, caller decides)
    pub position: Vec2,
    /// Previous position of the touch (if moved)
    pub previous_position: Vec2,
}

impl TouchPoint {
    /// Create a new touch point that has not moved yet
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            previous_position: position,
        }
    }

    /// Get the delta movement since the last update
    pub fn delta(&self) -> Vec2 {
        self.position - self.previous_position
    }
}

/// Touch state tracker for multi-touch input
///
/// Browser touch events carry the full list of active touches, so the
/// tracker is refreshed wholesale on each event. Points are matched by
/// index, which is how the list is ordered by the browser.
#[derive(Debug, Clone, Default)]
pub struct TouchState {
    /// Currently active touch points
    touches: Vec<TouchPoint>,
}

impl TouchState {
    /// Create a new empty touch state
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active touches with a fresh list
    ///
    /// On [`TouchPhase::Moved`] each point keeps its previous position so
    /// [`TouchPoint::delta`] reports the movement; on start/end the list is
    /// re-based and deltas are zero.
    pub fn update(&mut self, phase: TouchPhase, positions: &[Vec2]) {
        let rebase = phase != TouchPhase::Moved || positions.len() != self.touches.len();

        self.touches = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| match self.touches.get(i) {
                Some(existing) if !rebase => TouchPoint {
                    position,
                    previous_position: existing.position,
                },
                _ => TouchPoint::new(position),
            })
            .collect();
    }

    /// Get the number of currently active touches
    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    /// Get the first touch point (convenience for single-touch scenarios)
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Euclidean distance between the two fingers of a pinch
    ///
    /// Returns `None` unless exactly two touches are active.
    pub fn pinch_distance(&self) -> Option<f32> {
        match self.touches.as_slice() {
            [a, b] => Some(a.position.distance(b.position)),
            _ => None,
        }
    }

    /// Clear all touch state
    pub fn clear(&mut self) {
        self.touches.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_point_delta() {
        let mut touch = TouchPoint::new(Vec2::new(100.0, 100.0));
        assert_eq!(touch.delta(), Vec2::ZERO);

        touch.previous_position = touch.position;
        touch.position = Vec2::new(150.0, 120.0);
        assert_eq!(touch.delta(), Vec2::new(50.0, 20.0));
    }

    #[test]
    fn test_touch_state_lifecycle() {
        let mut state = TouchState::new();
        assert_eq!(state.touch_count(), 0);

        // Start touch
        state.update(TouchPhase::Started, &[Vec2::new(100.0, 100.0)]);
        assert_eq!(state.touch_count(), 1);

        // Move touch
        state.update(TouchPhase::Moved, &[Vec2::new(150.0, 150.0)]);
        assert_eq!(state.touch_count(), 1);
        assert_eq!(
            state.primary_touch().unwrap().delta(),
            Vec2::new(50.0, 50.0)
        );

        // End touch
        state.update(TouchPhase::Ended, &[]);
        assert_eq!(state.touch_count(), 0);
        assert!(state.primary_touch().is_none());
    }

    #[test]
    fn test_multi_touch() {
        let mut state = TouchState::new();

        state.update(
            TouchPhase::Started,
            &[Vec2::new(100.0, 100.0), Vec2::new(200.0, 200.0)],
        );

        assert_eq!(state.touch_count(), 2);
        assert_eq!(
            state.primary_touch().map(|t| t.position),
            Some(Vec2::new(100.0, 100.0))
        );

        state.clear();
        assert_eq!(state.touch_count(), 0);
    }

    #[test]
    fn test_pinch_distance() {
        let mut state = TouchState::new();

        // No pinch with single touch
        state.update(TouchPhase::Started, &[Vec2::new(0.0, 0.0)]);
        assert!(state.pinch_distance().is_none());

        // Add second touch
        state.update(
            TouchPhase::Started,
            &[Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)],
        );
        assert!((state.pinch_distance().unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_count_change_rebases_deltas() {
        let mut state = TouchState::new();
        state.update(TouchPhase::Started, &[Vec2::new(0.0, 0.0)]);
        state.update(
            TouchPhase::Moved,
            &[Vec2::new(10.0, 0.0), Vec2::new(20.0, 0.0)],
        );
        assert_eq!(state.touch_count(), 2);
        assert_eq!(state.primary_touch().map(|t| t.delta()), Some(Vec2::ZERO));
    }
}
