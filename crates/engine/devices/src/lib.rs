//! Input device abstractions for the model viewer
//!
//! This crate provides platform-agnostic input types and can be compiled
//! both natively and to WebAssembly. Browser event handlers translate DOM
//! events into [`InputEvent`] values which are then fed into a single
//! state-machine update function on the viewer side.
//!
//! # Modules
//!
//! - [`event`]: The tagged input event enum
//! - [`pointer`]: Viewport extents and pointer coordinate normalization
//! - [`touch`]: Multi-touch tracking and pinch distance

pub mod event;
pub mod pointer;
pub mod touch;

// Re-export commonly used types at crate root
pub use event::InputEvent;
pub use pointer::{PointerConvention, Viewport};
pub use touch::{TouchPhase, TouchPoint, TouchState};
