//! Interaction and state model for the model viewers
//!
//! Two viewer variants share this crate:
//!
//! - [`DesktopViewer`]: mouse drag to rotate, wheel/slider to scale, with
//!   auto-rotation that resumes after the user lets go.
//! - [`ArViewer`]: WebXR hit-testing places a reticle on real-world surfaces,
//!   a tap spawns the model there, and touch gestures rotate and scale it.
//!
//! Everything here is platform-agnostic. The browser crate owns the DOM,
//! WebGL and WebXR handles and feeds [`devices::InputEvent`]s and frame
//! callbacks into the viewers.
//!
//! # Components
//!
//! - [`config`]: Per-variant configuration ([`ViewerConfig`])
//! - [`transform`]: Position / Euler rotation / scale ([`Transform`])
//! - [`bounds`]: Axis-aligned bounding boxes and recentering
//! - [`camera`]: Perspective camera, including raw XR pose replacement
//! - [`scene`]: Retained registry of renderable nodes
//! - [`model`]: Single-shot asynchronous model load state
//! - [`auto_rotate`]: Frame-counting auto-rotate debounce
//! - [`desktop`]: Desktop interaction controller
//! - [`gesture`]: AR touch gesture controller
//! - [`ar`]: AR session state and per-frame hit-test update

pub mod ar;
pub mod auto_rotate;
pub mod bounds;
pub mod camera;
pub mod config;
pub mod desktop;
pub mod error;
pub mod gesture;
pub mod model;
pub mod scene;
pub mod transform;

pub use ar::{ArSessionState, ArViewer, FrameReport, ViewerPose, XrFrameHost};
pub use auto_rotate::AutoRotateScheduler;
pub use bounds::{Aabb, centering_offset};
pub use camera::Camera;
pub use config::ViewerConfig;
pub use desktop::{DesktopViewer, DragState};
pub use error::{Result, ViewerError};
pub use gesture::GestureController;
pub use model::{LoadState, LoadedModel, ModelSlot};
pub use scene::{MeshId, NodeId, NodeKind, PivotContent, Scene, SceneNode};
pub use transform::Transform;
