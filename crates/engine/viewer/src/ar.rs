//! AR viewer: session state, tap-to-place and the per-frame hit-test update
//!
//! The device API (reference spaces, hit-test source, the XR frame itself)
//! stays with the platform host. Each XR animation frame the host hands
//! itself to [`ArViewer::on_xr_frame`] through [`XrFrameHost`], and the
//! viewer drives the frame steps in a fixed order.

use devices::{InputEvent, Viewport};
use glam::{Mat4, Vec3};

use crate::bounds::centering_offset;
use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::gesture::GestureController;
use crate::model::{LoadedModel, ModelSlot};
use crate::scene::{NodeId, NodeKind, PivotContent, Scene};
use crate::transform::Transform;

/// Device pose for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerPose {
    /// Camera-to-world matrix of the view
    pub transform: Mat4,
    pub projection: Mat4,
}

/// Platform side of one XR animation frame
pub trait XrFrameHost {
    /// Schedule the next XR animation frame
    fn request_next_frame(&mut self);

    /// Bind the session's framebuffer as the render target
    fn bind_target_surface(&mut self);

    /// Pose of the viewer in the local reference space, if tracking is established
    fn viewer_pose(&mut self) -> Option<ViewerPose>;

    /// Hit-test results against the viewer ray, nearest first
    fn hit_test_results(&mut self) -> Vec<Mat4>;

    /// Draw the scene
    fn render(&mut self, scene: &Scene, camera: &Camera);
}

/// What happened during one XR frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameReport {
    /// No active session; the loop was not re-armed
    Halted,
    /// Tracking not established; nothing rendered
    NoPose,
    Rendered {
        /// First successful hit-test of the session happened this frame
        stabilized_now: bool,
    },
}

/// Per-session state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArSessionState {
    /// Latched once the first hit-test result arrives
    pub stabilized: bool,
    /// Last recorded reticle pose
    pub reticle_pose: Option<Mat4>,
    pub reticle_visible: bool,
    /// Latched once the object has been placed
    pub object_spawned: bool,
}

/// WebXR hit-test model viewer
#[derive(Debug, Clone)]
pub struct ArViewer {
    config: ViewerConfig,
    scene: Scene,
    reticle: NodeId,
    /// Pivot wrapping the loaded model; held detached until placed
    object: Option<NodeId>,
    model: ModelSlot,
    session: Option<ArSessionState>,
    gestures: GestureController,
    camera: Camera,
    viewport: Viewport,
}

impl ArViewer {
    pub fn new(config: ViewerConfig, viewport: Viewport) -> Self {
        let mut scene = Scene::new();
        let reticle = scene.create(
            NodeKind::Reticle {
                pose: Mat4::IDENTITY,
            },
            Transform::IDENTITY,
        );
        if let Some(node) = scene.node_mut(reticle) {
            node.visible = false;
        }

        let mut camera = Camera::new(Vec3::ZERO);
        camera.vfov = config.vfov_degrees.to_radians();
        camera.set_aspect(viewport.aspect());

        Self {
            gestures: GestureController::new(&config),
            config,
            scene,
            reticle,
            object: None,
            model: ModelSlot::new(),
            session: None,
            camera,
            viewport,
        }
    }

    /// A session was granted by the device
    pub fn start_session(&mut self) {
        tracing::info!("AR session started");
        self.session = Some(ArSessionState::default());
        self.gestures.reset();
        if let Some(node) = self.scene.node_mut(self.reticle) {
            node.visible = false;
        }
        self.scene.attach(self.reticle);
    }

    /// The session ended; tracking state is dropped
    pub fn end_session(&mut self) {
        if self.session.take().is_some() {
            tracing::info!("AR session ended");
        }
        self.gestures.reset();
        self.scene.detach(self.reticle);
        if let Some(object) = self.object {
            self.scene.detach(object);
        }
        self.camera.clear_xr_projection();
    }

    /// Feed one input event into the state machine
    pub fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Tap => self.place_object(),
            InputEvent::Resize(viewport) => {
                self.viewport = *viewport;
                self.camera.set_aspect(viewport.aspect());
            }
            InputEvent::TouchStart(_) | InputEvent::TouchMove(_) | InputEvent::TouchEnd(_) => {
                let target = self.spawned_object().and_then(|id| self.scene.node_mut(id));
                self.gestures
                    .handle(event, self.viewport, target.map(|n| &mut n.transform));
            }
            InputEvent::PointerDown { .. }
            | InputEvent::PointerMove { .. }
            | InputEvent::PointerUp
            | InputEvent::Wheel { .. }
            | InputEvent::ScaleSlider(_) => {}
        }
    }

    /// Move the object onto the reticle and swap it into the scene
    ///
    /// Requires a loaded object, a recorded reticle pose and that nothing has
    /// been placed yet this session. Later taps are no-ops.
    fn place_object(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let (Some(object), Some(pose)) = (self.object, session.reticle_pose) else {
            return;
        };
        if session.object_spawned || !self.model.is_loaded() {
            return;
        }

        let position = pose.w_axis.truncate();
        if let Some(node) = self.scene.node_mut(object) {
            node.transform.position = position;
        }
        self.scene.attach(object);
        self.scene.detach(self.reticle);
        session.object_spawned = true;
        tracing::debug!("Object placed at {:?}", position);
    }

    /// Run one XR animation frame
    ///
    /// Order: re-arm, bind surface, read pose (skip the rest if absent),
    /// copy pose into the camera, hit-test, latch stabilization, move the
    /// reticle, render.
    pub fn on_xr_frame<H: XrFrameHost>(&mut self, host: &mut H) -> FrameReport {
        if self.session.is_none() {
            return FrameReport::Halted;
        }

        host.request_next_frame();
        host.bind_target_surface();

        let Some(pose) = host.viewer_pose() else {
            return FrameReport::NoPose;
        };
        self.camera.set_from_xr(pose.transform, pose.projection);

        let hits = host.hit_test_results();
        let mut stabilized_now = false;
        if let (Some(top), Some(session)) = (hits.first(), self.session.as_mut()) {
            if !session.stabilized {
                session.stabilized = true;
                stabilized_now = true;
                tracing::debug!("Hit-test stabilized");
            }
            session.reticle_pose = Some(*top);
            session.reticle_visible = true;
            if let Some(node) = self.scene.node_mut(self.reticle) {
                node.kind = NodeKind::Reticle { pose: *top };
                node.visible = true;
            }
        }

        host.render(&self.scene, &self.camera);
        FrameReport::Rendered { stabilized_now }
    }

    /// Record that a model request is in flight
    pub fn begin_load(&mut self, url: impl Into<String>) {
        self.model.begin(url);
    }

    /// Publish the load outcome
    ///
    /// The object is held but not added to the scene until it is placed.
    pub fn on_model_loaded(&mut self, result: Result<LoadedModel, ViewerError>) {
        let Some(model) = self.model.complete(result).copied() else {
            return;
        };
        let content = PivotContent {
            mesh: model.mesh,
            offset: centering_offset(&model.bounds),
        };
        let object = self.scene.create(
            NodeKind::Pivot {
                content: Some(content),
            },
            Transform::IDENTITY,
        );
        self.object = Some(object);
    }

    fn spawned_object(&self) -> Option<NodeId> {
        match &self.session {
            Some(session) if session.object_spawned => self.object,
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&ArSessionState> {
        self.session.as_ref()
    }

    pub fn is_session_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn model(&self) -> &ModelSlot {
        &self.model
    }

    pub fn reticle(&self) -> NodeId {
        self.reticle
    }

    pub fn object(&self) -> Option<NodeId> {
        self.object
    }

    /// Transform of the held object, if one is loaded
    pub fn object_transform(&self) -> Option<Transform> {
        self.object
            .and_then(|id| self.scene.node(id))
            .map(|n| n.transform)
    }
}
