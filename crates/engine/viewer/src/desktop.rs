//! Desktop interaction controller
//!
//! Drag to rotate, wheel or slider to scale, auto-rotate while idle.
//!
//! The model hangs off a pivot node. Before the model arrives the pivot is
//! an empty placeholder and none of the gestures touch it.

use devices::{InputEvent, Viewport};
use glam::{Vec2, Vec3};

use crate::auto_rotate::AutoRotateScheduler;
use crate::bounds::centering_offset;
use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::model::{LoadedModel, ModelSlot};
use crate::scene::{NodeId, NodeKind, PivotContent, Scene};
use crate::transform::Transform;

/// Drag-to-rotate state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Pointer is down; `last` is the previous normalized position
    Dragging { last: Vec2 },
}

/// Orbiting desktop model viewer
#[derive(Debug, Clone)]
pub struct DesktopViewer {
    config: ViewerConfig,
    scene: Scene,
    pivot: NodeId,
    model: ModelSlot,
    drag: DragState,
    auto_rotate: AutoRotateScheduler,
    viewport: Viewport,
    camera: Camera,
}

impl DesktopViewer {
    /// Bootstrap the scene with a placeholder pivot and a fixed camera
    pub fn new(config: ViewerConfig, viewport: Viewport) -> Self {
        let mut scene = Scene::new();
        let pivot = scene.create(NodeKind::Pivot { content: None }, Transform::IDENTITY);
        scene.attach(pivot);

        let mut camera = Camera::look_at(
            Vec3::new(0.0, 0.0, config.camera_distance),
            Vec3::ZERO,
            Vec3::Y,
        );
        camera.vfov = config.vfov_degrees.to_radians();
        camera.set_aspect(viewport.aspect());

        Self {
            config,
            scene,
            pivot,
            model: ModelSlot::new(),
            drag: DragState::Idle,
            auto_rotate: AutoRotateScheduler::new(config.auto_rotate_resume_frames),
            viewport,
            camera,
        }
    }

    /// Feed one input event into the state machine
    pub fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { position } => self.pointer_down(*position),
            InputEvent::PointerMove { position } => self.pointer_move(*position),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::Wheel { delta_y } => self.wheel(*delta_y),
            InputEvent::ScaleSlider(value) => self.slider(*value),
            InputEvent::Resize(viewport) => self.resize(*viewport),
            // Browsers deliver touch as pointer events here
            InputEvent::TouchStart(_)
            | InputEvent::TouchMove(_)
            | InputEvent::TouchEnd(_)
            | InputEvent::Tap => {}
        }
    }

    fn pointer_down(&mut self, client: Vec2) {
        let position = self.normalize(client);
        self.drag = DragState::Dragging { last: position };
        self.auto_rotate.suspend();
        tracing::debug!("Drag started at {:?}", position);
    }

    fn pointer_move(&mut self, client: Vec2) {
        let DragState::Dragging { last } = self.drag else {
            return;
        };
        let current = self.normalize(client);
        let delta = current - last;
        self.drag = DragState::Dragging { last: current };

        let (yaw_rate, pitch_rate, limit) = (
            self.config.yaw_rate,
            self.config.pitch_rate,
            self.config.pitch_limit,
        );
        if let Some(pivot) = self.loaded_pivot_mut() {
            pivot.rotation.y += delta.x * yaw_rate;
            pivot.rotation.x -= delta.y * pitch_rate;
            pivot.rotation.x = pivot.rotation.x.clamp(-limit, limit);
        }
    }

    fn pointer_up(&mut self) {
        if let DragState::Dragging { .. } = self.drag {
            self.drag = DragState::Idle;
            self.auto_rotate.schedule_resume();
            tracing::debug!("Drag ended");
        }
    }

    fn wheel(&mut self, delta_y: f32) {
        let value = -delta_y / self.config.wheel_divisor;
        let min_scale = self.config.min_scale;
        if let Some(pivot) = self.loaded_pivot_mut() {
            let next = pivot.uniform_scale() + value;
            if min_scale.is_some_and(|min| next <= min) {
                return;
            }
            pivot.add_uniform_scale(value);
        }
    }

    fn slider(&mut self, value: f32) {
        let min_scale = self.config.min_scale;
        if min_scale.is_some_and(|min| value <= min) {
            return;
        }
        if let Some(pivot) = self.loaded_pivot_mut() {
            pivot.set_uniform_scale(value);
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
    }

    /// Advance one frame
    ///
    /// Returns `true` if the pivot was auto-rotated this frame.
    pub fn tick(&mut self) -> bool {
        self.auto_rotate.tick();
        if !self.auto_rotate.is_enabled() {
            return false;
        }
        let speed = self.config.auto_rotate_speed;
        match self.loaded_pivot_mut() {
            Some(pivot) => {
                pivot.rotation.y += speed;
                true
            }
            None => false,
        }
    }

    /// Record that a model request is in flight
    pub fn begin_load(&mut self, url: impl Into<String>) {
        self.model.begin(url);
    }

    /// Publish the load outcome
    ///
    /// On success the placeholder pivot is replaced by one wrapping the
    /// recentered model, visible at the origin with identity rotation.
    pub fn on_model_loaded(&mut self, result: Result<LoadedModel, ViewerError>) {
        let Some(model) = self.model.complete(result).copied() else {
            return;
        };

        let content = PivotContent {
            mesh: model.mesh,
            offset: centering_offset(&model.bounds),
        };
        let pivot = self.scene.create(
            NodeKind::Pivot {
                content: Some(content),
            },
            Transform::IDENTITY,
        );
        self.scene.destroy(self.pivot);
        self.scene.attach(pivot);
        self.pivot = pivot;
    }

    fn loaded_pivot_mut(&mut self) -> Option<&mut Transform> {
        if !self.model.is_loaded() {
            return None;
        }
        self.scene.node_mut(self.pivot).map(|n| &mut n.transform)
    }

    fn normalize(&self, client: Vec2) -> Vec2 {
        self.config
            .pointer_convention
            .normalize(client, self.viewport)
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

    pub fn pivot(&self) -> NodeId {
        self.pivot
    }

    /// Current pivot transform (identity while the placeholder is shown)
    pub fn pivot_transform(&self) -> Transform {
        self.scene
            .node(self.pivot)
            .map(|n| n.transform)
            .unwrap_or_default()
    }

    pub fn model(&self) -> &ModelSlot {
        &self.model
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn auto_rotate(&self) -> &AutoRotateScheduler {
        &self.auto_rotate
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}
