//! WebXR AR viewer page
//!
//! Flow: capability check, "enter AR" button, session request chain, then
//! one XR animation frame per device frame. The session owns the frame loop;
//! once it ends, nothing re-arms it.

use std::cell::RefCell;
use std::rc::Rc;

use assets::ModelAsset;
use devices::InputEvent;
use glam::Mat4;
use viewer::{ArViewer, Camera, FrameReport, Scene, ViewerConfig, ViewerPose, XrFrameHost};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlCanvasElement, HtmlElement, TouchEvent, WebGl2RenderingContext};

use crate::dom;
use crate::error::{Result, WebError};
use crate::fetch;
use crate::gl_renderer::{GlRenderer, TRANSPARENT};
use crate::ui::{ArUiState, ENTER_AR};
use crate::xr::{
    self, XrFrame, XrHitTestResult, XrHitTestSource, XrReferenceSpace, XrSession, XrView,
    XrWebGlLayer,
};

type FrameCallback = Closure<dyn FnMut(f64, XrFrame)>;
type SessionListener = Closure<dyn FnMut(Event)>;

/// Device resources and callbacks held for one session
struct XrHandles {
    session: XrSession,
    local_space: XrReferenceSpace,
    hit_test_source: XrHitTestSource,
    /// Re-arms itself through this cell; emptied on release
    frame_callback: Rc<RefCell<Option<FrameCallback>>>,
    listeners: Vec<(&'static str, SessionListener)>,
}

impl XrHandles {
    /// Detach the session listeners and break the frame callback's cycle
    fn release(self) {
        let target: &EventTarget = self.session.as_ref();
        for (kind, listener) in &self.listeners {
            if let Err(e) = dom::unlisten(target, kind, listener) {
                tracing::warn!("Failed to remove session {} listener: {}", kind, e);
            }
        }
        self.frame_callback.borrow_mut().take();
    }
}

struct ArApp {
    viewer: ArViewer,
    raw_gl: WebGl2RenderingContext,
    gl: glow::Context,
    renderer: GlRenderer,
    ui: ArUiState,
    xr: Option<XrHandles>,
    /// A session request chain is in flight
    requesting: bool,
}

impl ArApp {
    fn set_ui(&mut self, next: ArUiState) {
        self.ui = self.ui.transition(next);
        if let Err(e) = dom::apply_ui(self.ui) {
            tracing::warn!("Failed to update AR panels: {}", e);
        }
    }

    fn xr_frame(&mut self, frame: &XrFrame, callback: Option<&FrameCallback>) {
        let Some(handles) = self.xr.as_ref() else {
            return;
        };

        let mut host = FrameHost {
            handles,
            frame,
            callback,
            raw_gl: &self.raw_gl,
            gl: &self.gl,
            renderer: &self.renderer,
            layer: None,
            view: None,
        };
        let report = self.viewer.on_xr_frame(&mut host);

        if report == (FrameReport::Rendered { stabilized_now: true }) {
            self.set_ui(ArUiState::InAr { stabilized: true });
        }
    }

    fn end_session(&mut self) {
        if let Some(handles) = self.xr.take() {
            // Called from the session's own `end` listener, which must outlive this call
            wasm_bindgen_futures::spawn_local(async move { handles.release() });
        }
        self.viewer.end_session();
        self.raw_gl
            .bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, None);
        self.set_ui(ArUiState::EnterAr);
    }

    fn finish_load(&mut self, url: &str, result: Result<ModelAsset>) {
        let outcome = unsafe { self.renderer.upload_outcome(&self.gl, url, result) };
        self.viewer.on_model_loaded(outcome);
    }
}

/// Platform side of one XR animation frame
struct FrameHost<'a> {
    handles: &'a XrHandles,
    frame: &'a XrFrame,
    callback: Option<&'a FrameCallback>,
    raw_gl: &'a WebGl2RenderingContext,
    gl: &'a glow::Context,
    renderer: &'a GlRenderer,
    layer: Option<XrWebGlLayer>,
    view: Option<XrView>,
}

impl XrFrameHost for FrameHost<'_> {
    fn request_next_frame(&mut self) {
        if let Some(callback) = self.callback {
            self.handles
                .session
                .request_animation_frame(callback.as_ref().unchecked_ref());
        }
    }

    fn bind_target_surface(&mut self) {
        self.layer = self.handles.session.render_state().base_layer();
        let framebuffer = self.layer.as_ref().and_then(|layer| layer.framebuffer());
        self.raw_gl
            .bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, framebuffer.as_ref());
    }

    fn viewer_pose(&mut self) -> Option<ViewerPose> {
        let pose = self.frame.get_viewer_pose(&self.handles.local_space)?;
        let view = pose.views().get(0);
        if view.is_undefined() {
            return None;
        }
        let view: XrView = view.unchecked_into();

        let viewer_pose = ViewerPose {
            transform: xr::mat4_from(&view.transform().matrix()),
            projection: xr::mat4_from(&view.projection_matrix()),
        };
        self.view = Some(view);
        Some(viewer_pose)
    }

    fn hit_test_results(&mut self) -> Vec<Mat4> {
        self.frame
            .get_hit_test_results(&self.handles.hit_test_source)
            .iter()
            .filter_map(|result| {
                result
                    .unchecked_into::<XrHitTestResult>()
                    .get_pose(&self.handles.local_space)
            })
            .map(|pose| xr::mat4_from(&pose.transform().matrix()))
            .collect()
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) {
        unsafe {
            use glow::HasContext;
            if let (Some(layer), Some(view)) = (&self.layer, &self.view) {
                if let Some(viewport) = layer.get_viewport(view) {
                    self.gl.viewport(
                        viewport.x(),
                        viewport.y(),
                        viewport.width(),
                        viewport.height(),
                    );
                }
            }
            self.renderer
                .render_scene(self.gl, scene, camera, TRANSPARENT);
        }
    }
}

pub fn start(canvas_id: &str, config: ViewerConfig) -> Result<()> {
    let canvas: HtmlCanvasElement = dom::element(canvas_id)?;
    dom::fit_canvas(&canvas);
    let (raw_gl, gl) = dom::webgl2(&canvas, true)?;

    let mut renderer = GlRenderer::new();
    unsafe { renderer.init_gl(&gl) }.map_err(WebError::Gl)?;

    let app = Rc::new(RefCell::new(ArApp {
        viewer: ArViewer::new(config, dom::window_viewport()?),
        raw_gl,
        gl,
        renderer,
        ui: ArUiState::Checking,
        xr: None,
        requesting: false,
    }));
    app.borrow_mut().set_ui(ArUiState::Checking);

    spawn_capability_check(&app);
    wire_page(&app)?;
    spawn_model_load(&app)?;

    tracing::info!("AR viewer started on #{}", canvas_id);
    Ok(())
}

fn spawn_capability_check(app: &Rc<RefCell<ArApp>>) {
    let app = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let next = match xr::is_ar_supported().await {
            Ok(true) => ArUiState::EnterAr,
            Ok(false) => {
                tracing::warn!("Immersive AR is not supported on this device");
                ArUiState::Unsupported
            }
            Err(e) => {
                tracing::warn!("AR capability check failed: {}", e);
                ArUiState::Unsupported
            }
        };
        app.borrow_mut().set_ui(next);
    });
}

fn wire_page(app: &Rc<RefCell<ArApp>>) -> Result<()> {
    match dom::element::<HtmlElement>(ENTER_AR) {
        Ok(button) => {
            let app = app.clone();
            let target: &EventTarget = button.as_ref();
            dom::listen(target, "click", move |_: Event| {
                wasm_bindgen_futures::spawn_local(enter_ar(app.clone()));
            })?;
        }
        Err(_) => tracing::warn!("No #{} button on page", ENTER_AR),
    }

    let window = dom::window()?;
    let window_target: &EventTarget = window.as_ref();

    for kind in ["touchstart", "touchmove", "touchend", "touchcancel"] {
        let app = app.clone();
        dom::listen(window_target, kind, move |event: TouchEvent| {
            let points = dom::touch_points(&event.touches());
            let input = match event.type_().as_str() {
                "touchstart" => InputEvent::TouchStart(points),
                "touchmove" => InputEvent::TouchMove(points),
                _ => InputEvent::TouchEnd(points),
            };
            app.borrow_mut().viewer.handle_input(&input);
        })?;
    }

    {
        let app = app.clone();
        dom::listen(window_target, "resize", move |_: Event| match dom::window_viewport() {
            Ok(viewport) => app
                .borrow_mut()
                .viewer
                .handle_input(&InputEvent::Resize(viewport)),
            Err(e) => tracing::warn!("Resize ignored: {}", e),
        })?;
    }

    Ok(())
}

fn spawn_model_load(app: &Rc<RefCell<ArApp>>) -> Result<()> {
    let Some(url) = dom::model_param()? else {
        tracing::info!("No model parameter; nothing to place");
        return Ok(());
    };

    app.borrow_mut().viewer.begin_load(url.as_str());
    let app = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = fetch::load_model(&url).await;
        app.borrow_mut().finish_load(&url, result);
    });
    Ok(())
}

/// Run the session request chain; any failure lands on the unsupported panel
async fn enter_ar(app: Rc<RefCell<ArApp>>) {
    {
        let mut state = app.borrow_mut();
        if state.requesting || state.xr.is_some() {
            return;
        }
        state.requesting = true;
    }

    let result = open_session(&app).await;

    let mut state = app.borrow_mut();
    state.requesting = false;
    if let Err(e) = result {
        tracing::warn!("AR session request failed: {}", e);
        state.set_ui(ArUiState::Unsupported);
    }
}

async fn open_session(app: &Rc<RefCell<ArApp>>) -> Result<()> {
    let session = xr::request_ar_session().await?;

    match acquire_handles(app, &session).await {
        Ok(handles) => {
            let first = handles.frame_callback.clone();
            {
                let mut state = app.borrow_mut();
                state.xr = Some(handles);
                state.viewer.start_session();
                state.set_ui(ArUiState::InAr { stabilized: false });
            }
            let first = first.borrow();
            if let Some(cb) = first.as_ref() {
                session.request_animation_frame(cb.as_ref().unchecked_ref());
            }
            Ok(())
        }
        Err(e) => {
            // Granted but unusable; hand the device back
            xr::end_session(&session);
            Err(e)
        }
    }
}

async fn acquire_handles(app: &Rc<RefCell<ArApp>>, session: &XrSession) -> Result<XrHandles> {
    let raw_gl = app.borrow().raw_gl.clone();
    xr::bind_gl_layer(session, &raw_gl)?;

    let local_space = xr::reference_space(session, "local").await?;
    let viewer_space = xr::reference_space(session, "viewer").await?;
    let hit_test_source = xr::hit_test_source(session, &viewer_space).await?;

    Ok(XrHandles {
        session: session.clone(),
        local_space,
        hit_test_source,
        frame_callback: frame_callback(app.clone()),
        listeners: wire_session(app, session)?,
    })
}

fn wire_session(
    app: &Rc<RefCell<ArApp>>,
    session: &XrSession,
) -> Result<Vec<(&'static str, SessionListener)>> {
    let target: &EventTarget = session.as_ref();

    let select = {
        let app = app.clone();
        dom::listen_scoped(target, "select", move |_: Event| {
            app.borrow_mut().viewer.handle_input(&InputEvent::Tap);
        })?
    };
    let end = {
        let app = app.clone();
        dom::listen_scoped(target, "end", move |_: Event| {
            app.borrow_mut().end_session();
        })?
    };
    Ok(vec![("select", select), ("end", end)])
}

/// XR frame callback that re-arms itself through the shared cell
fn frame_callback(app: Rc<RefCell<ArApp>>) -> Rc<RefCell<Option<FrameCallback>>> {
    let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let next = callback.clone();

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_time: f64, frame: XrFrame| {
        let next = next.borrow();
        app.borrow_mut().xr_frame(&frame, next.as_ref());
    }) as Box<dyn FnMut(f64, XrFrame)>));

    callback
}
