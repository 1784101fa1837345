//! Desktop orbit viewer page
//!
//! Pointer drag rotates, wheel and slider scale, and the model spins while
//! idle. All state lives in one [`DesktopApp`] shared by the listeners and the
//! animation frame loop.

use std::cell::RefCell;
use std::rc::Rc;

use assets::ModelAsset;
use devices::InputEvent;
use viewer::{DesktopViewer, ViewerConfig};
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, HtmlInputElement, PointerEvent, WheelEvent};

use crate::dom;
use crate::error::{Result, WebError};
use crate::fetch;
use crate::gl_renderer::{GlRenderer, BACKGROUND_COLOR};
use crate::ui::SCALE_SLIDER;

struct DesktopApp {
    viewer: DesktopViewer,
    gl: glow::Context,
    renderer: GlRenderer,
    canvas: HtmlCanvasElement,
}

impl DesktopApp {
    fn frame(&mut self) {
        let viewport = dom::fit_canvas(&self.canvas);
        if viewport != self.viewer.viewport() {
            self.viewer.handle_input(&InputEvent::Resize(viewport));
        }
        self.viewer.tick();

        unsafe {
            use glow::HasContext;
            self.gl.viewport(
                0,
                0,
                self.canvas.width() as i32,
                self.canvas.height() as i32,
            );
            self.renderer.render_scene(
                &self.gl,
                self.viewer.scene(),
                self.viewer.camera(),
                BACKGROUND_COLOR,
            );
        }
    }

    fn finish_load(&mut self, url: &str, result: Result<ModelAsset>) {
        let outcome = unsafe { self.renderer.upload_outcome(&self.gl, url, result) };
        self.viewer.on_model_loaded(outcome);
    }
}

pub fn start(canvas_id: &str, config: ViewerConfig) -> Result<()> {
    let canvas: HtmlCanvasElement = dom::element(canvas_id)?;
    let viewport = dom::fit_canvas(&canvas);
    let (_raw, gl) = dom::webgl2(&canvas, false)?;

    let mut renderer = GlRenderer::new();
    unsafe { renderer.init_gl(&gl) }.map_err(WebError::Gl)?;

    let app = Rc::new(RefCell::new(DesktopApp {
        viewer: DesktopViewer::new(config, viewport),
        gl,
        renderer,
        canvas: canvas.clone(),
    }));

    wire_input(&app, &canvas)?;
    spawn_model_load(&app)?;
    start_frame_loop(app)?;

    tracing::info!("Desktop viewer started on #{}", canvas_id);
    Ok(())
}

fn wire_input(app: &Rc<RefCell<DesktopApp>>, canvas: &HtmlCanvasElement) -> Result<()> {
    let target: &EventTarget = canvas.as_ref();

    {
        let app = app.clone();
        let canvas = canvas.clone();
        dom::listen(target, "pointerdown", move |event: PointerEvent| {
            if let Err(e) = canvas.set_pointer_capture(event.pointer_id()) {
                tracing::warn!("Pointer capture failed: {}", WebError::from(e));
            }
            let position = dom::client_position(&canvas, &event);
            app.borrow_mut()
                .viewer
                .handle_input(&InputEvent::PointerDown { position });
        })?;
    }
    {
        let app = app.clone();
        let canvas = canvas.clone();
        dom::listen(target, "pointermove", move |event: PointerEvent| {
            let position = dom::client_position(&canvas, &event);
            app.borrow_mut()
                .viewer
                .handle_input(&InputEvent::PointerMove { position });
        })?;
    }
    for kind in ["pointerup", "pointercancel"] {
        let app = app.clone();
        dom::listen(target, kind, move |_: PointerEvent| {
            app.borrow_mut().viewer.handle_input(&InputEvent::PointerUp);
        })?;
    }
    {
        let app = app.clone();
        dom::listen(target, "wheel", move |event: WheelEvent| {
            event.prevent_default();
            let delta_y = event.delta_y() as f32;
            app.borrow_mut()
                .viewer
                .handle_input(&InputEvent::Wheel { delta_y });
        })?;
    }
    {
        let app = app.clone();
        let window = dom::window()?;
        let window_target: &EventTarget = window.as_ref();
        dom::listen(window_target, "resize", move |_: Event| {
            let mut app = app.borrow_mut();
            let viewport = dom::fit_canvas(&app.canvas);
            app.viewer.handle_input(&InputEvent::Resize(viewport));
        })?;
    }

    match dom::element::<HtmlInputElement>(SCALE_SLIDER) {
        Ok(slider) => {
            let app = app.clone();
            let input = slider.clone();
            let slider_target: &EventTarget = slider.as_ref();
            dom::listen(slider_target, "input", move |_: Event| {
                let value = input.value_as_number() as f32;
                if value.is_finite() {
                    app.borrow_mut()
                        .viewer
                        .handle_input(&InputEvent::ScaleSlider(value));
                }
            })?;
        }
        Err(_) => tracing::debug!("No #{} on page", SCALE_SLIDER),
    }

    Ok(())
}

fn spawn_model_load(app: &Rc<RefCell<DesktopApp>>) -> Result<()> {
    let Some(url) = dom::model_param()? else {
        tracing::info!("No model parameter; viewer stays empty");
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

fn start_frame_loop(app: Rc<RefCell<DesktopApp>>) -> Result<()> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = callback.clone();

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        app.borrow_mut().frame();
        if let Some(cb) = next.borrow().as_ref() {
            if let Err(e) = dom::request_animation_frame(cb) {
                tracing::error!("Frame loop stopped: {}", e);
            }
        }
    }) as Box<dyn FnMut()>));

    let started = match callback.borrow().as_ref() {
        Some(cb) => dom::request_animation_frame(cb).map(|_| ()),
        None => Ok(()),
    };
    started
}
