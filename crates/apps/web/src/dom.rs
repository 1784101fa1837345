//! DOM helpers: element lookup, canvas sizing, listeners, UI panels

use devices::Viewport;
use glam::Vec2;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent, TouchList,
    WebGl2RenderingContext, Window,
};

use crate::error::{Result, WebError};
use crate::ui::ArUiState;

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(WebError::Unavailable("window"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or(WebError::Unavailable("document"))
}

/// Look up an element by id and cast it
pub fn element<T: JsCast>(id: &str) -> Result<T> {
    document()?
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<T>().ok())
        .ok_or_else(|| WebError::MissingElement(id.to_string()))
}

/// Create a WebGL2 context plus its glow wrapper
///
/// The raw context is kept for calls glow cannot express, such as binding
/// the XR layer's framebuffer.
pub fn webgl2(
    canvas: &HtmlCanvasElement,
    xr_compatible: bool,
) -> Result<(WebGl2RenderingContext, glow::Context)> {
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"antialias".into(), &JsValue::TRUE)?;
    js_sys::Reflect::set(&options, &"alpha".into(), &JsValue::TRUE)?;
    js_sys::Reflect::set(&options, &"xrCompatible".into(), &JsValue::from_bool(xr_compatible))?;

    let raw = canvas
        .get_context_with_context_options("webgl2", &options)?
        .ok_or(WebError::Unavailable("webgl2"))?
        .dyn_into::<WebGl2RenderingContext>()
        .map_err(|_| WebError::Unavailable("webgl2"))?;
    let gl = glow::Context::from_webgl2_context(raw.clone());
    Ok((raw, gl))
}

/// Match the drawing buffer to the displayed size; returns the CSS size
pub fn fit_canvas(canvas: &HtmlCanvasElement) -> Viewport {
    let rect = canvas.get_bounding_client_rect();
    let ratio = web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0);

    let width = (rect.width() * ratio).round().max(1.0) as u32;
    let height = (rect.height() * ratio).round().max(1.0) as u32;
    if canvas.width() != width || canvas.height() != height {
        canvas.set_width(width);
        canvas.set_height(height);
    }

    Viewport::new(rect.width() as f32, rect.height() as f32)
}

/// Window inner size; touches are reported against the whole page
pub fn window_viewport() -> Result<Viewport> {
    let window = window()?;
    let width = window.inner_width()?.as_f64().unwrap_or(1.0);
    let height = window.inner_height()?.as_f64().unwrap_or(1.0);
    Ok(Viewport::new(width as f32, height as f32))
}

/// Pointer position relative to the canvas, in CSS pixels
pub fn client_position(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(
        (event.client_x() as f64 - rect.left()) as f32,
        (event.client_y() as f64 - rect.top()) as f32,
    )
}

/// Active touches in client pixels, in list order
pub fn touch_points(touches: &TouchList) -> Vec<Vec2> {
    (0..touches.length())
        .filter_map(|i| touches.get(i))
        .map(|t| Vec2::new(t.client_x() as f32, t.client_y() as f32))
        .collect()
}

/// Register a listener for the page's lifetime
pub fn listen<E, F>(target: &EventTarget, kind: &str, handler: F) -> Result<()>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    listen_scoped(target, kind, handler)?.forget();
    Ok(())
}

/// Register a listener owned by the caller
///
/// Remove it with [`unlisten`] before dropping the closure, and never drop it
/// from inside its own invocation.
pub fn listen_scoped<E, F>(target: &EventTarget, kind: &str, handler: F) -> Result<Closure<dyn FnMut(E)>>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    Ok(closure)
}

pub fn unlisten<E>(target: &EventTarget, kind: &str, closure: &Closure<dyn FnMut(E)>) -> Result<()>
where
    E: FromWasmAbi + 'static,
{
    target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    Ok(())
}

pub fn request_animation_frame(callback: &Closure<dyn FnMut()>) -> Result<i32> {
    Ok(window()?.request_animation_frame(callback.as_ref().unchecked_ref())?)
}

/// Value of `?model=` in the page URL
pub fn model_param() -> Result<Option<String>> {
    let search = window()?.location().search()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search)?;
    Ok(params.get("model").filter(|url| !url.is_empty()))
}

/// Show or hide the AR page panels for a state
///
/// Missing elements are skipped so pages may omit panels they don't use.
pub fn apply_ui(state: ArUiState) -> Result<()> {
    let document = document()?;
    for (id, visible) in state.visibility().entries() {
        if let Some(element) = document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        {
            element.set_hidden(!visible);
        }
    }

    if let Some(body) = document.body() {
        let classes = body.class_list();
        for (class, present) in state.body_classes() {
            classes.toggle_with_force(class, present)?;
        }
    }
    Ok(())
}
