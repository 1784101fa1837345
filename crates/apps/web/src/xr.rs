//! WebXR bindings for immersive AR with hit-testing
//!
//! Only the surface the AR viewer touches is declared. `web-sys` gates its
//! WebXR types behind unstable APIs and lacks hit-test entirely, so these are
//! declared directly.

use glam::Mat4;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{WebGl2RenderingContext, WebGlFramebuffer};

use crate::dom;
use crate::error::{Result, WebError};

pub const IMMERSIVE_AR: &str = "immersive-ar";

#[wasm_bindgen]
extern "C" {
    /// `navigator`, viewed through its `xr` property
    pub type XrNavigator;

    #[wasm_bindgen(method, getter, js_name = xr)]
    pub fn xr(this: &XrNavigator) -> Option<XrSystem>;

    #[wasm_bindgen(js_name = XRSystem)]
    pub type XrSystem;

    #[wasm_bindgen(method, catch, js_class = "XRSystem", js_name = isSessionSupported)]
    pub fn is_session_supported(this: &XrSystem, mode: &str) -> std::result::Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_class = "XRSystem", js_name = requestSession)]
    pub fn request_session(
        this: &XrSystem,
        mode: &str,
        options: &JsValue,
    ) -> std::result::Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_name = XRSession, extends = web_sys::EventTarget)]
    #[derive(Clone)]
    pub type XrSession;

    #[wasm_bindgen(method, js_class = "XRSession", js_name = requestReferenceSpace)]
    pub fn request_reference_space(this: &XrSession, kind: &str) -> js_sys::Promise;

    #[wasm_bindgen(method, js_class = "XRSession", js_name = requestHitTestSource)]
    pub fn request_hit_test_source(this: &XrSession, options: &JsValue) -> js_sys::Promise;

    #[wasm_bindgen(method, js_class = "XRSession", js_name = requestAnimationFrame)]
    pub fn request_animation_frame(this: &XrSession, callback: &js_sys::Function) -> u32;

    #[wasm_bindgen(method, js_class = "XRSession", js_name = updateRenderState)]
    pub fn update_render_state(this: &XrSession, state: &JsValue);

    #[wasm_bindgen(method, getter, js_class = "XRSession", js_name = renderState)]
    pub fn render_state(this: &XrSession) -> XrRenderState;

    #[wasm_bindgen(method, catch, js_class = "XRSession")]
    pub fn end(this: &XrSession) -> std::result::Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_name = XRRenderState)]
    pub type XrRenderState;

    #[wasm_bindgen(method, getter, js_class = "XRRenderState", js_name = baseLayer)]
    pub fn base_layer(this: &XrRenderState) -> Option<XrWebGlLayer>;

    #[wasm_bindgen(js_name = XRReferenceSpace)]
    #[derive(Clone)]
    pub type XrReferenceSpace;

    #[wasm_bindgen(js_name = XRHitTestSource)]
    #[derive(Clone)]
    pub type XrHitTestSource;

    #[wasm_bindgen(js_name = XRWebGLLayer)]
    pub type XrWebGlLayer;

    #[wasm_bindgen(constructor, catch, js_class = "XRWebGLLayer")]
    pub fn new(
        session: &XrSession,
        context: &WebGl2RenderingContext,
    ) -> std::result::Result<XrWebGlLayer, JsValue>;

    /// `None` means the default framebuffer
    #[wasm_bindgen(method, getter, js_class = "XRWebGLLayer")]
    pub fn framebuffer(this: &XrWebGlLayer) -> Option<WebGlFramebuffer>;

    #[wasm_bindgen(method, js_class = "XRWebGLLayer", js_name = getViewport)]
    pub fn get_viewport(this: &XrWebGlLayer, view: &XrView) -> Option<XrViewport>;

    #[wasm_bindgen(js_name = XRFrame)]
    pub type XrFrame;

    #[wasm_bindgen(method, js_class = "XRFrame", js_name = getViewerPose)]
    pub fn get_viewer_pose(this: &XrFrame, space: &XrReferenceSpace) -> Option<XrViewerPose>;

    #[wasm_bindgen(method, js_class = "XRFrame", js_name = getHitTestResults)]
    pub fn get_hit_test_results(this: &XrFrame, source: &XrHitTestSource) -> js_sys::Array;

    #[wasm_bindgen(js_name = XRViewerPose)]
    pub type XrViewerPose;

    #[wasm_bindgen(method, getter, js_class = "XRViewerPose")]
    pub fn views(this: &XrViewerPose) -> js_sys::Array;

    #[wasm_bindgen(js_name = XRView)]
    pub type XrView;

    #[wasm_bindgen(method, getter, js_class = "XRView")]
    pub fn transform(this: &XrView) -> XrRigidTransform;

    #[wasm_bindgen(method, getter, js_class = "XRView", js_name = projectionMatrix)]
    pub fn projection_matrix(this: &XrView) -> js_sys::Float32Array;

    #[wasm_bindgen(js_name = XRViewport)]
    pub type XrViewport;

    #[wasm_bindgen(method, getter, js_class = "XRViewport")]
    pub fn x(this: &XrViewport) -> i32;

    #[wasm_bindgen(method, getter, js_class = "XRViewport")]
    pub fn y(this: &XrViewport) -> i32;

    #[wasm_bindgen(method, getter, js_class = "XRViewport")]
    pub fn width(this: &XrViewport) -> i32;

    #[wasm_bindgen(method, getter, js_class = "XRViewport")]
    pub fn height(this: &XrViewport) -> i32;

    #[wasm_bindgen(js_name = XRHitTestResult)]
    pub type XrHitTestResult;

    #[wasm_bindgen(method, js_class = "XRHitTestResult", js_name = getPose)]
    pub fn get_pose(this: &XrHitTestResult, base_space: &XrReferenceSpace) -> Option<XrPose>;

    #[wasm_bindgen(js_name = XRPose)]
    pub type XrPose;

    #[wasm_bindgen(method, getter, js_class = "XRPose")]
    pub fn transform(this: &XrPose) -> XrRigidTransform;

    #[wasm_bindgen(js_name = XRRigidTransform)]
    pub type XrRigidTransform;

    /// Column-major 4x4
    #[wasm_bindgen(method, getter, js_class = "XRRigidTransform")]
    pub fn matrix(this: &XrRigidTransform) -> js_sys::Float32Array;
}

/// Read a column-major 4x4 from a typed array
pub fn mat4_from(array: &js_sys::Float32Array) -> Mat4 {
    let mut values = [0.0f32; 16];
    if array.length() == 16 {
        array.copy_to(&mut values);
        Mat4::from_cols_array(&values)
    } else {
        Mat4::IDENTITY
    }
}

/// `navigator.xr`, if the browser exposes WebXR at all
pub fn system() -> Result<XrSystem> {
    let navigator: XrNavigator = dom::window()?.navigator().unchecked_into();
    navigator.xr().ok_or(WebError::Unavailable("navigator.xr"))
}

/// Ask whether an immersive AR session could be granted
pub async fn is_ar_supported() -> Result<bool> {
    let supported = JsFuture::from(system()?.is_session_supported(IMMERSIVE_AR)?).await?;
    Ok(supported.as_bool().unwrap_or(false))
}

/// Request an immersive AR session with hit-testing required
pub async fn request_ar_session() -> Result<XrSession> {
    let features = js_sys::Array::of1(&"hit-test".into());
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"requiredFeatures".into(), &features)?;

    let session = JsFuture::from(system()?.request_session(IMMERSIVE_AR, &options)?).await?;
    Ok(session.unchecked_into())
}

/// Attach a WebGL layer backed by `context` as the session's render target
pub fn bind_gl_layer(session: &XrSession, context: &WebGl2RenderingContext) -> Result<()> {
    let layer = XrWebGlLayer::new(session, context)?;
    let state = js_sys::Object::new();
    js_sys::Reflect::set(&state, &"baseLayer".into(), &layer)?;
    session.update_render_state(&state);
    Ok(())
}

pub async fn reference_space(session: &XrSession, kind: &str) -> Result<XrReferenceSpace> {
    let space = JsFuture::from(session.request_reference_space(kind)).await?;
    Ok(space.unchecked_into())
}

/// Hit-test source casting along the ray of `space`
pub async fn hit_test_source(
    session: &XrSession,
    space: &XrReferenceSpace,
) -> Result<XrHitTestSource> {
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"space".into(), space)?;
    let source = JsFuture::from(session.request_hit_test_source(&options)).await?;
    Ok(source.unchecked_into())
}

/// Ask the device to end `session`; failures are logged
pub fn end_session(session: &XrSession) {
    let promise = match session.end() {
        Ok(promise) => promise,
        Err(e) => {
            tracing::warn!("Failed to end AR session: {}", WebError::from(e));
            return;
        }
    };
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            tracing::warn!("AR session did not end cleanly: {}", WebError::from(e));
        }
    });
}
