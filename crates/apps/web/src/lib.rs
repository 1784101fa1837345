//! Browser entry points for the model viewers
//!
//! - [`start_desktop_viewer`]: orbit viewer driven by mouse drag, wheel and a scale slider
//! - [`start_ar_viewer`]: WebXR hit-test viewer with tap-to-place and touch gestures
//!
//! Both read the model URL from the page's `?model=` parameter and accept an
//! optional RON string overriding the variant's default [`ViewerConfig`].

pub mod error;
pub mod gl_renderer;
pub mod shader_utils;
pub mod ui;

#[cfg(target_arch = "wasm32")]
mod ar_app;
#[cfg(target_arch = "wasm32")]
mod desktop_app;
#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(target_arch = "wasm32")]
pub mod xr;

pub use error::{Result, WebError};
pub use ui::ArUiState;

use viewer::ViewerConfig;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

/// Variant preset with an optional RON override applied on top
pub fn resolve_config(base: ViewerConfig, config_ron: Option<&str>) -> Result<ViewerConfig> {
    match config_ron.map(str::trim).filter(|s| !s.is_empty()) {
        Some(source) => Ok(ViewerConfig::from_ron(base, source)?),
        None => Ok(base),
    }
}

/// Start the desktop orbit viewer on the canvas with id `canvas_id`
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_desktop_viewer(
    canvas_id: &str,
    config_ron: Option<String>,
) -> std::result::Result<(), JsValue> {
    let config = resolve_config(ViewerConfig::desktop(), config_ron.as_deref())?;
    desktop_app::start(canvas_id, config)?;
    Ok(())
}

/// Start the AR viewer on the canvas with id `canvas_id`
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_ar_viewer(
    canvas_id: &str,
    config_ron: Option<String>,
) -> std::result::Result<(), JsValue> {
    let config = resolve_config(ViewerConfig::ar(), config_ron.as_deref())?;
    ar_app::start(canvas_id, config)?;
    Ok(())
}
