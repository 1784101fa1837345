use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T> = std::result::Result<T, WebError>;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("JavaScript error: {0}")]
    Js(String),

    #[error("Element #{0} not found")]
    MissingElement(String),

    #[error("Browser API unavailable: {0}")]
    Unavailable(&'static str),

    #[error("GL error: {0}")]
    Gl(String),

    #[error("Fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error(transparent)]
    Viewer(#[from] viewer::ViewerError),

    #[error(transparent)]
    Asset(#[from] assets::AssetError),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{:?}", value));
        WebError::Js(message)
    }
}

impl From<WebError> for JsValue {
    fn from(error: WebError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}
