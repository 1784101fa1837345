//! Single-shot model download

use std::collections::HashMap;

use assets::{ModelAsset, ModelDocument};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Url};

use crate::dom;
use crate::error::{Result, WebError};

/// Fetch the raw bytes behind `url`
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let window = dom::window()?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await?
        .dyn_into()
        .map_err(|_| WebError::Fetch {
            url: url.to_string(),
            reason: "not a Response".to_string(),
        })?;

    if !response.ok() {
        return Err(WebError::Fetch {
            url: url.to_string(),
            reason: format!("HTTP {} {}", response.status(), response.status_text()),
        });
    }

    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Absolute form of `uri`, resolved against `base`
fn resolve(uri: &str, base: &str) -> Result<String> {
    Ok(Url::new_with_base(uri, base)?.href())
}

/// Fetch and parse a glTF / GLB model
///
/// Buffers the document references by URI are fetched relative to the model
/// itself, so a `.gltf` may sit next to its `.bin`.
pub async fn load_model(url: &str) -> Result<ModelAsset> {
    tracing::debug!("Fetching model {}", url);
    let bytes = fetch_bytes(url).await?;
    tracing::debug!("Fetched {} bytes from {}", bytes.len(), url);

    let document = ModelDocument::from_slice(&bytes)?;
    let external = document.external_buffers();
    let mut buffers = HashMap::with_capacity(external.len());
    if !external.is_empty() {
        let model_url = resolve(url, &dom::window()?.location().href()?)?;
        for (index, uri) in external {
            let buffer_url = resolve(&uri, &model_url)?;
            tracing::debug!("Fetching buffer {} from {}", index, buffer_url);
            buffers.insert(index, fetch_bytes(&buffer_url).await?);
        }
    }

    Ok(document.into_model(buffers)?)
}
