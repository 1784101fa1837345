//! Single-shot asynchronous model load state
//!
//! The browser fetches and parses the asset on its own task and reports the
//! outcome here. Controllers only ever ask "is a model present".

use crate::bounds::Aabb;
use crate::error::ViewerError;
use crate::scene::MeshId;

/// A parsed, uploaded model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadedModel {
    pub mesh: MeshId,
    pub bounds: Aabb,
}

/// Completion state of the model load
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    /// No model requested (no `?model=` parameter)
    #[default]
    Idle,
    /// Request in flight
    Pending { url: String },
    /// Model available
    Loaded(LoadedModel),
    /// Request failed; the viewer stays in its pre-load state
    Failed { url: String, reason: String },
}

/// Holds the load state for one viewer
#[derive(Debug, Clone, Default)]
pub struct ModelSlot {
    state: LoadState,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a request as in flight
    pub fn begin(&mut self, url: impl Into<String>) {
        let url = url.into();
        tracing::debug!("Loading model from {}", url);
        self.state = LoadState::Pending { url };
    }

    /// Record the outcome of the request
    ///
    /// Returns the model on success. A second completion after a model is
    /// already loaded is ignored.
    pub fn complete(
        &mut self,
        result: Result<LoadedModel, ViewerError>,
    ) -> Option<&LoadedModel> {
        if self.is_loaded() {
            tracing::warn!("Ignoring model completion: a model is already loaded");
            return None;
        }

        let url = match &self.state {
            LoadState::Pending { url } => url.clone(),
            _ => String::new(),
        };

        match result {
            Ok(model) => {
                tracing::info!("Model loaded from {}", url);
                self.state = LoadState::Loaded(model);
            }
            Err(e) => {
                tracing::error!("{}", e);
                self.state = LoadState::Failed {
                    url,
                    reason: e.to_string(),
                };
            }
        }

        self.model()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded(_))
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        match &self.state {
            LoadState::Loaded(model) => Some(model),
            _ => None,
        }
    }
}
