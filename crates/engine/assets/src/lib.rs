//! Model assets for the viewers
//!
//! Turns glTF / GLB bytes into flat triangle meshes ready for upload, and
//! builds the procedural reticle ring used by the AR viewer.

pub mod error;
pub mod model;
pub mod primitives;

pub use error::{AssetError, Result};
pub use model::{parse_model, MeshData, ModelAsset, ModelDocument};
pub use primitives::reticle_ring;
