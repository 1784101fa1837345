use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssetError>;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("Mesh primitive {mesh}/{primitive} has no positions")]
    MissingPositions { mesh: usize, primitive: usize },

    #[error("Buffer {buffer} ({uri}) was not supplied")]
    MissingBuffer { buffer: usize, uri: String },

    #[error("Buffer {buffer} holds {actual} bytes, expected {expected}")]
    BufferLength {
        buffer: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Model contains no triangle geometry")]
    Empty,
}
