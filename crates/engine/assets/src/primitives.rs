//! Procedural meshes

use std::f32::consts::TAU;

use crate::model::MeshData;

const RETICLE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Flat annulus in the XZ plane facing +Y
///
/// Hit-test poses put the surface normal on local +Y, so the ring lies flat
/// on whatever surface the reticle is tracking.
pub fn reticle_ring(inner: f32, outer: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut positions = Vec::with_capacity(segments as usize * 2);

    for i in 0..segments {
        let angle = i as f32 / segments as f32 * TAU;
        let (sin, cos) = angle.sin_cos();
        positions.push([inner * cos, 0.0, inner * sin]);
        positions.push([outer * cos, 0.0, outer * sin]);
    }

    let mut indices = Vec::with_capacity(segments as usize * 6);
    for i in 0..segments {
        let next = (i + 1) % segments;
        let (inner_a, outer_a) = (i * 2, i * 2 + 1);
        let (inner_b, outer_b) = (next * 2, next * 2 + 1);
        indices.extend_from_slice(&[inner_a, outer_b, outer_a]);
        indices.extend_from_slice(&[inner_a, inner_b, outer_b]);
    }

    MeshData {
        normals: vec![[0.0, 1.0, 0.0]; positions.len()],
        positions,
        indices,
        color: RETICLE_COLOR,
    }
}
