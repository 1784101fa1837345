//! glTF / GLB model parsing
//!
//! The default scene is flattened: every triangle primitive becomes one
//! [`MeshData`] with its node's world matrix baked into the vertices, so the
//! renderer only has to apply the pivot transform.

use std::collections::HashMap;

use glam::{Mat3, Mat4, Vec3};
use gltf::mesh::Mode;
use viewer::Aabb;

use crate::error::{AssetError, Result};

/// One drawable triangle list with a flat base color
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Linear RGBA base color factor
    pub color: [f32; 4],
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().map(|&p| Vec3::from(p)))
    }
}

/// A parsed model in model space
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAsset {
    pub meshes: Vec<MeshData>,
    pub bounds: Aabb,
}

/// A parsed glTF document whose buffers may still live elsewhere
///
/// `.glb` blobs and `data:` URIs resolve in place. Buffers referenced by a
/// relative or absolute URI are listed by [`ModelDocument::external_buffers`]
/// and must be supplied by the caller, which knows where the model came from.
pub struct ModelDocument {
    gltf: gltf::Gltf,
}

impl ModelDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            gltf: gltf::Gltf::from_slice(bytes)?,
        })
    }

    /// `(buffer index, uri)` for every buffer not carried by the document
    pub fn external_buffers(&self) -> Vec<(usize, String)> {
        self.gltf
            .document
            .buffers()
            .filter_map(|buffer| match buffer.source() {
                gltf::buffer::Source::Uri(uri) if !uri.starts_with("data:") => {
                    Some((buffer.index(), uri.to_string()))
                }
                _ => None,
            })
            .collect()
    }

    /// Resolve all buffers and flatten the default scene
    ///
    /// `external` holds the bytes of each buffer listed by
    /// [`ModelDocument::external_buffers`], keyed by buffer index.
    pub fn into_model(self, mut external: HashMap<usize, Vec<u8>>) -> Result<ModelAsset> {
        let gltf::Gltf { document, mut blob } = self.gltf;

        let mut buffers = Vec::new();
        for buffer in document.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Uri(uri) if !uri.starts_with("data:") => external
                    .remove(&buffer.index())
                    .map(gltf::buffer::Data)
                    .ok_or_else(|| AssetError::MissingBuffer {
                        buffer: buffer.index(),
                        uri: uri.to_string(),
                    })?,
                source => gltf::buffer::Data::from_source_and_blob(source, None, &mut blob)?,
            };
            if data.len() < buffer.length() {
                return Err(AssetError::BufferLength {
                    buffer: buffer.index(),
                    expected: buffer.length(),
                    actual: data.len(),
                });
            }
            buffers.push(data);
        }

        flatten(&document, &buffers)
    }
}

/// Parse a self-contained `.gltf` (embedded or data-URI buffers) or `.glb`
pub fn parse_model(bytes: &[u8]) -> Result<ModelAsset> {
    ModelDocument::from_slice(bytes)?.into_model(HashMap::new())
}

fn flatten(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<ModelAsset> {
    let Some(scene) = document
        .default_scene()
        .or_else(|| document.scenes().next())
    else {
        return Err(AssetError::Empty);
    };

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, buffers, &mut meshes)?;
    }

    if meshes.is_empty() {
        return Err(AssetError::Empty);
    }

    let bounds = meshes
        .iter()
        .fold(Aabb::EMPTY, |acc, mesh| acc.union(&mesh.bounds()));

    tracing::debug!(
        "Parsed model: {} meshes, {} triangles, bounds {:?}",
        meshes.len(),
        meshes.iter().map(MeshData::triangle_count).sum::<usize>(),
        bounds
    );

    Ok(ModelAsset { meshes, bounds })
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) -> Result<()> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                tracing::debug!(
                    "Skipping {:?} primitive {} of mesh {}",
                    primitive.mode(),
                    primitive.index(),
                    mesh.index()
                );
                continue;
            }
            if let Some(data) = read_primitive(&mesh, &primitive, world, buffers)? {
                out.push(data);
            }
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out)?;
    }
    Ok(())
}

fn read_primitive(
    mesh: &gltf::Mesh,
    primitive: &gltf::Primitive,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Result<Option<MeshData>> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .ok_or(AssetError::MissingPositions {
            mesh: mesh.index(),
            primitive: primitive.index(),
        })?
        .map(|p| world.transform_point3(Vec3::from(p)))
        .collect();
    if positions.is_empty() {
        return Ok(None);
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let color = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();

    let data = match reader.read_normals() {
        Some(normals) => {
            let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
            MeshData {
                positions: positions.iter().map(|p| p.to_array()).collect(),
                normals: normals
                    .map(|n| (normal_matrix * Vec3::from(n)).normalize_or_zero().to_array())
                    .collect(),
                indices,
                color,
            }
        }
        None => flat_shaded(&positions, &indices, color),
    };
    Ok(Some(data))
}

/// Unroll indexed triangles so every face gets its own normal
fn flat_shaded(positions: &[Vec3], indices: &[u32], color: [f32; 4]) -> MeshData {
    let mut out_positions = Vec::with_capacity(indices.len());
    let mut out_normals = Vec::with_capacity(indices.len());

    for tri in indices.chunks_exact(3) {
        let corners = [
            positions.get(tri[0] as usize),
            positions.get(tri[1] as usize),
            positions.get(tri[2] as usize),
        ];
        let [Some(&a), Some(&b), Some(&c)] = corners else {
            continue;
        };
        let normal = (b - a).cross(c - a).normalize_or_zero().to_array();
        for p in [a, b, c] {
            out_positions.push(p.to_array());
            out_normals.push(normal);
        }
    }

    let indices = (0..out_positions.len() as u32).collect();
    MeshData {
        positions: out_positions,
        normals: out_normals,
        indices,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_shading_unrolls_shared_vertices() {
        // Quad split into two triangles sharing an edge
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mesh = flat_shaded(&positions, &[0, 1, 2, 0, 2, 3], [1.0; 4]);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_flat_shading_drops_out_of_range_triangles() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let mesh = flat_shaded(&positions, &[0, 1, 2, 0, 1, 7], [1.0; 4]);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_mesh_bounds() {
        let mesh = MeshData {
            positions: vec![[-1.0, 0.0, 2.0], [3.0, -2.0, 0.0]],
            normals: vec![[0.0, 1.0, 0.0]; 2],
            indices: vec![],
            color: [1.0; 4],
        };
        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 0.0, 2.0));
    }
}
