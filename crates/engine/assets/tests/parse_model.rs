//! Parsing small embedded glTF documents

use std::collections::HashMap;

use assets::{parse_model, AssetError, ModelDocument};
use glam::Vec3;

/// Positions (0,0,0) (2,0,0) (0,4,2) as little-endian f32
const TRIANGLE_BUFFER: &str =
    "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAAAAQAAAAAAAAAAAAAAAAAAAgEAAAABA";

/// Same positions followed by u16 indices 0 1 2 and two bytes of padding
const INDEXED_BUFFER: &str = "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAAAAQAAAAAAAAAAAAAAAAAAAgEAAAABAAAABAAIAAAA=";

fn triangle_gltf(nodes: &str, scene_nodes: &str, mode: u32) -> String {
    triangle_gltf_with_buffer(TRIANGLE_BUFFER, nodes, scene_nodes, mode)
}

fn triangle_gltf_with_buffer(uri: &str, nodes: &str, scene_nodes: &str, mode: u32) -> String {
    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [ {{ "nodes": {scene_nodes} }} ],
  "nodes": {nodes},
  "meshes": [ {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "mode": {mode} }} ] }} ],
  "buffers": [ {{ "byteLength": 36, "uri": "{uri}" }} ],
  "bufferViews": [ {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }} ],
  "accessors": [ {{
    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
    "min": [0.0, 0.0, 0.0], "max": [2.0, 4.0, 2.0]
  }} ]
}}"#
    )
}

#[test]
fn test_triangle_bounds_and_generated_indices() {
    let source = triangle_gltf(r#"[ { "mesh": 0 } ]"#, "[0]", 4);
    let model = parse_model(source.as_bytes()).unwrap();

    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.bounds.min, Vec3::ZERO);
    assert_eq!(model.bounds.max, Vec3::new(2.0, 4.0, 2.0));
    assert_eq!(model.bounds.center(), Vec3::new(1.0, 2.0, 1.0));

    let mesh = &model.meshes[0];
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.color, [1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn test_missing_normals_are_computed_flat() {
    let source = triangle_gltf(r#"[ { "mesh": 0 } ]"#, "[0]", 4);
    let model = parse_model(source.as_bytes()).unwrap();

    // (2,0,0) x (0,4,2) = (0,-4,8)
    let expected = Vec3::new(0.0, -4.0, 8.0).normalize();
    for n in &model.meshes[0].normals {
        assert!(Vec3::from(*n).abs_diff_eq(expected, 1e-5));
    }
}

#[test]
fn test_node_hierarchy_is_baked() {
    let nodes = r#"[
    { "translation": [10.0, 0.0, 0.0], "children": [1] },
    { "translation": [0.0, 1.0, 0.0], "scale": [2.0, 2.0, 2.0], "mesh": 0 }
  ]"#;
    let source = triangle_gltf(nodes, "[0]", 4);
    let model = parse_model(source.as_bytes()).unwrap();

    assert_eq!(model.bounds.min, Vec3::new(10.0, 1.0, 0.0));
    assert_eq!(model.bounds.max, Vec3::new(14.0, 9.0, 4.0));
}

#[test]
fn test_indexed_primitive_with_material() {
    let source = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scenes": [ {{ "nodes": [0] }} ],
  "nodes": [ {{ "mesh": 0 }} ],
  "materials": [ {{ "pbrMetallicRoughness": {{ "baseColorFactor": [0.5, 0.25, 1.0, 1.0] }} }} ],
  "meshes": [ {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 0 }} ] }} ],
  "buffers": [ {{ "byteLength": 44, "uri": "{INDEXED_BUFFER}" }} ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [2.0, 4.0, 2.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#
    );
    let model = parse_model(source.as_bytes()).unwrap();

    let mesh = &model.meshes[0];
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.color, [0.5, 0.25, 1.0, 1.0]);
}

#[test]
fn test_non_triangle_primitives_are_skipped() {
    // mode 0 = POINTS
    let source = triangle_gltf(r#"[ { "mesh": 0 } ]"#, "[0]", 0);
    assert!(matches!(
        parse_model(source.as_bytes()),
        Err(AssetError::Empty)
    ));
}

#[test]
fn test_document_without_scenes_is_empty() {
    let source = r#"{ "asset": { "version": "2.0" } }"#;
    assert!(matches!(
        parse_model(source.as_bytes()),
        Err(AssetError::Empty)
    ));
}

#[test]
fn test_garbage_is_a_gltf_error() {
    assert!(matches!(
        parse_model(b"not a model"),
        Err(AssetError::Gltf(_))
    ));
}

fn triangle_bytes() -> Vec<u8> {
    [0.0f32, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 4.0, 2.0]
        .iter()
        .flat_map(|f| f.to_le_bytes())
        .collect()
}

#[test]
fn test_embedded_document_needs_no_external_buffers() {
    let source = triangle_gltf(r#"[ { "mesh": 0 } ]"#, "[0]", 4);
    let document = ModelDocument::from_slice(source.as_bytes()).unwrap();
    assert!(document.external_buffers().is_empty());
}

#[test]
fn test_external_buffer_is_supplied_by_caller() {
    let source = triangle_gltf_with_buffer("chair.bin", r#"[ { "mesh": 0 } ]"#, "[0]", 4);
    let document = ModelDocument::from_slice(source.as_bytes()).unwrap();
    assert_eq!(document.external_buffers(), vec![(0, "chair.bin".to_string())]);

    let model = document
        .into_model(HashMap::from([(0, triangle_bytes())]))
        .unwrap();
    assert_eq!(model.bounds.center(), Vec3::new(1.0, 2.0, 1.0));
    assert_eq!(model.meshes[0].indices, vec![0, 1, 2]);
}

#[test]
fn test_unsupplied_external_buffer_is_reported() {
    let source = triangle_gltf_with_buffer("chair.bin", r#"[ { "mesh": 0 } ]"#, "[0]", 4);
    let result = parse_model(source.as_bytes());
    assert!(matches!(
        result,
        Err(AssetError::MissingBuffer { buffer: 0, ref uri }) if uri == "chair.bin"
    ));
}

#[test]
fn test_short_external_buffer_is_rejected() {
    let source = triangle_gltf_with_buffer("chair.bin", r#"[ { "mesh": 0 } ]"#, "[0]", 4);
    let document = ModelDocument::from_slice(source.as_bytes()).unwrap();
    let result = document.into_model(HashMap::from([(0, vec![0u8; 12])]));
    assert!(matches!(
        result,
        Err(AssetError::BufferLength { buffer: 0, expected: 36, actual: 12 })
    ));
}
