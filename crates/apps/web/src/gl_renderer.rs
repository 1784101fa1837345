//! WebGL2 scene renderer
//!
//! Draws the viewer's [`Scene`] with flat base colors and a single
//! directional light plus ambient. Model meshes are uploaded once per load
//! and addressed through the [`MeshId`] stored on pivot nodes; the reticle
//! ring is uploaded at init.

use assets::{reticle_ring, MeshData, ModelAsset};
use glam::{Mat4, Vec3};
use glow::*;
use viewer::{Camera, LoadedModel, MeshId, NodeKind, Scene, ViewerError};

use crate::error::WebError;
use crate::shader_utils::{create_program, GlProgram};

type GlBuffer = <Context as HasContext>::Buffer;
type GlVertexArray = <Context as HasContext>::VertexArray;

/// Directional light, normalize(0.5, 1.0, 0.3)
pub const LIGHT_DIR: Vec3 = Vec3::new(0.431934, 0.863868, 0.259161);
pub const AMBIENT: f32 = 0.3;
pub const DIFFUSE_STRENGTH: f32 = 0.7;

/// Desktop clear color
pub const BACKGROUND_COLOR: [f32; 4] = [0.4, 0.5, 0.6, 1.0];
/// AR clear color; the camera feed shows through
pub const TRANSPARENT: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

/// Reticle ring radii in meters
const RETICLE_INNER: f32 = 0.15;
const RETICLE_OUTER: f32 = 0.2;
const RETICLE_SEGMENTS: u32 = 32;

/// Floats per interleaved vertex: position(3) normal(3)
const VERTEX_STRIDE: i32 = 6 * std::mem::size_of::<f32>() as i32;

/// One uploaded triangle list
struct GlMesh {
    vao: GlVertexArray,
    vbo: GlBuffer,
    ebo: GlBuffer,
    index_count: i32,
    color: [f32; 4],
}

/// Renderer state; all methods expect the context they were created with
pub struct GlRenderer {
    program: Option<GlProgram>,
    /// Uploaded models, indexed by `MeshId`
    models: Vec<Vec<GlMesh>>,
    reticle: Option<GlMesh>,
}

impl Default for GlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlRenderer {
    pub fn new() -> Self {
        Self {
            program: None,
            models: Vec::new(),
            reticle: None,
        }
    }

    /// Compile shaders and upload the reticle
    ///
    /// # Safety
    /// Requires a live GL context
    pub unsafe fn init_gl(&mut self, gl: &Context) -> Result<(), String> {
        self.program = Some(create_program(gl, VERTEX_SHADER, FRAGMENT_SHADER)?);
        let ring = reticle_ring(RETICLE_INNER, RETICLE_OUTER, RETICLE_SEGMENTS);
        self.reticle = Some(upload_mesh(gl, &ring)?);
        tracing::debug!("GL renderer initialized");
        Ok(())
    }

    /// Upload every mesh of a parsed model
    ///
    /// # Safety
    /// Requires a live GL context
    pub unsafe fn upload_model(&mut self, gl: &Context, model: &ModelAsset) -> Result<MeshId, String> {
        let mut meshes = Vec::with_capacity(model.meshes.len());
        for mesh in &model.meshes {
            match upload_mesh(gl, mesh) {
                Ok(uploaded) => meshes.push(uploaded),
                Err(e) => {
                    for uploaded in &meshes {
                        delete_mesh(gl, uploaded);
                    }
                    return Err(e);
                }
            }
        }

        let id = MeshId(self.models.len() as u32);
        self.models.push(meshes);
        Ok(id)
    }

    /// Turn a finished download into the viewer's load outcome
    ///
    /// # Safety
    /// Requires a live GL context
    pub unsafe fn upload_outcome(
        &mut self,
        gl: &Context,
        url: &str,
        result: Result<ModelAsset, WebError>,
    ) -> Result<LoadedModel, ViewerError> {
        result
            .and_then(|asset| {
                let mesh = self.upload_model(gl, &asset).map_err(WebError::Gl)?;
                Ok(LoadedModel {
                    mesh,
                    bounds: asset.bounds,
                })
            })
            .map_err(|e| ViewerError::AssetLoad {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Clear the bound framebuffer and draw every renderable node
    ///
    /// # Safety
    /// Requires a live GL context with the target framebuffer and viewport
    /// already bound
    pub unsafe fn render_scene(&self, gl: &Context, scene: &Scene, camera: &Camera, clear: [f32; 4]) {
        gl.clear_color(clear[0], clear[1], clear[2], clear[3]);
        gl.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);

        let Some(program) = self.program else { return };
        gl.use_program(Some(program));
        gl.enable(DEPTH_TEST);
        gl.depth_func(LESS);

        let view_projection = camera.view_projection();

        let light_dir_loc = gl.get_uniform_location(program, "uLightDir");
        gl.uniform_3_f32(light_dir_loc.as_ref(), LIGHT_DIR.x, LIGHT_DIR.y, LIGHT_DIR.z);
        let ambient_loc = gl.get_uniform_location(program, "uAmbient");
        gl.uniform_1_f32(ambient_loc.as_ref(), AMBIENT);
        let diffuse_loc = gl.get_uniform_location(program, "uDiffuseStrength");
        gl.uniform_1_f32(diffuse_loc.as_ref(), DIFFUSE_STRENGTH);

        for node in scene.renderable() {
            let model = node.world_matrix();
            match node.kind {
                NodeKind::Pivot { content: Some(content) } => {
                    let Some(meshes) = self.models.get(content.mesh.0 as usize) else {
                        continue;
                    };
                    for mesh in meshes {
                        self.draw(gl, program, mesh, model, view_projection, true);
                    }
                }
                NodeKind::Pivot { content: None } => {}
                NodeKind::Reticle { .. } => {
                    if let Some(mesh) = &self.reticle {
                        self.draw(gl, program, mesh, model, view_projection, false);
                    }
                }
            }
        }

        gl.bind_vertex_array(None);
        gl.disable(DEPTH_TEST);
    }

    unsafe fn draw(
        &self,
        gl: &Context,
        program: GlProgram,
        mesh: &GlMesh,
        model: Mat4,
        view_projection: Mat4,
        lit: bool,
    ) {
        let mvp = view_projection * model;
        let mvp_loc = gl.get_uniform_location(program, "uMVP");
        gl.uniform_matrix_4_f32_slice(mvp_loc.as_ref(), false, &mvp.to_cols_array());
        let model_loc = gl.get_uniform_location(program, "uModel");
        gl.uniform_matrix_4_f32_slice(model_loc.as_ref(), false, &model.to_cols_array());
        let color_loc = gl.get_uniform_location(program, "uColor");
        gl.uniform_4_f32_slice(color_loc.as_ref(), &mesh.color);
        let lit_loc = gl.get_uniform_location(program, "uLit");
        gl.uniform_1_f32(lit_loc.as_ref(), if lit { 1.0 } else { 0.0 });

        gl.bind_vertex_array(Some(mesh.vao));
        gl.draw_elements(TRIANGLES, mesh.index_count, UNSIGNED_INT, 0);
    }
}

/// Interleave and upload one mesh
unsafe fn upload_mesh(gl: &Context, mesh: &MeshData) -> Result<GlMesh, String> {
    if mesh.indices.is_empty() {
        return Err("Mesh has no triangles".to_string());
    }

    let vao = gl
        .create_vertex_array()
        .map_err(|e| format!("Failed to create VAO: {}", e))?;
    gl.bind_vertex_array(Some(vao));

    let vbo = gl
        .create_buffer()
        .map_err(|e| format!("Failed to create VBO: {}", e))?;
    gl.bind_buffer(ARRAY_BUFFER, Some(vbo));

    let vertex_data: Vec<f32> = mesh
        .positions
        .iter()
        .zip(&mesh.normals)
        .flat_map(|(p, n)| [p[0], p[1], p[2], n[0], n[1], n[2]])
        .collect();
    gl.buffer_data_u8_slice(ARRAY_BUFFER, bytemuck::cast_slice(&vertex_data), STATIC_DRAW);

    // Position (location 0)
    gl.enable_vertex_attrib_array(0);
    gl.vertex_attrib_pointer_f32(0, 3, FLOAT, false, VERTEX_STRIDE, 0);
    // Normal (location 1)
    gl.enable_vertex_attrib_array(1);
    gl.vertex_attrib_pointer_f32(
        1,
        3,
        FLOAT,
        false,
        VERTEX_STRIDE,
        3 * std::mem::size_of::<f32>() as i32,
    );

    let ebo = gl
        .create_buffer()
        .map_err(|e| format!("Failed to create EBO: {}", e))?;
    gl.bind_buffer(ELEMENT_ARRAY_BUFFER, Some(ebo));
    gl.buffer_data_u8_slice(
        ELEMENT_ARRAY_BUFFER,
        bytemuck::cast_slice(&mesh.indices),
        STATIC_DRAW,
    );

    gl.bind_vertex_array(None);

    Ok(GlMesh {
        vao,
        vbo,
        ebo,
        index_count: mesh.indices.len() as i32,
        color: mesh.color,
    })
}

unsafe fn delete_mesh(gl: &Context, mesh: &GlMesh) {
    gl.delete_vertex_array(mesh.vao);
    gl.delete_buffer(mesh.vbo);
    gl.delete_buffer(mesh.ebo);
}

const VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 aPosition;
layout(location = 1) in vec3 aNormal;

uniform mat4 uMVP;
uniform mat4 uModel;

out vec3 vNormal;

void main() {
    gl_Position = uMVP * vec4(aPosition, 1.0);
    vNormal = mat3(uModel) * aNormal;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 vNormal;

uniform vec4 uColor;
uniform vec3 uLightDir;
uniform float uAmbient;
uniform float uDiffuseStrength;
uniform float uLit;

out vec4 FragColor;

void main() {
    vec3 normal = normalize(vNormal);
    float diffuse = max(dot(normal, uLightDir), 0.0);
    float lighting = mix(1.0, uAmbient + diffuse * uDiffuseStrength, uLit);
    vec3 color = pow(uColor.rgb * lighting, vec3(1.0 / 2.2));
    FragColor = vec4(color, uColor.a);
}
"#;
