//! Shader compilation helpers for the WebGL2 renderer

use glow::{Context, HasContext, FRAGMENT_SHADER, VERTEX_SHADER};

pub type GlProgram = <Context as HasContext>::Program;
pub type GlShader = <Context as HasContext>::Shader;

/// Compile a shader from source code
///
/// # Safety
/// Requires a live GL context
pub unsafe fn compile_shader(
    gl: &Context,
    shader_type: u32,
    source: &str,
) -> Result<GlShader, String> {
    let shader = gl.create_shader(shader_type)?;

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(format!("Shader compilation error: {}", log));
    }

    Ok(shader)
}

/// Create and link a program from vertex and fragment sources
///
/// # Safety
/// Requires a live GL context
pub unsafe fn create_program(
    gl: &Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<GlProgram, String> {
    let program = gl.create_program()?;

    let vertex_shader = compile_shader(gl, VERTEX_SHADER, vertex_src)?;
    let fragment_shader = compile_shader(gl, FRAGMENT_SHADER, fragment_src)?;

    gl.attach_shader(program, vertex_shader);
    gl.attach_shader(program, fragment_shader);
    gl.link_program(program);

    let linked = gl.get_program_link_status(program);
    let log = (!linked).then(|| gl.get_program_info_log(program));

    gl.detach_shader(program, vertex_shader);
    gl.detach_shader(program, fragment_shader);
    gl.delete_shader(vertex_shader);
    gl.delete_shader(fragment_shader);

    match log {
        Some(log) => {
            gl.delete_program(program);
            Err(format!("Program link error: {}", log))
        }
        None => Ok(program),
    }
}
