//! Compiles shader bodies into linked GL programs.

use std::collections::HashMap;

use crate::error::RenderError;
use crate::gl::{Gl, ShaderStage};
use crate::shader::{ShaderBody, VERTEX_SHADER};

/// A linked program plus the uniform locations looked up on it so far.
///
/// Locations are only meaningful for the program they were queried on, so
/// the cache lives and dies with the program.
pub struct Program<G: Gl> {
    handle: G::Program,
    name: String,
    locations: HashMap<&'static str, Option<G::UniformLocation>>,
}

impl<G: Gl> Program<G> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &G::Program {
        &self.handle
    }

    /// Looks `name` up on first use; a uniform the compiler dropped is
    /// remembered as absent.
    pub fn location(&mut self, gl: &G, name: &'static str) -> Option<&G::UniformLocation> {
        self.locations
            .entry(name)
            .or_insert_with(|| gl.uniform_location(&self.handle, name))
            .as_ref()
    }

    pub(crate) fn release(self, gl: &G) {
        gl.delete_program(self.handle);
    }
}

fn compile_stage<G: Gl>(gl: &G, stage: ShaderStage, source: &str) -> Result<G::Shader, RenderError> {
    let shader = gl
        .create_shader(stage)
        .ok_or_else(|| RenderError::ResourceCreation(format!("create_shader({stage}) failed")))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if !gl.shader_compile_status(&shader) {
        let log = gl.shader_info_log(&shader);
        gl.delete_shader(shader);
        return Err(RenderError::ShaderCompile { stage, log });
    }
    Ok(shader)
}

fn link<G: Gl>(gl: &G, vs: &G::Shader, fs: &G::Shader) -> Result<G::Program, RenderError> {
    let program = gl
        .create_program()
        .ok_or_else(|| RenderError::ResourceCreation("create_program failed".into()))?;
    gl.attach_shader(&program, vs);
    gl.attach_shader(&program, fs);
    gl.link_program(&program);
    gl.detach_shader(&program, vs);
    gl.detach_shader(&program, fs);

    if !gl.program_link_status(&program) {
        let log = gl.program_info_log(&program);
        gl.delete_program(program);
        return Err(RenderError::ProgramLink(log));
    }
    Ok(program)
}

fn build<G: Gl>(gl: &G, body: &ShaderBody) -> Result<G::Program, RenderError> {
    let vs = compile_stage(gl, ShaderStage::Vertex, VERTEX_SHADER)?;
    let fs = match compile_stage(gl, ShaderStage::Fragment, &body.fragment_source()) {
        Ok(fs) => fs,
        Err(err) => {
            gl.delete_shader(vs);
            return Err(err);
        }
    };
    let linked = link(gl, &vs, &fs);
    // shader objects are not needed once the program is linked (or rejected)
    gl.delete_shader(vs);
    gl.delete_shader(fs);
    linked
}

/// Wraps `body` in the uniform preamble, compiles both stages and links them.
///
/// Every shader object created here is deleted before returning. Failures are
/// logged with the driver's diagnostics and leave any existing program alone.
pub fn build_program<G: Gl>(gl: &G, body: &ShaderBody) -> Result<Program<G>, RenderError> {
    match build(gl, body) {
        Ok(handle) => {
            log::debug!("built shader program '{}'", body.name());
            Ok(Program {
                handle,
                name: body.name().to_string(),
                locations: HashMap::new(),
            })
        }
        Err(err) => {
            log::error!("shader '{}' failed to build: {err}", body.name());
            Err(err)
        }
    }
}
