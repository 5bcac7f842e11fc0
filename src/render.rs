//! Frame loop state: geometry, the current program and the uniform values.
//!
//! The host drives [`Renderer::tick`] once per displayed frame and
//! reschedules unconditionally; the renderer itself never blocks or skips.

use crate::error::RenderError;
use crate::gl::{Gl, Surface};
use crate::palette::Palette;
use crate::program::{build_program, Program};
use crate::shader::{ShaderBody, POSITION_ATTRIBUTE};
use crate::uniforms::{push_uniforms, UniformState};

/// Two triangles covering clip space, as `(x, y)` pairs.
pub const FULLSCREEN_QUAD: [f32; 12] = [
    -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

const QUAD_VERTICES: i32 = (FULLSCREEN_QUAD.len() / 2) as i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// No geometry and no program yet.
    Uninitialized,
    /// Geometry uploaded and a program built; not yet scheduled.
    Ready,
    /// Scheduled every display frame for the life of the page.
    Running,
}

struct Geometry<G: Gl> {
    _buffer: G::Buffer,
    vertex_array: G::VertexArray,
}

impl<G: Gl> Geometry<G> {
    fn upload(gl: &G) -> Result<Self, RenderError> {
        let buffer = gl
            .create_buffer()
            .ok_or_else(|| RenderError::ResourceCreation("create_buffer failed".into()))?;
        let Some(vertex_array) = gl.create_vertex_array() else {
            gl.delete_buffer(buffer);
            return Err(RenderError::ResourceCreation("create_vertex_array failed".into()));
        };
        gl.bind_vertex_array(Some(&vertex_array));
        gl.upload_static_vertices(&buffer, &FULLSCREEN_QUAD);
        gl.vertex_attrib_f32(POSITION_ATTRIBUTE, 2);
        gl.bind_vertex_array(None);
        Ok(Self {
            _buffer: buffer,
            vertex_array,
        })
    }
}

/// What one tick did, for callers that care.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub viewport: (u32, u32),
    pub resized: bool,
    pub elapsed_seconds: f32,
}

/// Render context owning every piece of mutable renderer state.
pub struct Renderer<B: Gl + Surface> {
    backend: B,
    geometry: Option<Geometry<B>>,
    program: Option<Program<B>>,
    uniforms: UniformState,
    phase: LoopPhase,
    first_timestamp_ms: Option<f64>,
    viewport: Option<(u32, u32)>,
}

fn backing_dimension(css: f64, ratio: f64) -> u32 {
    let scaled = (css * ratio).round();
    if scaled.is_finite() && scaled >= 1.0 {
        scaled as u32
    } else {
        1
    }
}

impl<B: Gl + Surface> Renderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            geometry: None,
            program: None,
            uniforms: UniformState::new(),
            phase: LoopPhase::Uninitialized,
            first_timestamp_ms: None,
            viewport: None,
        }
    }

    /// Uploads the shared geometry and builds the first program.
    ///
    /// Stays `Uninitialized` if either step fails. Calling it again once
    /// initialized is a no-op.
    pub fn initialize(&mut self, body: &ShaderBody) -> Result<(), RenderError> {
        if self.phase != LoopPhase::Uninitialized {
            return Ok(());
        }
        if self.geometry.is_none() {
            self.geometry = Some(Geometry::upload(&self.backend)?);
        }
        self.program = Some(build_program(&self.backend, body)?);
        self.phase = LoopPhase::Ready;
        log::info!("renderer ready with shader '{}'", body.name());
        Ok(())
    }

    /// Marks the loop as scheduled.
    pub fn start(&mut self) -> Result<(), RenderError> {
        match self.phase {
            LoopPhase::Uninitialized => Err(RenderError::NotInitialized),
            LoopPhase::Ready => {
                self.phase = LoopPhase::Running;
                Ok(())
            }
            LoopPhase::Running => Ok(()),
        }
    }

    /// Builds `body` and makes it current, releasing the program it replaces.
    ///
    /// On failure the current program is untouched and keeps drawing.
    pub fn swap_program(&mut self, body: &ShaderBody) -> Result<(), RenderError> {
        if self.phase == LoopPhase::Uninitialized {
            return Err(RenderError::NotInitialized);
        }
        let program = build_program(&self.backend, body)?;
        if let Some(previous) = self.program.replace(program) {
            previous.release(&self.backend);
        }
        log::info!("switched to shader '{}'", body.name());
        Ok(())
    }

    /// Renders one frame for a host timestamp in milliseconds.
    pub fn tick(&mut self, timestamp_ms: f64) -> Result<FrameReport, RenderError> {
        let (Some(geometry), Some(program)) = (&self.geometry, &mut self.program) else {
            return Err(RenderError::NotInitialized);
        };
        let backend = &self.backend;

        let (css_width, css_height) = backend.display_size();
        let ratio = backend.device_pixel_ratio();
        let ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
        let desired = (
            backing_dimension(css_width, ratio),
            backing_dimension(css_height, ratio),
        );
        let mut resized = false;
        if backend.backing_size() != desired {
            backend.set_backing_size(desired.0, desired.1);
            resized = true;
        }
        if resized || self.viewport != Some(desired) {
            log::debug!("viewport {}x{} (ratio {ratio})", desired.0, desired.1);
            backend.viewport(0, 0, desired.0 as i32, desired.1 as i32);
            self.viewport = Some(desired);
        }

        let first = *self.first_timestamp_ms.get_or_insert(timestamp_ms);
        let seconds = ((timestamp_ms - first) / 1000.0) as f32;
        let elapsed = seconds.max(self.uniforms.elapsed_seconds());
        self.uniforms.set_elapsed(elapsed);
        self.uniforms.set_resolution(desired.0, desired.1, ratio as f32);

        backend.clear_color_buffer([0.0, 0.0, 0.0, 0.0]);
        backend.use_program(program.handle());
        backend.bind_vertex_array(Some(&geometry.vertex_array));
        push_uniforms(backend, program, &self.uniforms);
        backend.draw_triangles(0, QUAD_VERTICES);

        Ok(FrameReport {
            viewport: desired,
            resized,
            elapsed_seconds: elapsed,
        })
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn uniforms(&self) -> &UniformState {
        &self.uniforms
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.uniforms.set_pointer(x, y);
    }

    pub fn replace_palette(&mut self, palette: Palette) {
        self.uniforms.replace_palette(palette);
    }

    /// Name of the shader currently drawing, if any.
    pub fn program_name(&self) -> Option<&str> {
        self.program.as_ref().map(Program::name)
    }

    pub fn program(&self) -> Option<&Program<B>> {
        self.program.as_ref()
    }
}
