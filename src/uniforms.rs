use crate::gl::Gl;
use crate::palette::Palette;
use crate::program::Program;
use crate::shader::{MOUSE_UNIFORM, PALETTE_UNIFORM, RESOLUTION_UNIFORM, TIME_UNIFORM};

/// Live values behind the shader uniform contract.
///
/// Input handlers write the pointer, the image loader replaces the palette,
/// and the render loop owns resolution and time. The bridge reads a snapshot
/// once per frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UniformState {
    resolution: [f32; 3],
    pointer: [f32; 2],
    elapsed_seconds: f32,
    palette: Palette,
}

impl UniformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backing-store width and height in pixels plus the device pixel ratio.
    pub fn resolution(&self) -> [f32; 3] {
        self.resolution
    }

    /// Pointer in backing-store pixels, origin bottom-left.
    pub fn pointer(&self) -> [f32; 2] {
        self.pointer
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed_seconds
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = [x, y];
    }

    pub fn replace_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub(crate) fn set_resolution(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        self.resolution = [width as f32, height as f32, pixel_ratio];
    }

    pub(crate) fn set_elapsed(&mut self, seconds: f32) {
        self.elapsed_seconds = seconds;
    }
}

/// On-page placement of the canvas, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Maps a client-space pointer position to backing-store pixels with the
/// origin at the bottom-left, matching `gl_FragCoord`.
pub fn pointer_position(client_x: f64, client_y: f64, rect: CanvasRect, backing: (u32, u32)) -> [f32; 2] {
    let scale = |backing: u32, css: f64| {
        if css > 0.0 {
            f64::from(backing) / css
        } else {
            1.0
        }
    };
    let sx = scale(backing.0, rect.width);
    let sy = scale(backing.1, rect.height);
    let x = (client_x - rect.left) * sx;
    let y = (rect.height - (client_y - rect.top) - 1.0) * sy;
    [x as f32, y as f32]
}

/// Uploads `state` into `program`, which must already be bound.
pub fn push_uniforms<G: Gl>(gl: &G, program: &mut Program<G>, state: &UniformState) {
    let [width, height, ratio] = state.resolution;
    if let Some(location) = program.location(gl, RESOLUTION_UNIFORM) {
        gl.uniform_3f(location, width, height, ratio);
    }
    let [x, y] = state.pointer;
    if let Some(location) = program.location(gl, MOUSE_UNIFORM) {
        gl.uniform_2f(location, x, y);
    }
    if let Some(location) = program.location(gl, TIME_UNIFORM) {
        gl.uniform_1f(location, state.elapsed_seconds);
    }
    if let Some(location) = program.location(gl, PALETTE_UNIFORM) {
        gl.uniform_3fv(location, &state.palette.flattened());
    }
}
