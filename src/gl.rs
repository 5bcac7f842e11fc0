//! Narrow view of the graphics API the renderer needs.
//!
//! The browser build implements these traits on top of
//! `WebGl2RenderingContext` and the page's `<canvas>`; unit tests use the
//! recording backend in [`mock`]. Only the calls the render loop actually
//! issues are exposed, so every GL object the core creates is visible here.

use std::fmt;

#[cfg(test)]
pub(crate) mod mock;

/// Programmable pipeline stage a shader object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// GL calls used by the program builder, uniform bridge and render loop.
///
/// Object-creating calls return `None` when the context refuses to allocate
/// (for example after a context loss), mirroring WebGL's nullable handles.
pub trait Gl {
    type Shader;
    type Program;
    type UniformLocation;
    type Buffer;
    type VertexArray;

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    fn shader_source(&self, shader: &Self::Shader, source: &str);
    fn compile_shader(&self, shader: &Self::Shader);
    fn shader_compile_status(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn detach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&self, program: &Self::Program);
    fn program_link_status(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: &Self::Program);

    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    fn uniform_1f(&self, location: &Self::UniformLocation, x: f32);
    fn uniform_2f(&self, location: &Self::UniformLocation, x: f32, y: f32);
    fn uniform_3f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);
    fn uniform_3fv(&self, location: &Self::UniformLocation, values: &[f32]);

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn delete_buffer(&self, buffer: Self::Buffer);
    /// Binds `buffer` to `ARRAY_BUFFER` and fills it with `STATIC_DRAW` data.
    fn upload_static_vertices(&self, buffer: &Self::Buffer, vertices: &[f32]);
    fn create_vertex_array(&self) -> Option<Self::VertexArray>;
    fn bind_vertex_array(&self, vertex_array: Option<&Self::VertexArray>);
    /// Enables `location` and points it at the bound array buffer as tightly
    /// packed `components`-wide float vectors.
    fn vertex_attrib_f32(&self, location: u32, components: i32);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color_buffer(&self, rgba: [f32; 4]);
    fn draw_triangles(&self, first: i32, count: i32);
}

/// The drawing surface the context renders into.
///
/// Sizes are split between the displayed (layout) size in CSS pixels and the
/// backing store the GL context actually draws into.
pub trait Surface {
    fn display_size(&self) -> (f64, f64);
    fn device_pixel_ratio(&self) -> f64;
    fn backing_size(&self) -> (u32, u32);
    fn set_backing_size(&self, width: u32, height: u32);
}
