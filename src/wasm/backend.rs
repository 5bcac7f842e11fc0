use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::RenderError;
use crate::gl::{Gl, ShaderStage, Surface};

/// WebGL2 context bound to a page canvas.
pub struct WebGlBackend {
    gl: GL,
    canvas: HtmlCanvasElement,
}

impl WebGlBackend {
    pub fn new(canvas: HtmlCanvasElement, antialias: bool) -> Result<Self, RenderError> {
        let missing = |err: JsValue| RenderError::MissingContext(format!("{err:?}"));

        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &"antialias".into(), &antialias.into()).map_err(missing)?;

        let gl = canvas
            .get_context_with_context_options("webgl2", &options)
            .map_err(missing)?
            .ok_or_else(|| RenderError::MissingContext("WebGL2 not supported".into()))?
            .dyn_into::<GL>()
            .map_err(|_| RenderError::MissingContext("context is not WebGL2".into()))?;

        Ok(Self { gl, canvas })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Gl for WebGlBackend {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type UniformLocation = WebGlUniformLocation;
    type Buffer = WebGlBuffer;
    type VertexArray = WebGlVertexArrayObject;

    fn create_shader(&self, stage: ShaderStage) -> Option<WebGlShader> {
        let kind = match stage {
            ShaderStage::Vertex => GL::VERTEX_SHADER,
            ShaderStage::Fragment => GL::FRAGMENT_SHADER,
        };
        self.gl.create_shader(kind)
    }

    fn shader_source(&self, shader: &WebGlShader, source: &str) {
        self.gl.shader_source(shader, source);
    }

    fn compile_shader(&self, shader: &WebGlShader) {
        self.gl.compile_shader(shader);
    }

    fn shader_compile_status(&self, shader: &WebGlShader) -> bool {
        self.gl
            .get_shader_parameter(shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &WebGlShader) -> String {
        self.gl.get_shader_info_log(shader).unwrap_or_default()
    }

    fn delete_shader(&self, shader: WebGlShader) {
        self.gl.delete_shader(Some(&shader));
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        self.gl.create_program()
    }

    fn attach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) {
        self.gl.attach_shader(program, shader);
    }

    fn detach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) {
        self.gl.detach_shader(program, shader);
    }

    fn link_program(&self, program: &WebGlProgram) {
        self.gl.link_program(program);
    }

    fn program_link_status(&self, program: &WebGlProgram) -> bool {
        self.gl
            .get_program_parameter(program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &WebGlProgram) -> String {
        self.gl.get_program_info_log(program).unwrap_or_default()
    }

    fn delete_program(&self, program: WebGlProgram) {
        self.gl.delete_program(Some(&program));
    }

    fn use_program(&self, program: &WebGlProgram) {
        self.gl.use_program(Some(program));
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn uniform_1f(&self, location: &WebGlUniformLocation, x: f32) {
        self.gl.uniform1f(Some(location), x);
    }

    fn uniform_2f(&self, location: &WebGlUniformLocation, x: f32, y: f32) {
        self.gl.uniform2f(Some(location), x, y);
    }

    fn uniform_3f(&self, location: &WebGlUniformLocation, x: f32, y: f32, z: f32) {
        self.gl.uniform3f(Some(location), x, y, z);
    }

    fn uniform_3fv(&self, location: &WebGlUniformLocation, values: &[f32]) {
        self.gl.uniform3fv_with_f32_array(Some(location), values);
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        self.gl.create_buffer()
    }

    fn delete_buffer(&self, buffer: WebGlBuffer) {
        self.gl.delete_buffer(Some(&buffer));
    }

    fn upload_static_vertices(&self, buffer: &WebGlBuffer, vertices: &[f32]) {
        let bytes: Vec<u8> = vertices.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        self.gl
            .buffer_data_with_u8_array(GL::ARRAY_BUFFER, &bytes, GL::STATIC_DRAW);
    }

    fn create_vertex_array(&self) -> Option<WebGlVertexArrayObject> {
        self.gl.create_vertex_array()
    }

    fn bind_vertex_array(&self, vertex_array: Option<&WebGlVertexArrayObject>) {
        self.gl.bind_vertex_array(vertex_array);
    }

    fn vertex_attrib_f32(&self, location: u32, components: i32) {
        self.gl.enable_vertex_attrib_array(location);
        self.gl
            .vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, 0, 0);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }

    fn clear_color_buffer(&self, [r, g, b, a]: [f32; 4]) {
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(GL::COLOR_BUFFER_BIT);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.gl.draw_arrays(GL::TRIANGLES, first, count);
    }
}

impl Surface for WebGlBackend {
    fn display_size(&self) -> (f64, f64) {
        (
            f64::from(self.canvas.client_width()),
            f64::from(self.canvas.client_height()),
        )
    }

    fn device_pixel_ratio(&self) -> f64 {
        web_sys::window()
            .map(|window| window.device_pixel_ratio())
            .unwrap_or(1.0)
    }

    fn backing_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_backing_size(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }
}
