//! Recording GL backend for host-side tests.
//!
//! The "compiler" rejects sources with unbalanced braces, which is enough to
//! exercise the failure paths without a real driver.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, HashSet};

use super::{Gl, ShaderStage, Surface};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    UseProgram(u32),
    BindVertexArray(Option<u32>),
    Viewport(i32, i32, i32, i32),
    Clear,
    Draw { first: i32, count: i32 },
    Uniform { program: u32, name: String, values: Vec<f32> },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MockLocation {
    pub program: u32,
    pub name: String,
}

#[derive(Default)]
pub(crate) struct MockBackend {
    next_id: Cell<u32>,
    shader_sources: RefCell<HashMap<u32, String>>,
    live_shaders: RefCell<BTreeSet<u32>>,
    live_programs: RefCell<BTreeSet<u32>>,
    live_buffers: RefCell<BTreeSet<u32>>,
    attached: RefCell<HashMap<u32, Vec<u32>>>,
    compiled: RefCell<HashSet<u32>>,
    linked: RefCell<HashSet<u32>>,
    pub fail_link: Cell<bool>,
    pub refuse_buffers: Cell<bool>,
    pub refuse_vertex_arrays: Cell<bool>,
    pub absent_uniforms: RefCell<HashSet<String>>,
    pub location_lookups: Cell<usize>,
    pub calls: RefCell<Vec<Call>>,
    pub buffer_uploads: RefCell<Vec<Vec<f32>>>,
    pub attrib_setups: RefCell<Vec<(u32, i32)>>,
    pub display: Cell<(f64, f64)>,
    pub dpr: Cell<f64>,
    pub backing: Cell<(u32, u32)>,
}

impl MockBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.display.set((300.0, 150.0));
        backend.dpr.set(1.0);
        backend.backing.set((300, 150));
        backend
    }

    fn alloc(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    pub fn live_shaders(&self) -> usize {
        self.live_shaders.borrow().len()
    }

    pub fn live_programs(&self) -> Vec<u32> {
        self.live_programs.borrow().iter().copied().collect()
    }

    pub fn live_buffers(&self) -> usize {
        self.live_buffers.borrow().len()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        self.calls.take()
    }

    /// Last value pushed to `name` on `program`, if any.
    pub fn uniform(&self, program: u32, name: &str) -> Option<Vec<f32>> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            Call::Uniform {
                program: p,
                name: n,
                values,
            } if *p == program && n == name => Some(values.clone()),
            _ => None,
        })
    }
}

fn balanced(source: &str) -> bool {
    let mut depth = 0i32;
    for c in source.chars() {
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

impl Gl for MockBackend {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = MockLocation;
    type Buffer = u32;
    type VertexArray = u32;

    fn create_shader(&self, _stage: ShaderStage) -> Option<u32> {
        let id = self.alloc();
        self.live_shaders.borrow_mut().insert(id);
        Some(id)
    }

    fn shader_source(&self, shader: &u32, source: &str) {
        self.shader_sources
            .borrow_mut()
            .insert(*shader, source.to_string());
    }

    fn compile_shader(&self, shader: &u32) {
        let ok = self
            .shader_sources
            .borrow()
            .get(shader)
            .is_some_and(|src| balanced(src));
        if ok {
            self.compiled.borrow_mut().insert(*shader);
        }
    }

    fn shader_compile_status(&self, shader: &u32) -> bool {
        self.compiled.borrow().contains(shader)
    }

    fn shader_info_log(&self, shader: &u32) -> String {
        format!("ERROR: 0:1: shader {shader}: unbalanced delimiters")
    }

    fn delete_shader(&self, shader: u32) {
        self.live_shaders.borrow_mut().remove(&shader);
    }

    fn create_program(&self) -> Option<u32> {
        let id = self.alloc();
        self.live_programs.borrow_mut().insert(id);
        Some(id)
    }

    fn attach_shader(&self, program: &u32, shader: &u32) {
        self.attached
            .borrow_mut()
            .entry(*program)
            .or_default()
            .push(*shader);
    }

    fn detach_shader(&self, program: &u32, shader: &u32) {
        if let Some(list) = self.attached.borrow_mut().get_mut(program) {
            list.retain(|s| s != shader);
        }
    }

    fn link_program(&self, program: &u32) {
        let attached = self
            .attached
            .borrow()
            .get(program)
            .map(Vec::len)
            .unwrap_or(0);
        if attached == 2 && !self.fail_link.get() {
            self.linked.borrow_mut().insert(*program);
        }
    }

    fn program_link_status(&self, program: &u32) -> bool {
        self.linked.borrow().contains(program)
    }

    fn program_info_log(&self, _program: &u32) -> String {
        "ERROR: Varyings do not match".to_string()
    }

    fn delete_program(&self, program: u32) {
        self.live_programs.borrow_mut().remove(&program);
    }

    fn use_program(&self, program: &u32) {
        self.calls.borrow_mut().push(Call::UseProgram(*program));
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<MockLocation> {
        self.location_lookups.set(self.location_lookups.get() + 1);
        if self.absent_uniforms.borrow().contains(name) {
            return None;
        }
        Some(MockLocation {
            program: *program,
            name: name.to_string(),
        })
    }

    fn uniform_1f(&self, location: &MockLocation, x: f32) {
        self.record_uniform(location, vec![x]);
    }

    fn uniform_2f(&self, location: &MockLocation, x: f32, y: f32) {
        self.record_uniform(location, vec![x, y]);
    }

    fn uniform_3f(&self, location: &MockLocation, x: f32, y: f32, z: f32) {
        self.record_uniform(location, vec![x, y, z]);
    }

    fn uniform_3fv(&self, location: &MockLocation, values: &[f32]) {
        self.record_uniform(location, values.to_vec());
    }

    fn create_buffer(&self) -> Option<u32> {
        if self.refuse_buffers.get() {
            return None;
        }
        let id = self.alloc();
        self.live_buffers.borrow_mut().insert(id);
        Some(id)
    }

    fn delete_buffer(&self, buffer: u32) {
        self.live_buffers.borrow_mut().remove(&buffer);
    }

    fn upload_static_vertices(&self, _buffer: &u32, vertices: &[f32]) {
        self.buffer_uploads.borrow_mut().push(vertices.to_vec());
    }

    fn create_vertex_array(&self) -> Option<u32> {
        if self.refuse_vertex_arrays.get() {
            return None;
        }
        Some(self.alloc())
    }

    fn bind_vertex_array(&self, vertex_array: Option<&u32>) {
        self.calls
            .borrow_mut()
            .push(Call::BindVertexArray(vertex_array.copied()));
    }

    fn vertex_attrib_f32(&self, location: u32, components: i32) {
        self.attrib_setups.borrow_mut().push((location, components));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.calls
            .borrow_mut()
            .push(Call::Viewport(x, y, width, height));
    }

    fn clear_color_buffer(&self, _rgba: [f32; 4]) {
        self.calls.borrow_mut().push(Call::Clear);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.calls.borrow_mut().push(Call::Draw { first, count });
    }
}

impl MockBackend {
    fn record_uniform(&self, location: &MockLocation, values: Vec<f32>) {
        self.calls.borrow_mut().push(Call::Uniform {
            program: location.program,
            name: location.name.clone(),
            values,
        });
    }
}

impl Surface for MockBackend {
    fn display_size(&self) -> (f64, f64) {
        self.display.get()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.dpr.get()
    }

    fn backing_size(&self) -> (u32, u32) {
        self.backing.get()
    }

    fn set_backing_size(&self, width: u32, height: u32) {
        self.backing.set((width, height));
    }
}
