//! A recording [`GlContext`] for tests.
//!
//! [`RecordingContext`] hands out sequential object names, serves a scripted
//! program interface (active uniforms, attributes and uniform blocks) and
//! logs every state-changing call as a [`GlCall`]. Queries (status, info
//! logs, reflection, parameters) are answered but not logged.
//!
//! Available to downstream crates through the `mock` feature.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};

use crate::context::{
    ActiveVariable, Buffer, BufferTarget, BufferUsage, DrawMode, Framebuffer, GlContext, GlEnum,
    Program, Renderbuffer, Shader, ShaderStage, Texture, UniformLocation, VertexArray,
};

/// One recorded state-changing call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader(ShaderStage, Shader),
    CompileShader(Shader),
    DeleteShader(Shader),
    CreateProgram(Program),
    AttachShader(Program, Shader),
    TransformFeedbackVaryings { program: Program, varyings: Vec<String> },
    LinkProgram(Program),
    UseProgram(Option<Program>),
    DeleteProgram(Program),
    UniformBlockBinding { program: Program, block_index: u32, binding_point: u32 },

    Uniform1f { location: i32, value: f32 },
    UniformFloats { location: i32, values: Vec<f32> },
    Uniform1i { location: i32, value: i32 },
    UniformInts { location: i32, values: Vec<i32> },
    UniformMatrix { location: i32, columns: u8, rows: u8, values: Vec<f32> },

    GenTexture(Texture),
    BindTexture(Option<Texture>),
    ActiveTexture(u32),
    TexImage2D {
        internal_format: i32,
        width: i32,
        height: i32,
        format: GlEnum,
        ty: GlEnum,
        data_len: Option<usize>,
    },
    TexParameter { parameter: GlEnum, value: i32 },
    DeleteTexture(Texture),

    GenFramebuffer(Framebuffer),
    BindFramebuffer(Option<Framebuffer>),
    FramebufferTexture2D { attachment: GlEnum, texture: Option<Texture>, level: i32 },
    FramebufferRenderbuffer { attachment: GlEnum, renderbuffer: Option<Renderbuffer> },
    DeleteFramebuffer(Framebuffer),
    GenRenderbuffer(Renderbuffer),
    BindRenderbuffer(Option<Renderbuffer>),
    RenderbufferStorage { internal_format: GlEnum, width: i32, height: i32 },
    DeleteRenderbuffer(Renderbuffer),

    GenBuffer(Buffer),
    BindBuffer(BufferTarget, Option<Buffer>),
    BindBufferBase { target: BufferTarget, index: u32, buffer: Option<Buffer> },
    BufferData { target: BufferTarget, len: usize, usage: BufferUsage },
    BufferSubData { target: BufferTarget, offset: i32, len: usize },
    DeleteBuffer(Buffer),

    GenVertexArray(VertexArray),
    BindVertexArray(Option<VertexArray>),
    EnableVertexAttribArray(u32),
    VertexAttribPointer {
        index: u32,
        size: i32,
        data_type: GlEnum,
        normalized: bool,
        stride: i32,
        offset: i32,
    },
    VertexAttribDivisor { index: u32, divisor: u32 },
    DeleteVertexArray(VertexArray),

    DrawArrays { mode: DrawMode, first: i32, count: i32 },
    DrawArraysInstanced { mode: DrawMode, first: i32, count: i32, instances: i32 },
    DrawElements { mode: DrawMode, count: i32, element_type: GlEnum, offset: i32 },
    DrawElementsInstanced {
        mode: DrawMode,
        count: i32,
        element_type: GlEnum,
        offset: i32,
        instances: i32,
    },
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    ClearColor([f32; 4]),
    Clear(GlEnum),
    ReadPixels { x: i32, y: i32, width: i32, height: i32, format: GlEnum, ty: GlEnum },
}

#[derive(Debug, Clone)]
struct ScriptedUniform {
    variable: ActiveVariable,
    location: Option<i32>,
}

#[derive(Debug, Clone)]
struct ScriptedBlock {
    name: String,
    data_size: i32,
    members: Vec<(String, i32)>,
}

/// Object kinds whose creation can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Texture,
    Framebuffer,
    Renderbuffer,
    Buffer,
    VertexArray,
}

/// Scripted, call-recording graphics context.
#[derive(Debug)]
pub struct RecordingContext {
    calls: RefCell<Vec<GlCall>>,
    next_name: Cell<u32>,

    uniforms: Vec<ScriptedUniform>,
    attributes: Vec<(ActiveVariable, i32)>,
    blocks: Vec<ScriptedBlock>,
    compile_failure: Option<(ShaderStage, String)>,
    link_failure: Option<String>,
    parameters: HashMap<GlEnum, i32>,
    framebuffer_status: GlEnum,
    /// Creations left per kind before `gen_*` returns `None`.
    object_limits: HashMap<ObjectKind, Cell<usize>>,

    shader_stages: RefCell<HashMap<Shader, ShaderStage>>,
    current_program: Cell<Option<Program>>,
    bound_vertex_array: Cell<Option<VertexArray>>,
    bound_buffers: RefCell<HashMap<BufferTarget, Buffer>>,
    buffer_contents: RefCell<HashMap<Buffer, Vec<u8>>>,
    active_unit: Cell<u32>,
    bound_textures: RefCell<HashMap<u32, Texture>>,
    bound_framebuffer: Cell<Option<Framebuffer>>,
    live: RefCell<BTreeSet<u32>>,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        let parameters = HashMap::from([
            (gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, 16),
            (gl::IMPLEMENTATION_COLOR_READ_FORMAT, gl::RGBA as i32),
            (gl::IMPLEMENTATION_COLOR_READ_TYPE, gl::UNSIGNED_BYTE as i32),
        ]);
        Self {
            calls: RefCell::new(Vec::new()),
            next_name: Cell::new(1),
            uniforms: Vec::new(),
            attributes: Vec::new(),
            blocks: Vec::new(),
            compile_failure: None,
            link_failure: None,
            parameters,
            framebuffer_status: gl::FRAMEBUFFER_COMPLETE,
            object_limits: HashMap::new(),
            shader_stages: RefCell::new(HashMap::new()),
            current_program: Cell::new(None),
            bound_vertex_array: Cell::new(None),
            bound_buffers: RefCell::new(HashMap::new()),
            buffer_contents: RefCell::new(HashMap::new()),
            active_unit: Cell::new(0),
            bound_textures: RefCell::new(HashMap::new()),
            bound_framebuffer: Cell::new(None),
            live: RefCell::new(BTreeSet::new()),
        }
    }

    // ------------------------------------------------------------------
    // Scripting
    // ------------------------------------------------------------------

    /// Add an active uniform. Locations are handed out in declaration order.
    pub fn with_uniform(self, name: &str, type_id: GlEnum) -> Self {
        self.with_uniform_array(name, type_id, 1)
    }

    /// Add an active uniform array; reported as `name[0]` like drivers do.
    pub fn with_uniform_array(mut self, name: &str, type_id: GlEnum, size: i32) -> Self {
        let location = self.uniforms.iter().filter(|u| u.location.is_some()).count() as i32;
        let reported = if size > 1 { format!("{name}[0]") } else { name.to_string() };
        self.uniforms.push(ScriptedUniform {
            variable: ActiveVariable { name: reported, size, type_id },
            location: Some(location),
        });
        self
    }

    /// Add an active uniform that lives inside a uniform block (no location).
    pub fn with_block_uniform(mut self, name: &str, type_id: GlEnum) -> Self {
        self.uniforms.push(ScriptedUniform {
            variable: ActiveVariable { name: name.to_string(), size: 1, type_id },
            location: None,
        });
        self
    }

    /// Add an active attribute at an explicit location.
    pub fn with_attribute(mut self, name: &str, type_id: GlEnum, location: i32) -> Self {
        self.attributes.push((
            ActiveVariable { name: name.to_string(), size: 1, type_id },
            location,
        ));
        self
    }

    /// Add a uniform block with `(member, byte offset)` pairs.
    pub fn with_uniform_block(mut self, name: &str, data_size: i32, members: &[(&str, i32)]) -> Self {
        self.blocks.push(ScriptedBlock {
            name: name.to_string(),
            data_size,
            members: members.iter().map(|(m, o)| (m.to_string(), *o)).collect(),
        });
        self
    }

    pub fn failing_compile(mut self, stage: ShaderStage, log: &str) -> Self {
        self.compile_failure = Some((stage, log.to_string()));
        self
    }

    pub fn failing_link(mut self, log: &str) -> Self {
        self.link_failure = Some(log.to_string());
        self
    }

    pub fn with_parameter(mut self, parameter: GlEnum, value: i32) -> Self {
        self.parameters.insert(parameter, value);
        self
    }

    pub fn with_max_texture_units(self, units: i32) -> Self {
        self.with_parameter(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, units)
    }

    pub fn with_framebuffer_status(mut self, status: GlEnum) -> Self {
        self.framebuffer_status = status;
        self
    }

    /// Let `count` objects of `kind` be created; later `gen_*` calls for
    /// that kind return `None`.
    pub fn with_object_limit(mut self, kind: ObjectKind, count: usize) -> Self {
        self.object_limits.insert(kind, Cell::new(count));
        self
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    /// Drain the call log.
    pub fn take_calls(&self) -> Vec<GlCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn current_program(&self) -> Option<Program> {
        self.current_program.get()
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArray> {
        self.bound_vertex_array.get()
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<Buffer> {
        self.bound_buffers.borrow().get(&target).copied()
    }

    pub fn bound_framebuffer(&self) -> Option<Framebuffer> {
        self.bound_framebuffer.get()
    }

    pub fn active_texture_unit(&self) -> u32 {
        self.active_unit.get()
    }

    /// Texture bound to `TEXTURE_2D` of `unit`.
    pub fn bound_texture(&self, unit: u32) -> Option<Texture> {
        self.bound_textures.borrow().get(&unit).copied()
    }

    /// Last full upload into `buffer`, patched by sub-uploads.
    pub fn buffer_contents(&self, buffer: Buffer) -> Option<Vec<u8>> {
        self.buffer_contents.borrow().get(&buffer).cloned()
    }

    /// Whether an object name was created and not yet deleted.
    pub fn is_live(&self, raw: u32) -> bool {
        self.live.borrow().contains(&raw)
    }

    /// Number of objects created and not yet deleted.
    pub fn live_objects(&self) -> usize {
        self.live.borrow().len()
    }

    // ------------------------------------------------------------------

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self) -> u32 {
        let raw = self.next_name.get();
        self.next_name.set(raw + 1);
        self.live.borrow_mut().insert(raw);
        raw
    }

    fn allocate_kind(&self, kind: ObjectKind) -> Option<u32> {
        if let Some(remaining) = self.object_limits.get(&kind) {
            if remaining.get() == 0 {
                return None;
            }
            remaining.set(remaining.get() - 1);
        }
        Some(self.allocate())
    }

    fn release(&self, raw: u32) {
        self.live.borrow_mut().remove(&raw);
    }

    fn write_floats(&self, location: UniformLocation, values: &[f32]) {
        self.record(GlCall::UniformFloats { location: location.0, values: values.to_vec() });
    }

    fn write_ints(&self, location: UniformLocation, values: &[i32]) {
        self.record(GlCall::UniformInts { location: location.0, values: values.to_vec() });
    }

    fn write_matrix(&self, location: UniformLocation, columns: u8, rows: u8, values: &[f32]) {
        self.record(GlCall::UniformMatrix {
            location: location.0,
            columns,
            rows,
            values: values.to_vec(),
        });
    }

    fn block(&self, index: u32) -> Option<&ScriptedBlock> {
        self.blocks.get(index as usize)
    }

    /// Member names of every block, in flattened index order.
    fn block_members(&self) -> impl Iterator<Item = &(String, i32)> {
        self.blocks.iter().flat_map(|b| b.members.iter())
    }
}

impl GlContext for RecordingContext {
    fn create_shader(&self, stage: ShaderStage) -> Option<Shader> {
        let shader = Shader::from_raw(self.allocate())?;
        self.shader_stages.borrow_mut().insert(shader, stage);
        self.record(GlCall::CreateShader(stage, shader));
        Some(shader)
    }

    fn shader_source(&self, _shader: Shader, _source: &str) {}

    fn compile_shader(&self, shader: Shader) {
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: Shader) -> bool {
        let stage = self.shader_stages.borrow().get(&shader).copied();
        !matches!((&self.compile_failure, stage), (Some((failing, _)), Some(s)) if *failing == s)
    }

    fn shader_info_log(&self, _shader: Shader) -> String {
        self.compile_failure.as_ref().map(|(_, log)| log.clone()).unwrap_or_default()
    }

    fn delete_shader(&self, shader: Shader) {
        self.release(shader.raw());
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Option<Program> {
        let program = Program::from_raw(self.allocate())?;
        self.record(GlCall::CreateProgram(program));
        Some(program)
    }

    fn attach_shader(&self, program: Program, shader: Shader) {
        self.record(GlCall::AttachShader(program, shader));
    }

    fn transform_feedback_varyings(&self, program: Program, varyings: &[&str]) {
        self.record(GlCall::TransformFeedbackVaryings {
            program,
            varyings: varyings.iter().map(|v| v.to_string()).collect(),
        });
    }

    fn link_program(&self, program: Program) {
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, _program: Program) -> bool {
        self.link_failure.is_none()
    }

    fn program_info_log(&self, _program: Program) -> String {
        self.link_failure.clone().unwrap_or_default()
    }

    fn use_program(&self, program: Option<Program>) {
        self.current_program.set(program);
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: Program) {
        self.release(program.raw());
        self.record(GlCall::DeleteProgram(program));
    }

    fn active_uniform_count(&self, _program: Program) -> u32 {
        self.uniforms.len() as u32
    }

    fn active_uniform(&self, _program: Program, index: u32) -> Option<ActiveVariable> {
        self.uniforms.get(index as usize).map(|u| u.variable.clone())
    }

    fn uniform_location(&self, _program: Program, name: &str) -> Option<UniformLocation> {
        self.uniforms
            .iter()
            .find(|u| {
                let reported = u.variable.name.as_str();
                reported == name || reported.strip_suffix("[0]") == Some(name)
            })
            .and_then(|u| u.location)
            .map(UniformLocation)
    }

    fn active_attribute_count(&self, _program: Program) -> u32 {
        self.attributes.len() as u32
    }

    fn active_attribute(&self, _program: Program, index: u32) -> Option<ActiveVariable> {
        self.attributes.get(index as usize).map(|(v, _)| v.clone())
    }

    fn attrib_location(&self, _program: Program, name: &str) -> i32 {
        self.attributes
            .iter()
            .find(|(v, _)| v.name == name)
            .map_or(-1, |(_, location)| *location)
    }

    fn uniform_block_index(&self, _program: Program, name: &str) -> Option<u32> {
        self.blocks.iter().position(|b| b.name == name).map(|i| i as u32)
    }

    fn uniform_block_data_size(&self, _program: Program, block_index: u32) -> i32 {
        self.block(block_index).map_or(0, |b| b.data_size)
    }

    fn uniform_indices(&self, _program: Program, names: &[&str]) -> Vec<Option<u32>> {
        names
            .iter()
            .map(|name| {
                self.block_members()
                    .position(|(member, _)| member == name)
                    .map(|i| i as u32)
            })
            .collect()
    }

    fn uniform_offsets(&self, _program: Program, indices: &[u32]) -> Vec<i32> {
        let members: Vec<_> = self.block_members().collect();
        indices
            .iter()
            .map(|&i| members.get(i as usize).map_or(-1, |(_, offset)| *offset))
            .collect()
    }

    fn uniform_block_binding(&self, program: Program, block_index: u32, binding_point: u32) {
        self.record(GlCall::UniformBlockBinding { program, block_index, binding_point });
    }

    fn uniform_1_f32(&self, location: UniformLocation, x: f32) {
        self.record(GlCall::Uniform1f { location: location.0, value: x });
    }

    fn uniform_2_f32(&self, location: UniformLocation, v: &[f32; 2]) {
        self.write_floats(location, v);
    }

    fn uniform_3_f32(&self, location: UniformLocation, v: &[f32; 3]) {
        self.write_floats(location, v);
    }

    fn uniform_4_f32(&self, location: UniformLocation, v: &[f32; 4]) {
        self.write_floats(location, v);
    }

    fn uniform_1_i32(&self, location: UniformLocation, x: i32) {
        self.record(GlCall::Uniform1i { location: location.0, value: x });
    }

    fn uniform_2_i32(&self, location: UniformLocation, v: &[i32; 2]) {
        self.write_ints(location, v);
    }

    fn uniform_3_i32(&self, location: UniformLocation, v: &[i32; 3]) {
        self.write_ints(location, v);
    }

    fn uniform_4_i32(&self, location: UniformLocation, v: &[i32; 4]) {
        self.write_ints(location, v);
    }

    fn uniform_matrix_2_f32(&self, location: UniformLocation, m: &[f32; 4]) {
        self.write_matrix(location, 2, 2, m);
    }

    fn uniform_matrix_3_f32(&self, location: UniformLocation, m: &[f32; 9]) {
        self.write_matrix(location, 3, 3, m);
    }

    fn uniform_matrix_4_f32(&self, location: UniformLocation, m: &[f32; 16]) {
        self.write_matrix(location, 4, 4, m);
    }

    fn uniform_matrix_2x3_f32(&self, location: UniformLocation, m: &[f32; 6]) {
        self.write_matrix(location, 2, 3, m);
    }

    fn uniform_matrix_2x4_f32(&self, location: UniformLocation, m: &[f32; 8]) {
        self.write_matrix(location, 2, 4, m);
    }

    fn uniform_matrix_3x2_f32(&self, location: UniformLocation, m: &[f32; 6]) {
        self.write_matrix(location, 3, 2, m);
    }

    fn uniform_matrix_3x4_f32(&self, location: UniformLocation, m: &[f32; 12]) {
        self.write_matrix(location, 3, 4, m);
    }

    fn uniform_matrix_4x2_f32(&self, location: UniformLocation, m: &[f32; 8]) {
        self.write_matrix(location, 4, 2, m);
    }

    fn uniform_matrix_4x3_f32(&self, location: UniformLocation, m: &[f32; 12]) {
        self.write_matrix(location, 4, 3, m);
    }

    fn gen_texture(&self) -> Option<Texture> {
        let texture = Texture::from_raw(self.allocate_kind(ObjectKind::Texture)?)?;
        self.record(GlCall::GenTexture(texture));
        Some(texture)
    }

    fn bind_texture(&self, texture: Option<Texture>) {
        let unit = self.active_unit.get();
        match texture {
            Some(t) => self.bound_textures.borrow_mut().insert(unit, t),
            None => self.bound_textures.borrow_mut().remove(&unit),
        };
        self.record(GlCall::BindTexture(texture));
    }

    fn active_texture(&self, unit: u32) {
        self.active_unit.set(unit);
        self.record(GlCall::ActiveTexture(unit));
    }

    fn tex_image_2d(
        &self,
        internal_format: i32,
        width: i32,
        height: i32,
        format: GlEnum,
        ty: GlEnum,
        pixels: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage2D {
            internal_format,
            width,
            height,
            format,
            ty,
            data_len: pixels.map(<[u8]>::len),
        });
    }

    fn tex_parameter_i32(&self, parameter: GlEnum, value: i32) {
        self.record(GlCall::TexParameter { parameter, value });
    }

    fn delete_texture(&self, texture: Texture) {
        self.release(texture.raw());
        self.record(GlCall::DeleteTexture(texture));
    }

    fn gen_framebuffer(&self) -> Option<Framebuffer> {
        let framebuffer = Framebuffer::from_raw(self.allocate_kind(ObjectKind::Framebuffer)?)?;
        self.record(GlCall::GenFramebuffer(framebuffer));
        Some(framebuffer)
    }

    fn bind_framebuffer(&self, framebuffer: Option<Framebuffer>) {
        self.bound_framebuffer.set(framebuffer);
        self.record(GlCall::BindFramebuffer(framebuffer));
    }

    fn framebuffer_texture_2d(&self, attachment: GlEnum, texture: Option<Texture>, level: i32) {
        self.record(GlCall::FramebufferTexture2D { attachment, texture, level });
    }

    fn framebuffer_renderbuffer(&self, attachment: GlEnum, renderbuffer: Option<Renderbuffer>) {
        self.record(GlCall::FramebufferRenderbuffer { attachment, renderbuffer });
    }

    fn check_framebuffer_status(&self) -> GlEnum {
        self.framebuffer_status
    }

    fn delete_framebuffer(&self, framebuffer: Framebuffer) {
        self.release(framebuffer.raw());
        self.record(GlCall::DeleteFramebuffer(framebuffer));
    }

    fn gen_renderbuffer(&self) -> Option<Renderbuffer> {
        let renderbuffer = Renderbuffer::from_raw(self.allocate_kind(ObjectKind::Renderbuffer)?)?;
        self.record(GlCall::GenRenderbuffer(renderbuffer));
        Some(renderbuffer)
    }

    fn bind_renderbuffer(&self, renderbuffer: Option<Renderbuffer>) {
        self.record(GlCall::BindRenderbuffer(renderbuffer));
    }

    fn renderbuffer_storage(&self, internal_format: GlEnum, width: i32, height: i32) {
        self.record(GlCall::RenderbufferStorage { internal_format, width, height });
    }

    fn delete_renderbuffer(&self, renderbuffer: Renderbuffer) {
        self.release(renderbuffer.raw());
        self.record(GlCall::DeleteRenderbuffer(renderbuffer));
    }

    fn gen_buffer(&self) -> Option<Buffer> {
        let buffer = Buffer::from_raw(self.allocate_kind(ObjectKind::Buffer)?)?;
        self.record(GlCall::GenBuffer(buffer));
        Some(buffer)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Buffer>) {
        match buffer {
            Some(b) => self.bound_buffers.borrow_mut().insert(target, b),
            None => self.bound_buffers.borrow_mut().remove(&target),
        };
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: Option<Buffer>) {
        self.record(GlCall::BindBufferBase { target, index, buffer });
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        if let Some(buffer) = self.bound_buffer(target) {
            self.buffer_contents.borrow_mut().insert(buffer, data.to_vec());
        }
        self.record(GlCall::BufferData { target, len: data.len(), usage });
    }

    fn buffer_data_size(&self, target: BufferTarget, size: i32, usage: BufferUsage) {
        let len = size.max(0) as usize;
        if let Some(buffer) = self.bound_buffer(target) {
            self.buffer_contents.borrow_mut().insert(buffer, vec![0; len]);
        }
        self.record(GlCall::BufferData { target, len, usage });
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: i32, data: &[u8]) {
        if let Some(buffer) = self.bound_buffer(target) {
            if let Some(contents) = self.buffer_contents.borrow_mut().get_mut(&buffer) {
                let start = offset.max(0) as usize;
                let end = (start + data.len()).min(contents.len());
                if start < end {
                    contents[start..end].copy_from_slice(&data[..end - start]);
                }
            }
        }
        self.record(GlCall::BufferSubData { target, offset, len: data.len() });
    }

    fn delete_buffer(&self, buffer: Buffer) {
        self.release(buffer.raw());
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn gen_vertex_array(&self) -> Option<VertexArray> {
        let vertex_array = VertexArray::from_raw(self.allocate_kind(ObjectKind::VertexArray)?)?;
        self.record(GlCall::GenVertexArray(vertex_array));
        Some(vertex_array)
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArray>) {
        self.bound_vertex_array.set(vertex_array);
        self.record(GlCall::BindVertexArray(vertex_array));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: GlEnum,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            data_type,
            normalized,
            stride,
            offset,
        });
    }

    fn vertex_attrib_divisor(&self, index: u32, divisor: u32) {
        self.record(GlCall::VertexAttribDivisor { index, divisor });
    }

    fn delete_vertex_array(&self, vertex_array: VertexArray) {
        self.release(vertex_array.raw());
        self.record(GlCall::DeleteVertexArray(vertex_array));
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }

    fn draw_arrays_instanced(&self, mode: DrawMode, first: i32, count: i32, instances: i32) {
        self.record(GlCall::DrawArraysInstanced { mode, first, count, instances });
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, element_type: GlEnum, offset: i32) {
        self.record(GlCall::DrawElements { mode, count, element_type, offset });
    }

    fn draw_elements_instanced(
        &self,
        mode: DrawMode,
        count: i32,
        element_type: GlEnum,
        offset: i32,
        instances: i32,
    ) {
        self.record(GlCall::DrawElementsInstanced {
            mode,
            count,
            element_type,
            offset,
            instances,
        });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport { x, y, width, height });
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear(&self, mask: GlEnum) {
        self.record(GlCall::Clear(mask));
    }

    fn get_parameter_i32(&self, parameter: GlEnum) -> i32 {
        self.parameters.get(&parameter).copied().unwrap_or(0)
    }

    fn read_pixels(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: GlEnum,
        ty: GlEnum,
        pixels: &mut [u8],
    ) {
        pixels.fill(0xff);
        self.record(GlCall::ReadPixels { x, y, width, height, format, ty });
    }
}
