//! The graphics-context capability every component operates through.
//!
//! [`GlContext`] is a thin, object-safe view of an OpenGL 3.3 / ES 3.0
//! context. Components never own a context; they receive `&dyn GlContext`
//! per operation and document which bindings they expect to be current on
//! entry and which they leave bound on return.
//!
//! The context is single-threaded: all calls happen on the thread that owns
//! it, ordered by the driver's command submission.

use std::fmt;
use std::num::NonZeroU32;

/// Raw GL enumeration value (`GLenum`).
pub type GlEnum = u32;

macro_rules! gl_handle {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub NonZeroU32);

            impl $name {
                /// Wrap a raw GL object name. Zero is the null object.
                pub fn from_raw(raw: u32) -> Option<Self> {
                    NonZeroU32::new(raw).map(Self)
                }

                /// The raw GL object name.
                pub fn raw(self) -> u32 {
                    self.0.get()
                }
            }
        )*
    };
}

gl_handle!(
    /// A shader object (one pipeline stage).
    Shader,
    /// A shader program object.
    Program,
    /// A buffer object.
    Buffer,
    /// A texture object.
    Texture,
    /// A framebuffer object.
    Framebuffer,
    /// A renderbuffer object.
    Renderbuffer,
    /// A vertex array object.
    VertexArray,
);

/// Binding location of a uniform inside one linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// Shader pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl(self) -> GlEnum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Buffer binding target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
    Uniform,
}

impl BufferTarget {
    pub fn gl(self) -> GlEnum {
        match self {
            BufferTarget::Array => gl::ARRAY_BUFFER,
            BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
            BufferTarget::Uniform => gl::UNIFORM_BUFFER,
        }
    }
}

/// Usage hint for buffer uploads, chosen by how often the data is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    #[default]
    Static,
    /// Rewritten occasionally.
    Dynamic,
    /// Rewritten every frame.
    Stream,
}

impl BufferUsage {
    pub fn gl(self) -> GlEnum {
        match self {
            BufferUsage::Static => gl::STATIC_DRAW,
            BufferUsage::Dynamic => gl::DYNAMIC_DRAW,
            BufferUsage::Stream => gl::STREAM_DRAW,
        }
    }
}

/// Primitive topology for draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl DrawMode {
    pub fn gl(self) -> GlEnum {
        match self {
            DrawMode::Points => gl::POINTS,
            DrawMode::Lines => gl::LINES,
            DrawMode::LineStrip => gl::LINE_STRIP,
            DrawMode::Triangles => gl::TRIANGLES,
            DrawMode::TriangleStrip => gl::TRIANGLE_STRIP,
            DrawMode::TriangleFan => gl::TRIANGLE_FAN,
        }
    }
}

/// One entry of a program's active uniform or attribute list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveVariable {
    /// Name as reported by the driver; arrays carry a `[0]` suffix.
    pub name: String,
    /// Array length (1 for non-arrays).
    pub size: i32,
    /// GL type enumeration (`GL_FLOAT_VEC3`, `GL_SAMPLER_2D`, ...).
    pub type_id: GlEnum,
}

/// Opaque capability over a current OpenGL context.
///
/// Object-creation methods return `None` when the driver hands back the null
/// object. Uniform writes target the program made current with
/// [`use_program`](GlContext::use_program). Matrices are column-major and
/// never transposed.
pub trait GlContext {
    // --- shaders and programs ---

    fn create_shader(&self, stage: ShaderStage) -> Option<Shader>;
    fn shader_source(&self, shader: Shader, source: &str);
    fn compile_shader(&self, shader: Shader);
    fn shader_compile_status(&self, shader: Shader) -> bool;
    fn shader_info_log(&self, shader: Shader) -> String;
    fn delete_shader(&self, shader: Shader);

    fn create_program(&self) -> Option<Program>;
    fn attach_shader(&self, program: Program, shader: Shader);
    /// Register interleaved transform-feedback varyings before linking.
    fn transform_feedback_varyings(&self, program: Program, varyings: &[&str]);
    fn link_program(&self, program: Program);
    fn program_link_status(&self, program: Program) -> bool;
    fn program_info_log(&self, program: Program) -> String;
    fn use_program(&self, program: Option<Program>);
    fn delete_program(&self, program: Program);

    // --- reflection ---

    fn active_uniform_count(&self, program: Program) -> u32;
    fn active_uniform(&self, program: Program, index: u32) -> Option<ActiveVariable>;
    /// `None` for uniforms living inside a uniform block.
    fn uniform_location(&self, program: Program, name: &str) -> Option<UniformLocation>;
    fn active_attribute_count(&self, program: Program) -> u32;
    fn active_attribute(&self, program: Program, index: u32) -> Option<ActiveVariable>;
    /// Negative when the attribute is not active in the program.
    fn attrib_location(&self, program: Program, name: &str) -> i32;

    // --- uniform blocks ---

    fn uniform_block_index(&self, program: Program, name: &str) -> Option<u32>;
    fn uniform_block_data_size(&self, program: Program, block_index: u32) -> i32;
    /// Index per name, `None` for names that are not active.
    fn uniform_indices(&self, program: Program, names: &[&str]) -> Vec<Option<u32>>;
    fn uniform_offsets(&self, program: Program, indices: &[u32]) -> Vec<i32>;
    fn uniform_block_binding(&self, program: Program, block_index: u32, binding_point: u32);

    // --- uniform writes ---

    fn uniform_1_f32(&self, location: UniformLocation, x: f32);
    fn uniform_2_f32(&self, location: UniformLocation, v: &[f32; 2]);
    fn uniform_3_f32(&self, location: UniformLocation, v: &[f32; 3]);
    fn uniform_4_f32(&self, location: UniformLocation, v: &[f32; 4]);
    fn uniform_1_i32(&self, location: UniformLocation, x: i32);
    fn uniform_2_i32(&self, location: UniformLocation, v: &[i32; 2]);
    fn uniform_3_i32(&self, location: UniformLocation, v: &[i32; 3]);
    fn uniform_4_i32(&self, location: UniformLocation, v: &[i32; 4]);
    fn uniform_matrix_2_f32(&self, location: UniformLocation, m: &[f32; 4]);
    fn uniform_matrix_3_f32(&self, location: UniformLocation, m: &[f32; 9]);
    fn uniform_matrix_4_f32(&self, location: UniformLocation, m: &[f32; 16]);
    fn uniform_matrix_2x3_f32(&self, location: UniformLocation, m: &[f32; 6]);
    fn uniform_matrix_2x4_f32(&self, location: UniformLocation, m: &[f32; 8]);
    fn uniform_matrix_3x2_f32(&self, location: UniformLocation, m: &[f32; 6]);
    fn uniform_matrix_3x4_f32(&self, location: UniformLocation, m: &[f32; 12]);
    fn uniform_matrix_4x2_f32(&self, location: UniformLocation, m: &[f32; 8]);
    fn uniform_matrix_4x3_f32(&self, location: UniformLocation, m: &[f32; 12]);

    // --- textures ---

    fn gen_texture(&self) -> Option<Texture>;
    /// Bind to `TEXTURE_2D` of the active unit.
    fn bind_texture(&self, texture: Option<Texture>);
    /// Select texture unit `unit` (`TEXTURE0 + unit`).
    fn active_texture(&self, unit: u32);
    /// `glTexImage2D` on the bound `TEXTURE_2D`, mip level 0.
    fn tex_image_2d(
        &self,
        internal_format: i32,
        width: i32,
        height: i32,
        format: GlEnum,
        ty: GlEnum,
        pixels: Option<&[u8]>,
    );
    fn tex_parameter_i32(&self, parameter: GlEnum, value: i32);
    fn delete_texture(&self, texture: Texture);

    // --- framebuffers and renderbuffers ---

    fn gen_framebuffer(&self) -> Option<Framebuffer>;
    fn bind_framebuffer(&self, framebuffer: Option<Framebuffer>);
    fn framebuffer_texture_2d(&self, attachment: GlEnum, texture: Option<Texture>, level: i32);
    fn framebuffer_renderbuffer(&self, attachment: GlEnum, renderbuffer: Option<Renderbuffer>);
    fn check_framebuffer_status(&self) -> GlEnum;
    fn delete_framebuffer(&self, framebuffer: Framebuffer);

    fn gen_renderbuffer(&self) -> Option<Renderbuffer>;
    fn bind_renderbuffer(&self, renderbuffer: Option<Renderbuffer>);
    fn renderbuffer_storage(&self, internal_format: GlEnum, width: i32, height: i32);
    fn delete_renderbuffer(&self, renderbuffer: Renderbuffer);

    // --- buffers ---

    fn gen_buffer(&self) -> Option<Buffer>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Buffer>);
    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: Option<Buffer>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn buffer_data_size(&self, target: BufferTarget, size: i32, usage: BufferUsage);
    fn buffer_sub_data(&self, target: BufferTarget, offset: i32, data: &[u8]);
    fn delete_buffer(&self, buffer: Buffer);

    // --- vertex arrays ---

    fn gen_vertex_array(&self) -> Option<VertexArray>;
    fn bind_vertex_array(&self, vertex_array: Option<VertexArray>);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: GlEnum,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn vertex_attrib_divisor(&self, index: u32, divisor: u32);
    fn delete_vertex_array(&self, vertex_array: VertexArray);

    // --- drawing and state ---

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32);
    fn draw_arrays_instanced(&self, mode: DrawMode, first: i32, count: i32, instances: i32);
    fn draw_elements(&self, mode: DrawMode, count: i32, element_type: GlEnum, offset: i32);
    fn draw_elements_instanced(
        &self,
        mode: DrawMode,
        count: i32,
        element_type: GlEnum,
        offset: i32,
        instances: i32,
    );
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&self, mask: GlEnum);
    fn get_parameter_i32(&self, parameter: GlEnum) -> i32;
    fn read_pixels(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: GlEnum,
        ty: GlEnum,
        pixels: &mut [u8],
    );
}
