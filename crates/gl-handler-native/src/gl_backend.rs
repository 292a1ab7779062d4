//! [`GlContext`] on top of the `gl` crate's global function pointers.

use std::ffi::{c_void, CStr, CString};
use std::marker::PhantomData;
use std::ptr;
use std::sync::Once;

use anyhow::{bail, Result};
use gl::types::{GLchar, GLint, GLsizei, GLuint};
use gl_handler::context::{
    ActiveVariable, Buffer, BufferTarget, BufferUsage, DrawMode, Framebuffer, GlContext, GlEnum,
    Program, Renderbuffer, Shader, ShaderStage, Texture, UniformLocation, VertexArray,
};
use tracing::{debug, trace, warn};

pub(crate) static GL_INIT_ONCE: Once = Once::new();

/// Upper bound for names returned by `glGetActiveUniform`/`glGetActiveAttrib`.
const MAX_NAME_LEN: usize = 256;

/// The OpenGL context current on the calling thread.
///
/// Holds no state of its own; every call goes straight to the driver.
/// Not `Send`: GL contexts are bound to one thread.
#[derive(Debug)]
pub struct NativeGl {
    _not_send: PhantomData<*const ()>,
}

impl NativeGl {
    /// Wrap the context current on this thread.
    ///
    /// GL function pointers are loaded exactly once via `gl_loader`. Fails
    /// when the entry points did not resolve or the context is older than
    /// 3.0.
    ///
    /// # Safety
    ///
    /// A GL 3.3 / ES 3.0 context must be current on the calling thread for
    /// as long as the returned value is used.
    pub unsafe fn current() -> Result<Self> {
        GL_INIT_ONCE.call_once(|| {
            gl_loader::init_gl();
            gl::load_with(|s| gl_loader::get_proc_address(s).cast());
        });

        if !gl::CreateShader::is_loaded() || !gl::GenVertexArrays::is_loaded() {
            bail!("OpenGL entry points failed to load; is a context current?");
        }

        let mut major = 0;
        let mut minor = 0;
        gl::GetIntegerv(gl::MAJOR_VERSION, &mut major);
        gl::GetIntegerv(gl::MINOR_VERSION, &mut minor);
        if major < 3 {
            bail!("OpenGL 3.0 or newer required, context reports {major}.{minor}");
        }

        let version = gl_string(gl::VERSION).unwrap_or_default();
        let renderer = gl_string(gl::RENDERER).unwrap_or_default();
        debug!(major, minor, %version, %renderer, "using native GL context");

        Ok(Self {
            _not_send: PhantomData,
        })
    }

    /// Drain `glGetError` and fail if anything was pending.
    pub fn check_errors(&self, label: &str) -> Result<()> {
        let mut codes = Vec::new();
        loop {
            let code = unsafe { gl::GetError() };
            if code == gl::NO_ERROR {
                break;
            }
            codes.push(code);
        }
        if codes.is_empty() {
            return Ok(());
        }
        let codes: Vec<String> = codes.iter().map(|c| format!("{c:#06x}")).collect();
        bail!("GL errors after {label}: {}", codes.join(", "))
    }
}

unsafe fn gl_string(name: GlEnum) -> Option<String> {
    let raw = gl::GetString(name);
    if raw.is_null() {
        return None;
    }
    Some(CStr::from_ptr(raw.cast()).to_string_lossy().into_owned())
}

fn c_name(name: &str) -> Option<CString> {
    match CString::new(name) {
        Ok(name) => Some(name),
        Err(_) => {
            warn!(name, "name contains a NUL byte");
            None
        }
    }
}

fn gl_bool(value: bool) -> u8 {
    if value {
        gl::TRUE
    } else {
        gl::FALSE
    }
}

fn raw<T>(handle: Option<T>, get: impl FnOnce(T) -> u32) -> GLuint {
    handle.map_or(0, get)
}

fn read_log(len: GLint, fill: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u8; len as usize];
    let mut written: GLsizei = 0;
    fill(len, &mut written, buf.as_mut_ptr().cast());
    buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buf).into_owned()
}

type ActiveQuery = unsafe fn(GLuint, GLuint, GLsizei, *mut GLsizei, *mut GLint, *mut GLuint, *mut GLchar);

fn active_variable(query: ActiveQuery, program: Program, index: u32) -> Option<ActiveVariable> {
    let mut buf = [0u8; MAX_NAME_LEN];
    let mut written: GLsizei = 0;
    let mut size: GLint = 0;
    let mut type_id: GLuint = 0;
    unsafe {
        query(
            program.raw(),
            index,
            MAX_NAME_LEN as GLsizei,
            &mut written,
            &mut size,
            &mut type_id,
            buf.as_mut_ptr().cast(),
        );
    }
    if written <= 0 {
        return None;
    }
    let name = String::from_utf8_lossy(&buf[..written as usize]).into_owned();
    Some(ActiveVariable { name, size, type_id })
}

impl GlContext for NativeGl {
    fn create_shader(&self, stage: ShaderStage) -> Option<Shader> {
        Shader::from_raw(unsafe { gl::CreateShader(stage.gl()) })
    }

    fn shader_source(&self, shader: Shader, source: &str) {
        let ptr = source.as_ptr().cast::<GLchar>();
        let len = source.len() as GLint;
        unsafe { gl::ShaderSource(shader.raw(), 1, &ptr, &len) };
    }

    fn compile_shader(&self, shader: Shader) {
        unsafe { gl::CompileShader(shader.raw()) };
    }

    fn shader_compile_status(&self, shader: Shader) -> bool {
        let mut status = 0;
        unsafe { gl::GetShaderiv(shader.raw(), gl::COMPILE_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: Shader) -> String {
        let mut len = 0;
        unsafe { gl::GetShaderiv(shader.raw(), gl::INFO_LOG_LENGTH, &mut len) };
        read_log(len, |cap, written, buf| unsafe {
            gl::GetShaderInfoLog(shader.raw(), cap, written, buf)
        })
    }

    fn delete_shader(&self, shader: Shader) {
        unsafe { gl::DeleteShader(shader.raw()) };
    }

    fn create_program(&self) -> Option<Program> {
        Program::from_raw(unsafe { gl::CreateProgram() })
    }

    fn attach_shader(&self, program: Program, shader: Shader) {
        unsafe { gl::AttachShader(program.raw(), shader.raw()) };
    }

    fn transform_feedback_varyings(&self, program: Program, varyings: &[&str]) {
        let names: Option<Vec<CString>> = varyings.iter().map(|v| c_name(v)).collect();
        let Some(names) = names else { return };
        let ptrs: Vec<*const GLchar> = names.iter().map(|n| n.as_ptr()).collect();
        unsafe {
            gl::TransformFeedbackVaryings(
                program.raw(),
                ptrs.len() as GLsizei,
                ptrs.as_ptr(),
                gl::INTERLEAVED_ATTRIBS,
            )
        };
    }

    fn link_program(&self, program: Program) {
        unsafe { gl::LinkProgram(program.raw()) };
    }

    fn program_link_status(&self, program: Program) -> bool {
        let mut status = 0;
        unsafe { gl::GetProgramiv(program.raw(), gl::LINK_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: Program) -> String {
        let mut len = 0;
        unsafe { gl::GetProgramiv(program.raw(), gl::INFO_LOG_LENGTH, &mut len) };
        read_log(len, |cap, written, buf| unsafe {
            gl::GetProgramInfoLog(program.raw(), cap, written, buf)
        })
    }

    fn use_program(&self, program: Option<Program>) {
        unsafe { gl::UseProgram(raw(program, Program::raw)) };
    }

    fn delete_program(&self, program: Program) {
        unsafe { gl::DeleteProgram(program.raw()) };
    }

    fn active_uniform_count(&self, program: Program) -> u32 {
        let mut count = 0;
        unsafe { gl::GetProgramiv(program.raw(), gl::ACTIVE_UNIFORMS, &mut count) };
        count.max(0) as u32
    }

    fn active_uniform(&self, program: Program, index: u32) -> Option<ActiveVariable> {
        active_variable(gl::GetActiveUniform, program, index)
    }

    fn uniform_location(&self, program: Program, name: &str) -> Option<UniformLocation> {
        let name = c_name(name)?;
        let location = unsafe { gl::GetUniformLocation(program.raw(), name.as_ptr()) };
        (location >= 0).then_some(UniformLocation(location))
    }

    fn active_attribute_count(&self, program: Program) -> u32 {
        let mut count = 0;
        unsafe { gl::GetProgramiv(program.raw(), gl::ACTIVE_ATTRIBUTES, &mut count) };
        count.max(0) as u32
    }

    fn active_attribute(&self, program: Program, index: u32) -> Option<ActiveVariable> {
        active_variable(gl::GetActiveAttrib, program, index)
    }

    fn attrib_location(&self, program: Program, name: &str) -> i32 {
        match c_name(name) {
            Some(name) => unsafe { gl::GetAttribLocation(program.raw(), name.as_ptr()) },
            None => -1,
        }
    }

    fn uniform_block_index(&self, program: Program, name: &str) -> Option<u32> {
        let name = c_name(name)?;
        let index = unsafe { gl::GetUniformBlockIndex(program.raw(), name.as_ptr()) };
        (index != gl::INVALID_INDEX).then_some(index)
    }

    fn uniform_block_data_size(&self, program: Program, block_index: u32) -> i32 {
        let mut size = 0;
        unsafe {
            gl::GetActiveUniformBlockiv(
                program.raw(),
                block_index,
                gl::UNIFORM_BLOCK_DATA_SIZE,
                &mut size,
            )
        };
        size
    }

    fn uniform_indices(&self, program: Program, names: &[&str]) -> Vec<Option<u32>> {
        let Some(c_names) = names.iter().map(|n| c_name(n)).collect::<Option<Vec<_>>>() else {
            return vec![None; names.len()];
        };
        let ptrs: Vec<*const GLchar> = c_names.iter().map(|n| n.as_ptr()).collect();
        let mut indices = vec![gl::INVALID_INDEX; names.len()];
        unsafe {
            gl::GetUniformIndices(
                program.raw(),
                ptrs.len() as GLsizei,
                ptrs.as_ptr(),
                indices.as_mut_ptr(),
            )
        };
        indices
            .into_iter()
            .map(|i| (i != gl::INVALID_INDEX).then_some(i))
            .collect()
    }

    fn uniform_offsets(&self, program: Program, indices: &[u32]) -> Vec<i32> {
        let mut offsets = vec![-1; indices.len()];
        if indices.is_empty() {
            return offsets;
        }
        unsafe {
            gl::GetActiveUniformsiv(
                program.raw(),
                indices.len() as GLsizei,
                indices.as_ptr(),
                gl::UNIFORM_OFFSET,
                offsets.as_mut_ptr(),
            )
        };
        offsets
    }

    fn uniform_block_binding(&self, program: Program, block_index: u32, binding_point: u32) {
        unsafe { gl::UniformBlockBinding(program.raw(), block_index, binding_point) };
    }

    fn uniform_1_f32(&self, location: UniformLocation, x: f32) {
        unsafe { gl::Uniform1f(location.0, x) };
    }

    fn uniform_2_f32(&self, location: UniformLocation, v: &[f32; 2]) {
        unsafe { gl::Uniform2fv(location.0, 1, v.as_ptr()) };
    }

    fn uniform_3_f32(&self, location: UniformLocation, v: &[f32; 3]) {
        unsafe { gl::Uniform3fv(location.0, 1, v.as_ptr()) };
    }

    fn uniform_4_f32(&self, location: UniformLocation, v: &[f32; 4]) {
        unsafe { gl::Uniform4fv(location.0, 1, v.as_ptr()) };
    }

    fn uniform_1_i32(&self, location: UniformLocation, x: i32) {
        unsafe { gl::Uniform1i(location.0, x) };
    }

    fn uniform_2_i32(&self, location: UniformLocation, v: &[i32; 2]) {
        unsafe { gl::Uniform2iv(location.0, 1, v.as_ptr()) };
    }

    fn uniform_3_i32(&self, location: UniformLocation, v: &[i32; 3]) {
        unsafe { gl::Uniform3iv(location.0, 1, v.as_ptr()) };
    }

    fn uniform_4_i32(&self, location: UniformLocation, v: &[i32; 4]) {
        unsafe { gl::Uniform4iv(location.0, 1, v.as_ptr()) };
    }

    fn uniform_matrix_2_f32(&self, location: UniformLocation, m: &[f32; 4]) {
        unsafe { gl::UniformMatrix2fv(location.0, 1, gl::FALSE, m.as_ptr()) };
    }

    fn uniform_matrix_3_f32(&self, location: UniformLocation, m: &[f32; 9]) {
        unsafe { gl::UniformMatrix3fv(location.0, 1, gl::FALSE, m.as_ptr()) };
    }

    fn uniform_matrix_4_f32(&self, location: UniformLocation, m: &[f32; 16]) {
        unsafe { gl::UniformMatrix4fv(location.0, 1, gl::FALSE, m.as_ptr()) };
    }

    fn uniform_matrix_2x3_f32(&self, location: UniformLocation, m: &[f32; 6]) {
        unsafe { gl::UniformMatrix2x3fv(location.0, 1, gl::FALSE, m.as_ptr()) };
    }

    fn uniform_matrix_2x4_f32(&self, location: UniformLocation, m: &[f32; 8]) {
        unsafe { gl::UniformMatrix2x4fv(location.0, 1, gl::FALSE, m.as_ptr()) };
    }

    fn uniform_matrix_3x2_f32(&self, location: UniformLocation, m: &[f32; 6]) {
        unsafe { gl::UniformMatrix3x2fv(location.0, 1, gl::FALSE, m.as_ptr()) };
    }

    fn uniform_matrix_3x4_f32(&self, location: UniformLocation, m: &[f32; 12]) {
        unsafe { gl::UniformMatrix3x4fv(location.0, 1, gl::FALSE, m.as_ptr()) };
    }

    fn uniform_matrix_4x2_f32(&self, location: UniformLocation, m: &[f32; 8]) {
        unsafe { gl::UniformMatrix4x2fv(location.0, 1, gl::FALSE, m.as_ptr()) };
    }

    fn uniform_matrix_4x3_f32(&self, location: UniformLocation, m: &[f32; 12]) {
        unsafe { gl::UniformMatrix4x3fv(location.0, 1, gl::FALSE, m.as_ptr()) };
    }

    fn gen_texture(&self) -> Option<Texture> {
        let mut name = 0;
        unsafe { gl::GenTextures(1, &mut name) };
        Texture::from_raw(name)
    }

    fn bind_texture(&self, texture: Option<Texture>) {
        unsafe { gl::BindTexture(gl::TEXTURE_2D, raw(texture, Texture::raw)) };
    }

    fn active_texture(&self, unit: u32) {
        unsafe { gl::ActiveTexture(gl::TEXTURE0 + unit) };
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
        let data = pixels.map_or(ptr::null(), |p| p.as_ptr().cast::<c_void>());
        unsafe {
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                internal_format,
                width,
                height,
                0,
                format,
                ty,
                data,
            )
        };
    }

    fn tex_parameter_i32(&self, parameter: GlEnum, value: i32) {
        unsafe { gl::TexParameteri(gl::TEXTURE_2D, parameter, value) };
    }

    fn delete_texture(&self, texture: Texture) {
        unsafe { gl::DeleteTextures(1, &texture.raw()) };
    }

    fn gen_framebuffer(&self) -> Option<Framebuffer> {
        let mut name = 0;
        unsafe { gl::GenFramebuffers(1, &mut name) };
        Framebuffer::from_raw(name)
    }

    fn bind_framebuffer(&self, framebuffer: Option<Framebuffer>) {
        unsafe { gl::BindFramebuffer(gl::FRAMEBUFFER, raw(framebuffer, Framebuffer::raw)) };
    }

    fn framebuffer_texture_2d(&self, attachment: GlEnum, texture: Option<Texture>, level: i32) {
        unsafe {
            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                attachment,
                gl::TEXTURE_2D,
                raw(texture, Texture::raw),
                level,
            )
        };
    }

    fn framebuffer_renderbuffer(&self, attachment: GlEnum, renderbuffer: Option<Renderbuffer>) {
        unsafe {
            gl::FramebufferRenderbuffer(
                gl::FRAMEBUFFER,
                attachment,
                gl::RENDERBUFFER,
                raw(renderbuffer, Renderbuffer::raw),
            )
        };
    }

    fn check_framebuffer_status(&self) -> GlEnum {
        unsafe { gl::CheckFramebufferStatus(gl::FRAMEBUFFER) }
    }

    fn delete_framebuffer(&self, framebuffer: Framebuffer) {
        unsafe { gl::DeleteFramebuffers(1, &framebuffer.raw()) };
    }

    fn gen_renderbuffer(&self) -> Option<Renderbuffer> {
        let mut name = 0;
        unsafe { gl::GenRenderbuffers(1, &mut name) };
        Renderbuffer::from_raw(name)
    }

    fn bind_renderbuffer(&self, renderbuffer: Option<Renderbuffer>) {
        unsafe { gl::BindRenderbuffer(gl::RENDERBUFFER, raw(renderbuffer, Renderbuffer::raw)) };
    }

    fn renderbuffer_storage(&self, internal_format: GlEnum, width: i32, height: i32) {
        unsafe { gl::RenderbufferStorage(gl::RENDERBUFFER, internal_format, width, height) };
    }

    fn delete_renderbuffer(&self, renderbuffer: Renderbuffer) {
        unsafe { gl::DeleteRenderbuffers(1, &renderbuffer.raw()) };
    }

    fn gen_buffer(&self) -> Option<Buffer> {
        let mut name = 0;
        unsafe { gl::GenBuffers(1, &mut name) };
        Buffer::from_raw(name)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Buffer>) {
        unsafe { gl::BindBuffer(target.gl(), raw(buffer, Buffer::raw)) };
    }

    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: Option<Buffer>) {
        unsafe { gl::BindBufferBase(target.gl(), index, raw(buffer, Buffer::raw)) };
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        trace!(?target, len = data.len(), "buffer upload");
        unsafe {
            gl::BufferData(
                target.gl(),
                data.len() as isize,
                data.as_ptr().cast(),
                usage.gl(),
            )
        };
    }

    fn buffer_data_size(&self, target: BufferTarget, size: i32, usage: BufferUsage) {
        unsafe { gl::BufferData(target.gl(), size as isize, ptr::null(), usage.gl()) };
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: i32, data: &[u8]) {
        unsafe {
            gl::BufferSubData(
                target.gl(),
                offset as isize,
                data.len() as isize,
                data.as_ptr().cast(),
            )
        };
    }

    fn delete_buffer(&self, buffer: Buffer) {
        unsafe { gl::DeleteBuffers(1, &buffer.raw()) };
    }

    fn gen_vertex_array(&self) -> Option<VertexArray> {
        let mut name = 0;
        unsafe { gl::GenVertexArrays(1, &mut name) };
        VertexArray::from_raw(name)
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArray>) {
        unsafe { gl::BindVertexArray(raw(vertex_array, VertexArray::raw)) };
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { gl::EnableVertexAttribArray(index) };
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
        // Byte offset into the bound array buffer, passed as a pointer.
        let offset = offset as usize as *const c_void;
        unsafe {
            gl::VertexAttribPointer(index, size, data_type, gl_bool(normalized), stride, offset)
        };
    }

    fn vertex_attrib_divisor(&self, index: u32, divisor: u32) {
        unsafe { gl::VertexAttribDivisor(index, divisor) };
    }

    fn delete_vertex_array(&self, vertex_array: VertexArray) {
        unsafe { gl::DeleteVertexArrays(1, &vertex_array.raw()) };
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        unsafe { gl::DrawArrays(mode.gl(), first, count) };
    }

    fn draw_arrays_instanced(&self, mode: DrawMode, first: i32, count: i32, instances: i32) {
        unsafe { gl::DrawArraysInstanced(mode.gl(), first, count, instances) };
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, element_type: GlEnum, offset: i32) {
        let offset = offset as usize as *const c_void;
        unsafe { gl::DrawElements(mode.gl(), count, element_type, offset) };
    }

    fn draw_elements_instanced(
        &self,
        mode: DrawMode,
        count: i32,
        element_type: GlEnum,
        offset: i32,
        instances: i32,
    ) {
        let offset = offset as usize as *const c_void;
        unsafe { gl::DrawElementsInstanced(mode.gl(), count, element_type, offset, instances) };
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { gl::Viewport(x, y, width, height) };
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { gl::ClearColor(r, g, b, a) };
    }

    fn clear(&self, mask: GlEnum) {
        unsafe { gl::Clear(mask) };
    }

    fn get_parameter_i32(&self, parameter: GlEnum) -> i32 {
        let mut value = 0;
        unsafe { gl::GetIntegerv(parameter, &mut value) };
        value
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
        unsafe {
            gl::ReadPixels(
                x,
                y,
                width,
                height,
                format,
                ty,
                pixels.as_mut_ptr().cast(),
            )
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gl_bool_maps_to_driver_constants() {
        assert_eq!(gl_bool(true), gl::TRUE);
        assert_eq!(gl_bool(false), gl::FALSE);
    }

    #[test]
    fn null_handles_become_object_zero() {
        assert_eq!(raw(None::<Texture>, Texture::raw), 0);
        assert_eq!(raw(Texture::from_raw(7), Texture::raw), 7);
    }

    #[test]
    fn logs_are_truncated_to_what_the_driver_wrote() {
        let log = read_log(16, |_, written, buf| unsafe {
            ptr::copy_nonoverlapping(b"error".as_ptr(), buf.cast::<u8>(), 5);
            *written = 5;
        });
        assert_eq!(log, "error");
        assert_eq!(read_log(0, |_, _, _| unreachable!()), "");
    }

    #[test]
    fn interior_nul_names_are_rejected() {
        assert!(c_name("u_time").is_some());
        assert!(c_name("u_\0time").is_none());
    }
}
