//! Reset shared context state before handing the context back to a host.

use crate::context::{BufferTarget, GlContext};

/// Unbind the program, the 2D texture of every combined texture unit, the
/// vertex array, the array and element buffers and the framebuffer.
///
/// Leaves texture unit 0 active.
pub fn reset_bindings(ctx: &dyn GlContext) {
    ctx.use_program(None);

    let units = ctx.get_parameter_i32(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS).max(1) as u32;
    for unit in 0..units {
        ctx.active_texture(unit);
        ctx.bind_texture(None);
    }
    ctx.active_texture(0);

    ctx.bind_vertex_array(None);
    ctx.bind_buffer(BufferTarget::Array, None);
    ctx.bind_buffer(BufferTarget::ElementArray, None);
    ctx.bind_framebuffer(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Program, Texture, VertexArray};
    use crate::mock::RecordingContext;

    #[test]
    fn everything_is_unbound() {
        let ctx = RecordingContext::new().with_max_texture_units(4);
        ctx.use_program(Program::from_raw(3));
        ctx.active_texture(2);
        ctx.bind_texture(Texture::from_raw(5));
        ctx.bind_vertex_array(VertexArray::from_raw(6));

        reset_bindings(&ctx);
        assert_eq!(ctx.current_program(), None);
        assert_eq!(ctx.bound_texture(2), None);
        assert_eq!(ctx.active_texture_unit(), 0);
        assert_eq!(ctx.bound_vertex_array(), None);
        assert_eq!(ctx.bound_framebuffer(), None);
    }
}
