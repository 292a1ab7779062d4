//! Framebuffers, picking targets and pixel readback.

use tracing::{debug, warn};

use crate::context::{Framebuffer, GlContext, GlEnum, Renderbuffer, Texture};
use crate::error::{GlError, Result};

use super::texture::{apply_wrap, gen_texture, TextureWrap};

/// Point `framebuffer`'s colour attachment 0 at `texture`, mip level 0.
///
/// Expects `framebuffer` bound; leaves it bound.
pub(crate) fn attach<C: GlContext + ?Sized>(ctx: &C, texture: Option<Texture>) {
    ctx.framebuffer_texture_2d(gl::COLOR_ATTACHMENT0, texture, 0);
}

/// Warn about an incomplete framebuffer; drivers only fail at draw time.
pub(crate) fn check_complete<C: GlContext + ?Sized>(ctx: &C, framebuffer: Framebuffer) -> bool {
    let status = ctx.check_framebuffer_status();
    if status != gl::FRAMEBUFFER_COMPLETE {
        warn!(framebuffer = framebuffer.raw(), status, "framebuffer incomplete");
        return false;
    }
    true
}

pub(crate) fn gen_framebuffer<C: GlContext + ?Sized>(ctx: &C) -> Result<Framebuffer> {
    ctx.gen_framebuffer().ok_or(GlError::ObjectCreation("framebuffer"))
}

// ----------------------------------------------------------------------------
// Picking
// ----------------------------------------------------------------------------

/// Off-screen colour + depth target for object picking.
///
/// The colour texture samples linearly with clamped edges; the depth
/// attachment is a renderbuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickingTarget {
    pub framebuffer: Framebuffer,
    pub texture: Texture,
    pub depth: Renderbuffer,
}

impl PickingTarget {
    /// Objects created before a failure are deleted again.
    pub(crate) fn create<C: GlContext + ?Sized>(ctx: &C, width: i32, height: i32) -> Result<Self> {
        let texture = gen_texture(ctx)?;
        ctx.bind_texture(Some(texture));
        ctx.tex_parameter_i32(gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
        apply_wrap(ctx, TextureWrap::ClampToEdge);

        let Some(depth) = ctx.gen_renderbuffer() else {
            ctx.delete_texture(texture);
            return Err(GlError::ObjectCreation("renderbuffer"));
        };
        ctx.bind_renderbuffer(Some(depth));

        let framebuffer = match gen_framebuffer(ctx) {
            Ok(framebuffer) => framebuffer,
            Err(err) => {
                ctx.delete_renderbuffer(depth);
                ctx.delete_texture(texture);
                return Err(err);
            }
        };
        let target = Self {
            framebuffer,
            texture,
            depth,
        };
        target.resize_with(ctx, width, height);

        ctx.bind_framebuffer(Some(framebuffer));
        attach(ctx, Some(texture));
        ctx.framebuffer_renderbuffer(gl::DEPTH_ATTACHMENT, Some(depth));
        check_complete(ctx, framebuffer);
        ctx.bind_framebuffer(None);

        debug!(framebuffer = framebuffer.raw(), width, height, "created picking target");
        Ok(target)
    }

    /// Re-specify RGBA8 colour and 16-bit depth storage at a new size.
    ///
    /// Leaves the colour texture and depth renderbuffer bound.
    pub fn resize(&self, ctx: &dyn GlContext, width: i32, height: i32) {
        self.resize_with(ctx, width, height);
    }

    fn resize_with<C: GlContext + ?Sized>(&self, ctx: &C, width: i32, height: i32) {
        ctx.bind_texture(Some(self.texture));
        ctx.tex_image_2d(gl::RGBA8 as i32, width, height, gl::RGBA, gl::UNSIGNED_BYTE, None);
        ctx.bind_renderbuffer(Some(self.depth));
        ctx.renderbuffer_storage(gl::DEPTH_COMPONENT16, width, height);
    }

    pub fn destroy(self, ctx: &dyn GlContext) {
        ctx.delete_framebuffer(self.framebuffer);
        ctx.delete_renderbuffer(self.depth);
        ctx.delete_texture(self.texture);
    }
}

// ----------------------------------------------------------------------------
// Readback
// ----------------------------------------------------------------------------

/// Reads rectangles of the bound read framebuffer in the implementation's
/// preferred read format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelReader {
    pub format: GlEnum,
    pub component_type: GlEnum,
}

impl PixelReader {
    /// Query the implementation read format and type.
    pub fn new(ctx: &dyn GlContext) -> Self {
        Self {
            format: ctx.get_parameter_i32(gl::IMPLEMENTATION_COLOR_READ_FORMAT) as GlEnum,
            component_type: ctx.get_parameter_i32(gl::IMPLEMENTATION_COLOR_READ_TYPE) as GlEnum,
        }
    }

    /// 4 for RGBA reads, 3 otherwise.
    pub fn bytes_per_pixel(&self) -> usize {
        if self.format == gl::RGBA {
            4
        } else {
            3
        }
    }

    pub fn read(&self, ctx: &dyn GlContext, x: i32, y: i32, width: i32, height: i32) -> Vec<u8> {
        let len = width.max(0) as usize * height.max(0) as usize * self.bytes_per_pixel();
        let mut pixels = vec![0; len];
        ctx.read_pixels(x, y, width, height, self.format, self.component_type, &mut pixels);
        pixels
    }
}
