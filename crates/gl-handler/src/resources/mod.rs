//! GPU resource creation: textures, framebuffers and data buffers.
//!
//! [`ResourceFactory`] is implemented for every [`GlContext`], including
//! `dyn GlContext`, so resource creation reads as a method on the context:
//!
//! ```rust
//! use gl_handler::context::{Framebuffer, GlContext, Texture};
//! use gl_handler::resources::{ResourceFactory, TextureFormat, TextureOptions};
//!
//! fn render_target(ctx: &dyn GlContext) -> gl_handler::Result<(Texture, Framebuffer)> {
//!     let texture = ctx.create_texture(64, 64, &TextureOptions::new(TextureFormat::Rgba16f))?;
//!     let framebuffer = ctx.create_framebuffer(texture)?;
//!     Ok((texture, framebuffer))
//! }
//! ```

mod framebuffer;
mod texture;

pub use framebuffer::{PickingTarget, PixelReader};
pub use texture::{
    TexelData, TextureFilter, TextureFormat, TextureOptions, TextureRecipe, TextureWrap, LUMINANCE,
};

use tracing::debug;

use crate::bytes::{as_byte_slice, AsBytes};
use crate::context::{Buffer, BufferTarget, BufferUsage, Framebuffer, GlContext, Texture};
use crate::error::{GlError, Result};

/// Resource constructors over a [`GlContext`].
pub trait ResourceFactory: GlContext {
    /// Create a 2D texture.
    ///
    /// Storage is uploaded first, then filter and wrap are applied as two
    /// independent steps. Texel data is validated before any object is
    /// created. Leaves the new texture bound on the active unit.
    fn create_texture(&self, width: i32, height: i32, options: &TextureOptions<'_>) -> Result<Texture>;

    /// [`create_texture`](Self::create_texture) from configuration keys
    /// (`"RGBA16F"`, `"LINEAR"`, `"CLAMP_TO_EDGE"`, ...). Unknown keys fail
    /// with [`GlError::UnsupportedFormat`] before anything is created.
    fn create_texture_from_keys(
        &self,
        width: i32,
        height: i32,
        format: &str,
        filter: Option<&str>,
        wrap: Option<&str>,
    ) -> Result<Texture> {
        let options = TextureOptions::from_keys(Some(format), filter, wrap)?;
        self.create_texture(width, height, &options)
    }

    /// Create a framebuffer with `texture` as its sole colour attachment at
    /// level 0. Depth and stencil are left to the caller.
    ///
    /// Unbinds the 2D texture first and leaves the default framebuffer bound.
    fn create_framebuffer(&self, texture: Texture) -> Result<Framebuffer>;

    /// Re-point the colour attachment of `framebuffer` at `texture`.
    ///
    /// Used to ping-pong between textures. Leaves `framebuffer` bound.
    fn attach_color(&self, framebuffer: Framebuffer, texture: Texture);

    /// Create a colour + depth target for picking.
    fn create_picking_target(&self, width: i32, height: i32) -> Result<PickingTarget>;

    /// Create a buffer on `target` and upload `data`. Leaves it bound.
    fn create_buffer<T: AsBytes>(&self, target: BufferTarget, data: &[T], usage: BufferUsage) -> Result<Buffer>;

    /// An array buffer for data rewritten every frame.
    fn create_stream_buffer(&self, data: &[f32]) -> Result<Buffer> {
        self.create_buffer(BufferTarget::Array, data, BufferUsage::Stream)
    }
}

impl<C: GlContext + ?Sized> ResourceFactory for C {
    fn create_texture(&self, width: i32, height: i32, options: &TextureOptions<'_>) -> Result<Texture> {
        options.validate(width, height)?;

        let texture = texture::gen_texture(self)?;
        self.bind_texture(Some(texture));
        texture::configure(self, width, height, options);

        debug!(
            texture = texture.raw(),
            width,
            height,
            format = ?options.format,
            "created texture"
        );
        Ok(texture)
    }

    fn create_framebuffer(&self, texture: Texture) -> Result<Framebuffer> {
        self.bind_texture(None);
        let framebuffer = framebuffer::gen_framebuffer(self)?;
        self.bind_framebuffer(Some(framebuffer));
        framebuffer::attach(self, Some(texture));
        framebuffer::check_complete(self, framebuffer);
        self.bind_framebuffer(None);

        debug!(framebuffer = framebuffer.raw(), texture = texture.raw(), "created framebuffer");
        Ok(framebuffer)
    }

    fn attach_color(&self, framebuffer: Framebuffer, texture: Texture) {
        self.bind_framebuffer(Some(framebuffer));
        framebuffer::attach(self, Some(texture));
    }

    fn create_picking_target(&self, width: i32, height: i32) -> Result<PickingTarget> {
        PickingTarget::create(self, width, height)
    }

    fn create_buffer<T: AsBytes>(&self, target: BufferTarget, data: &[T], usage: BufferUsage) -> Result<Buffer> {
        let buffer = self.gen_buffer().ok_or(GlError::ObjectCreation("buffer"))?;
        self.bind_buffer(target, Some(buffer));
        self.buffer_data(target, as_byte_slice(data), usage);
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{GlCall, ObjectKind, RecordingContext};

    #[test]
    fn texture_uploads_then_filters_then_wraps() {
        let ctx = RecordingContext::new();
        let options = TextureOptions::new(TextureFormat::Rgba16f)
            .with_filter(TextureFilter::Linear)
            .with_wrap(TextureWrap::ClampToEdge);
        let texture = ctx.create_texture(64, 32, &options).unwrap();

        assert_eq!(
            ctx.calls(),
            vec![
                GlCall::GenTexture(texture),
                GlCall::BindTexture(Some(texture)),
                GlCall::TexImage2D {
                    internal_format: gl::RGBA16F as i32,
                    width: 64,
                    height: 32,
                    format: gl::RGBA,
                    ty: gl::FLOAT,
                    data_len: None,
                },
                GlCall::TexParameter { parameter: gl::TEXTURE_MAG_FILTER, value: gl::LINEAR as i32 },
                GlCall::TexParameter { parameter: gl::TEXTURE_MIN_FILTER, value: gl::LINEAR as i32 },
                GlCall::TexParameter { parameter: gl::TEXTURE_WRAP_S, value: gl::CLAMP_TO_EDGE as i32 },
                GlCall::TexParameter { parameter: gl::TEXTURE_WRAP_T, value: gl::CLAMP_TO_EDGE as i32 },
            ]
        );
    }

    #[test]
    fn float_data_is_uploaded_as_bytes() {
        let ctx = RecordingContext::new();
        let texels = [0.5f32; 4 * 4];
        let options = TextureOptions::new(TextureFormat::R32f).with_data(TexelData::Floats(&texels));
        ctx.create_texture(4, 4, &options).unwrap();

        assert!(ctx.calls().iter().any(|c| matches!(
            c,
            GlCall::TexImage2D { data_len: Some(64), format, .. } if *format == gl::RED
        )));
    }

    #[test]
    fn bad_keys_and_data_fail_before_allocation() {
        let ctx = RecordingContext::new();
        assert!(matches!(
            ctx.create_texture_from_keys(8, 8, "RGBA8", None, None),
            Err(GlError::UnsupportedFormat { kind: "texture format", .. })
        ));
        let short = [0u8; 3];
        let options = TextureOptions::new(TextureFormat::Rgba).with_data(TexelData::Bytes(&short));
        assert!(ctx.create_texture(1, 1, &options).is_err());
        assert!(ctx.calls().is_empty());
    }

    #[test]
    fn picking_target_attaches_colour_and_depth() {
        let ctx = RecordingContext::new();
        let target = ctx.create_picking_target(320, 240).unwrap();
        let calls = ctx.calls();

        assert!(calls.contains(&GlCall::TexParameter {
            parameter: gl::TEXTURE_MIN_FILTER,
            value: gl::LINEAR as i32,
        }));
        assert!(calls.contains(&GlCall::RenderbufferStorage {
            internal_format: gl::DEPTH_COMPONENT16,
            width: 320,
            height: 240,
        }));
        assert!(calls.contains(&GlCall::FramebufferTexture2D {
            attachment: gl::COLOR_ATTACHMENT0,
            texture: Some(target.texture),
            level: 0,
        }));
        assert!(calls.contains(&GlCall::FramebufferRenderbuffer {
            attachment: gl::DEPTH_ATTACHMENT,
            renderbuffer: Some(target.depth),
        }));
        assert_eq!(ctx.bound_framebuffer(), None);

        ctx.take_calls();
        target.resize(&ctx, 640, 480);
        assert!(ctx.calls().contains(&GlCall::TexImage2D {
            internal_format: gl::RGBA8 as i32,
            width: 640,
            height: 480,
            format: gl::RGBA,
            ty: gl::UNSIGNED_BYTE,
            data_len: None,
        }));

        target.destroy(&ctx);
        assert_eq!(ctx.live_objects(), 0);
    }

    #[test]
    fn failed_picking_target_releases_partial_objects() {
        let ctx = RecordingContext::new().with_object_limit(ObjectKind::Renderbuffer, 0);
        assert!(matches!(
            ctx.create_picking_target(8, 8),
            Err(GlError::ObjectCreation("renderbuffer"))
        ));
        assert_eq!(ctx.live_objects(), 0);

        let ctx = RecordingContext::new().with_object_limit(ObjectKind::Framebuffer, 0);
        assert!(matches!(
            ctx.create_picking_target(8, 8),
            Err(GlError::ObjectCreation("framebuffer"))
        ));
        assert_eq!(ctx.live_objects(), 0);
    }

    #[test]
    fn stream_buffers_use_stream_usage() {
        let ctx = RecordingContext::new();
        let buffer = ctx.create_stream_buffer(&[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(ctx.bound_buffer(BufferTarget::Array), Some(buffer));
        assert!(ctx.calls().contains(&GlCall::BufferData {
            target: BufferTarget::Array,
            len: 12,
            usage: BufferUsage::Stream,
        }));
    }

    #[test]
    fn pixel_reader_sizes_rgba_reads() {
        let ctx = RecordingContext::new();
        let reader = PixelReader::new(&ctx);
        assert_eq!(reader.bytes_per_pixel(), 4);
        assert_eq!(reader.read(&ctx, 0, 0, 2, 3).len(), 24);

        let ctx = RecordingContext::new().with_parameter(gl::IMPLEMENTATION_COLOR_READ_FORMAT, gl::RGB as i32);
        assert_eq!(PixelReader::new(&ctx).read(&ctx, 0, 0, 2, 3).len(), 18);
    }
}
