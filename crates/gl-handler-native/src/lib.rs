//! Native OpenGL backend for `gl-handler`.
//!
//! [`NativeGl`] implements [`gl_handler::GlContext`] with direct calls into
//! the `gl` crate. It never creates a context: a windowing layer or plugin
//! host must make one current first.
//!
//! ```no_run
//! use gl_handler::{state, ResourceFactory, TextureFormat, TextureOptions};
//! use gl_handler_native::NativeGl;
//!
//! # fn main() -> anyhow::Result<()> {
//! let gl = unsafe { NativeGl::current()? };
//! let texture = gl.create_texture(256, 256, &TextureOptions::new(TextureFormat::Rgba))?;
//! let framebuffer = gl.create_framebuffer(texture)?;
//! gl.check_errors("render target setup")?;
//! state::reset_bindings(&gl);
//! # let _ = framebuffer;
//! # Ok(())
//! # }
//! ```
//!
//! ### Warning
//!
//! Every call assumes the context current when [`NativeGl::current`] ran is
//! still current on the calling thread.

mod gl_backend;

pub use gl_backend::NativeGl;
