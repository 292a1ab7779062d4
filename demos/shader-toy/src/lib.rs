//! Effects built on `gl-handler`'s public API.
//!
//! Each effect owns its programs, geometry and render targets, takes the
//! context per call and reports failures through `anyhow`. None of them
//! creates a window: hand them any [`GlContext`], for example
//! `gl_handler_native::NativeGl` inside a host that already made a context
//! current.
//!
//! - [`ShaderToy`]: a fragment shader over the whole viewport.
//! - [`Feedback`]: ping-pong simulation between two float textures.
//! - [`RenderToTexture`]: offscreen colour pass shown on a spinning quad.
//!
//! [`GlContext`]: gl_handler::GlContext

pub mod feedback;
pub mod render_to_texture;
pub mod shader_toy;

pub use feedback::Feedback;
pub use render_to_texture::RenderToTexture;
pub use shader_toy::ShaderToy;

use gl_handler::{init_logging, LoggingConfig};

/// Install the log subscriber from the environment. Safe to call repeatedly.
pub fn init() {
    init_logging(&LoggingConfig::from_env());
}
