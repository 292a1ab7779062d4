#![allow(clippy::too_many_arguments)]

//! Convenience layer over an OpenGL 3.3 / ES 3.0 context.
//!
//! Every component works through a borrowed [`GlContext`]; the crate never
//! creates a context itself.
//!
//! # Overview
//!
//! - [`types`] maps GL type enums to descriptors with shape-typed setters.
//! - [`BindingTable`] reflects a linked program's uniforms and applies a
//!   [`UniformValues`] snapshot every frame, binding samplers to the texture
//!   units reserved for them.
//! - [`ResourceFactory`] creates textures, framebuffers and data buffers.
//! - [`GeometryBuffer`] uploads vertex data and assembles vertex arrays from
//!   [`BufferLayout`]s.
//! - [`ShaderSources`], [`AttributeTable`] and [`UniformBlock`] cover
//!   program construction, attribute lookup and uniform buffers.
//! - [`Camera`], [`ModelTransform`] and [`DrawPass`] serve the render loop.
//!
//! Enable the `mock` feature for [`mock::RecordingContext`], a scripted
//! context that records every call.

pub mod attributes;
pub mod bytes;
pub mod camera;
pub mod config;
pub mod context;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod logging;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod resources;
pub mod shader;
pub mod state;
pub mod transform;
pub mod types;
pub mod uniform_block;
pub mod uniforms;

// Re-export primary types at crate root for convenience.
pub use attributes::AttributeTable;
pub use bytes::AsBytes;
pub use camera::Camera;
pub use config::{CameraConfig, LoggingConfig, ProjectionConfig};
pub use context::{BufferTarget, BufferUsage, DrawMode, GlContext, Program, Texture};
pub use error::{GlError, Result};
pub use frame::DrawPass;
pub use geometry::{AttributeLayout, BufferLayout, ComponentType, GeometryBuffer, LinkState, MeshData};
pub use logging::init_logging;
pub use resources::{ResourceFactory, TextureFilter, TextureFormat, TextureOptions, TextureWrap};
pub use shader::ShaderSources;
pub use transform::{ModelTransform, Rotation, Spin};
pub use types::{GlType, TypeDescriptor, UniformSetter};
pub use uniform_block::UniformBlock;
pub use uniforms::{BindingTable, UniformBinding, UniformValue, UniformValues};
