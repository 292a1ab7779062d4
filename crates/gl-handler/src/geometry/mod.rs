//! Vertex data, layouts and draw-ready vertex arrays.

mod buffer;
mod layout;
mod mesh;

pub use buffer::{GeometryBuffer, LinkState};
pub use layout::{AttributeLayout, BufferLayout, ComponentType};
pub use mesh::MeshData;

/// Attribute names shaders are expected to declare.
pub const I_POSITION: &str = "i_Position";
pub const I_NORMAL: &str = "i_Normal";
pub const I_TEX_COORD: &str = "i_TexCoord";
pub const I_COLOR: &str = "i_Color";
