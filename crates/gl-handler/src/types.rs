//! Type registry: GL type enumerations mapped to descriptors and setters.
//!
//! Program reflection reports each active uniform's type as a raw GL enum.
//! [`lookup`] turns that id into a [`TypeDescriptor`]; ids outside the closed
//! [`GlType`] set fail with [`GlError::UnknownType`].
//!
//! The setter a descriptor produces is a [`UniformSetter`] whose variants
//! carry function pointers typed by value shape, so a `vec4` setter can only
//! be called with `&[f32; 4]`:
//!
//! ```rust,compile_fail
//! use gl_handler::context::{GlContext, UniformLocation};
//! use gl_handler::types::{lookup, UniformSetter};
//!
//! fn write(ctx: &dyn GlContext) {
//!     if let UniformSetter::FloatVec4(set) = lookup(0x8b52).unwrap().setter() {
//!         set(ctx, UniformLocation(0), &[1.0, 2.0, 3.0]);
//!     }
//! }
//! ```

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};

use crate::context::{GlContext, GlEnum, Texture, UniformLocation};
use crate::error::{GlError, Result};

/// GL data types with a registered uniform setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum GlType {
    Float = 0x1406,
    FloatVec2 = 0x8b50,
    FloatVec3 = 0x8b51,
    FloatVec4 = 0x8b52,
    Int = 0x1404,
    IntVec2 = 0x8b53,
    IntVec3 = 0x8b54,
    IntVec4 = 0x8b55,
    Bool = 0x8b56,
    BoolVec2 = 0x8b57,
    BoolVec3 = 0x8b58,
    BoolVec4 = 0x8b59,
    FloatMat2 = 0x8b5a,
    FloatMat3 = 0x8b5b,
    FloatMat4 = 0x8b5c,
    FloatMat2x3 = 0x8b65,
    FloatMat2x4 = 0x8b66,
    FloatMat3x2 = 0x8b67,
    FloatMat3x4 = 0x8b68,
    FloatMat4x2 = 0x8b69,
    FloatMat4x3 = 0x8b6a,
    Sampler2d = 0x8b5e,
}

impl GlType {
    /// Every registered type, in registry order.
    pub const ALL: [GlType; 22] = [
        GlType::Float,
        GlType::FloatVec2,
        GlType::FloatVec3,
        GlType::FloatVec4,
        GlType::Int,
        GlType::IntVec2,
        GlType::IntVec3,
        GlType::IntVec4,
        GlType::Bool,
        GlType::BoolVec2,
        GlType::BoolVec3,
        GlType::BoolVec4,
        GlType::FloatMat2,
        GlType::FloatMat3,
        GlType::FloatMat4,
        GlType::FloatMat2x3,
        GlType::FloatMat2x4,
        GlType::FloatMat3x2,
        GlType::FloatMat3x4,
        GlType::FloatMat4x2,
        GlType::FloatMat4x3,
        GlType::Sampler2d,
    ];

    /// Decode a raw GL type enum.
    pub fn from_gl(id: GlEnum) -> Option<Self> {
        Self::from_u32(id)
    }

    /// The raw GL type enum.
    pub fn gl(self) -> GlEnum {
        // Every discriminant is a u32 literal.
        self.to_u32().unwrap_or_default()
    }

    /// Symbolic tag, spelled like the GL constant.
    pub fn symbolic_name(self) -> &'static str {
        match self {
            GlType::Float => "FLOAT",
            GlType::FloatVec2 => "FLOAT_VEC2",
            GlType::FloatVec3 => "FLOAT_VEC3",
            GlType::FloatVec4 => "FLOAT_VEC4",
            GlType::Int => "INT",
            GlType::IntVec2 => "INT_VEC2",
            GlType::IntVec3 => "INT_VEC3",
            GlType::IntVec4 => "INT_VEC4",
            GlType::Bool => "BOOL",
            GlType::BoolVec2 => "BOOL_VEC2",
            GlType::BoolVec3 => "BOOL_VEC3",
            GlType::BoolVec4 => "BOOL_VEC4",
            GlType::FloatMat2 => "FLOAT_MAT2",
            GlType::FloatMat3 => "FLOAT_MAT3",
            GlType::FloatMat4 => "FLOAT_MAT4",
            GlType::FloatMat2x3 => "FLOAT_MAT2x3",
            GlType::FloatMat2x4 => "FLOAT_MAT2x4",
            GlType::FloatMat3x2 => "FLOAT_MAT3x2",
            GlType::FloatMat3x4 => "FLOAT_MAT3x4",
            GlType::FloatMat4x2 => "FLOAT_MAT4x2",
            GlType::FloatMat4x3 => "FLOAT_MAT4x3",
            GlType::Sampler2d => "SAMPLER_2D",
        }
    }

    /// Number of scalar components a value of this type occupies.
    pub fn components(self) -> usize {
        match self {
            GlType::Float | GlType::Int | GlType::Bool | GlType::Sampler2d => 1,
            GlType::FloatVec2 | GlType::IntVec2 | GlType::BoolVec2 => 2,
            GlType::FloatVec3 | GlType::IntVec3 | GlType::BoolVec3 => 3,
            GlType::FloatVec4 | GlType::IntVec4 | GlType::BoolVec4 | GlType::FloatMat2 => 4,
            GlType::FloatMat2x3 | GlType::FloatMat3x2 => 6,
            GlType::FloatMat2x4 | GlType::FloatMat4x2 => 8,
            GlType::FloatMat3 => 9,
            GlType::FloatMat3x4 | GlType::FloatMat4x3 => 12,
            GlType::FloatMat4 => 16,
        }
    }

    pub fn is_sampler(self) -> bool {
        matches!(self, GlType::Sampler2d)
    }

    /// Descriptor for this type.
    pub fn descriptor(self) -> TypeDescriptor {
        TypeDescriptor { gl_type: self }
    }
}

/// Index of a texture unit (`TEXTURE0 + unit`).
pub type TextureUnit = u32;

/// Shape-typed uniform writer produced by a [`TypeDescriptor`].
///
/// Each variant's function pointer accepts exactly the value shape implied by
/// the GL type. Samplers receive the texture unit assigned at reflection time
/// together with the texture to bind.
#[derive(Clone, Copy)]
pub enum UniformSetter {
    Float(fn(&dyn GlContext, UniformLocation, f32)),
    FloatVec2(fn(&dyn GlContext, UniformLocation, &[f32; 2])),
    FloatVec3(fn(&dyn GlContext, UniformLocation, &[f32; 3])),
    FloatVec4(fn(&dyn GlContext, UniformLocation, &[f32; 4])),
    Int(fn(&dyn GlContext, UniformLocation, i32)),
    IntVec2(fn(&dyn GlContext, UniformLocation, &[i32; 2])),
    IntVec3(fn(&dyn GlContext, UniformLocation, &[i32; 3])),
    IntVec4(fn(&dyn GlContext, UniformLocation, &[i32; 4])),
    Bool(fn(&dyn GlContext, UniformLocation, bool)),
    BoolVec2(fn(&dyn GlContext, UniformLocation, &[bool; 2])),
    BoolVec3(fn(&dyn GlContext, UniformLocation, &[bool; 3])),
    BoolVec4(fn(&dyn GlContext, UniformLocation, &[bool; 4])),
    Mat2(fn(&dyn GlContext, UniformLocation, &[f32; 4])),
    Mat3(fn(&dyn GlContext, UniformLocation, &[f32; 9])),
    Mat4(fn(&dyn GlContext, UniformLocation, &[f32; 16])),
    Mat2x3(fn(&dyn GlContext, UniformLocation, &[f32; 6])),
    Mat2x4(fn(&dyn GlContext, UniformLocation, &[f32; 8])),
    Mat3x2(fn(&dyn GlContext, UniformLocation, &[f32; 6])),
    Mat3x4(fn(&dyn GlContext, UniformLocation, &[f32; 12])),
    Mat4x2(fn(&dyn GlContext, UniformLocation, &[f32; 8])),
    Mat4x3(fn(&dyn GlContext, UniformLocation, &[f32; 12])),
    Sampler2d(fn(&dyn GlContext, UniformLocation, TextureUnit, Texture)),
}

impl std::fmt::Debug for UniformSetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("UniformSetter").field(&self.gl_type()).finish()
    }
}

impl UniformSetter {
    /// The GL type this setter writes.
    pub fn gl_type(&self) -> GlType {
        match self {
            UniformSetter::Float(_) => GlType::Float,
            UniformSetter::FloatVec2(_) => GlType::FloatVec2,
            UniformSetter::FloatVec3(_) => GlType::FloatVec3,
            UniformSetter::FloatVec4(_) => GlType::FloatVec4,
            UniformSetter::Int(_) => GlType::Int,
            UniformSetter::IntVec2(_) => GlType::IntVec2,
            UniformSetter::IntVec3(_) => GlType::IntVec3,
            UniformSetter::IntVec4(_) => GlType::IntVec4,
            UniformSetter::Bool(_) => GlType::Bool,
            UniformSetter::BoolVec2(_) => GlType::BoolVec2,
            UniformSetter::BoolVec3(_) => GlType::BoolVec3,
            UniformSetter::BoolVec4(_) => GlType::BoolVec4,
            UniformSetter::Mat2(_) => GlType::FloatMat2,
            UniformSetter::Mat3(_) => GlType::FloatMat3,
            UniformSetter::Mat4(_) => GlType::FloatMat4,
            UniformSetter::Mat2x3(_) => GlType::FloatMat2x3,
            UniformSetter::Mat2x4(_) => GlType::FloatMat2x4,
            UniformSetter::Mat3x2(_) => GlType::FloatMat3x2,
            UniformSetter::Mat3x4(_) => GlType::FloatMat3x4,
            UniformSetter::Mat4x2(_) => GlType::FloatMat4x2,
            UniformSetter::Mat4x3(_) => GlType::FloatMat4x3,
            UniformSetter::Sampler2d(_) => GlType::Sampler2d,
        }
    }
}

fn bools<const N: usize>(v: &[bool; N]) -> [i32; N] {
    v.map(i32::from)
}

/// Writes the unit index (not the texture name) to the sampler uniform after
/// binding `texture` to that unit. Leaves `unit` active.
fn bind_sampler(ctx: &dyn GlContext, location: UniformLocation, unit: TextureUnit, texture: Texture) {
    ctx.active_texture(unit);
    ctx.bind_texture(Some(texture));
    ctx.uniform_1_i32(location, unit as i32);
}

/// Immutable description of one registered GL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub gl_type: GlType,
}

impl TypeDescriptor {
    pub fn symbolic_name(&self) -> &'static str {
        self.gl_type.symbolic_name()
    }

    /// Build the shape-typed setter for this type.
    pub fn setter(&self) -> UniformSetter {
        match self.gl_type {
            GlType::Float => UniformSetter::Float(|ctx, loc, v| ctx.uniform_1_f32(loc, v)),
            GlType::FloatVec2 => UniformSetter::FloatVec2(|ctx, loc, v| ctx.uniform_2_f32(loc, v)),
            GlType::FloatVec3 => UniformSetter::FloatVec3(|ctx, loc, v| ctx.uniform_3_f32(loc, v)),
            GlType::FloatVec4 => UniformSetter::FloatVec4(|ctx, loc, v| ctx.uniform_4_f32(loc, v)),
            GlType::Int => UniformSetter::Int(|ctx, loc, v| ctx.uniform_1_i32(loc, v)),
            GlType::IntVec2 => UniformSetter::IntVec2(|ctx, loc, v| ctx.uniform_2_i32(loc, v)),
            GlType::IntVec3 => UniformSetter::IntVec3(|ctx, loc, v| ctx.uniform_3_i32(loc, v)),
            GlType::IntVec4 => UniformSetter::IntVec4(|ctx, loc, v| ctx.uniform_4_i32(loc, v)),
            GlType::Bool => UniformSetter::Bool(|ctx, loc, v| ctx.uniform_1_i32(loc, i32::from(v))),
            GlType::BoolVec2 => {
                UniformSetter::BoolVec2(|ctx, loc, v| ctx.uniform_2_i32(loc, &bools(v)))
            }
            GlType::BoolVec3 => {
                UniformSetter::BoolVec3(|ctx, loc, v| ctx.uniform_3_i32(loc, &bools(v)))
            }
            GlType::BoolVec4 => {
                UniformSetter::BoolVec4(|ctx, loc, v| ctx.uniform_4_i32(loc, &bools(v)))
            }
            GlType::FloatMat2 => UniformSetter::Mat2(|ctx, loc, m| ctx.uniform_matrix_2_f32(loc, m)),
            GlType::FloatMat3 => UniformSetter::Mat3(|ctx, loc, m| ctx.uniform_matrix_3_f32(loc, m)),
            GlType::FloatMat4 => UniformSetter::Mat4(|ctx, loc, m| ctx.uniform_matrix_4_f32(loc, m)),
            GlType::FloatMat2x3 => {
                UniformSetter::Mat2x3(|ctx, loc, m| ctx.uniform_matrix_2x3_f32(loc, m))
            }
            GlType::FloatMat2x4 => {
                UniformSetter::Mat2x4(|ctx, loc, m| ctx.uniform_matrix_2x4_f32(loc, m))
            }
            GlType::FloatMat3x2 => {
                UniformSetter::Mat3x2(|ctx, loc, m| ctx.uniform_matrix_3x2_f32(loc, m))
            }
            GlType::FloatMat3x4 => {
                UniformSetter::Mat3x4(|ctx, loc, m| ctx.uniform_matrix_3x4_f32(loc, m))
            }
            GlType::FloatMat4x2 => {
                UniformSetter::Mat4x2(|ctx, loc, m| ctx.uniform_matrix_4x2_f32(loc, m))
            }
            GlType::FloatMat4x3 => {
                UniformSetter::Mat4x3(|ctx, loc, m| ctx.uniform_matrix_4x3_f32(loc, m))
            }
            GlType::Sampler2d => UniformSetter::Sampler2d(bind_sampler),
        }
    }
}

/// GL types that reflection can report but that have no setter yet.
/// Only used to make [`GlError::UnknownType`] readable.
fn unsupported_type_name(id: GlEnum) -> Option<&'static str> {
    Some(match id {
        0x1405 => "UNSIGNED_INT",
        0x8dc6 => "UNSIGNED_INT_VEC2",
        0x8dc7 => "UNSIGNED_INT_VEC3",
        0x8dc8 => "UNSIGNED_INT_VEC4",
        0x8b60 => "SAMPLER_CUBE",
        0x8b5f => "SAMPLER_3D",
        0x8b62 => "SAMPLER_2D_SHADOW",
        0x8dc1 => "SAMPLER_2D_ARRAY",
        0x8dc4 => "SAMPLER_2D_ARRAY_SHADOW",
        0x8dc5 => "SAMPLER_CUBE_SHADOW",
        0x8dca => "INT_SAMPLER_2D",
        0x8dcb => "INT_SAMPLER_3D",
        0x8dcc => "INT_SAMPLER_CUBE",
        0x8dcf => "INT_SAMPLER_2D_ARRAY",
        0x8dd2 => "UNSIGNED_INT_SAMPLER_2D",
        0x8dd3 => "UNSIGNED_INT_SAMPLER_3D",
        0x8dd4 => "UNSIGNED_INT_SAMPLER_CUBE",
        0x8dd7 => "UNSIGNED_INT_SAMPLER_2D_ARRAY",
        _ => return None,
    })
}

/// Look up the descriptor registered for a raw GL type id.
pub fn lookup(type_id: GlEnum) -> Result<TypeDescriptor> {
    GlType::from_gl(type_id)
        .map(GlType::descriptor)
        .ok_or(GlError::UnknownType {
            id: type_id,
            name: unsupported_type_name(type_id),
        })
}
