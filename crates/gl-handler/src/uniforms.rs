//! Uniform reflection and per-frame dispatch.
//!
//! [`BindingTable::reflect`] enumerates a linked program's active uniforms
//! once and builds a name-keyed table of [`UniformBinding`]s, assigning
//! texture units to 2D samplers densely from 0 in encounter order.
//! [`BindingTable::apply`] then writes a snapshot of [`UniformValues`] every
//! frame. Names the program does not use are skipped without error.

use std::collections::{btree_map, BTreeMap, HashMap};

use tracing::{debug, trace, warn};

use crate::context::{GlContext, Program, Texture, UniformLocation};
use crate::error::{GlError, Result};
use crate::types::{self, GlType, TextureUnit, TypeDescriptor, UniformSetter};

// ----------------------------------------------------------------------------
// Values
// ----------------------------------------------------------------------------

/// A value for one uniform, shaped like the GL type it targets.
///
/// Matrices are column-major, `MatCxR` holding `C` columns of `R` rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    IVec2([i32; 2]),
    IVec3([i32; 3]),
    IVec4([i32; 4]),
    Bool(bool),
    BVec2([bool; 2]),
    BVec3([bool; 3]),
    BVec4([bool; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
    Mat2x3([f32; 6]),
    Mat2x4([f32; 8]),
    Mat3x2([f32; 6]),
    Mat3x4([f32; 12]),
    Mat4x2([f32; 8]),
    Mat4x3([f32; 12]),
    Texture(Texture),
}

impl UniformValue {
    /// Short shape name for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Int(_) => "int",
            UniformValue::IVec2(_) => "ivec2",
            UniformValue::IVec3(_) => "ivec3",
            UniformValue::IVec4(_) => "ivec4",
            UniformValue::Bool(_) => "bool",
            UniformValue::BVec2(_) => "bvec2",
            UniformValue::BVec3(_) => "bvec3",
            UniformValue::BVec4(_) => "bvec4",
            UniformValue::Mat2(_) => "mat2",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
            UniformValue::Mat2x3(_) => "mat2x3",
            UniformValue::Mat2x4(_) => "mat2x4",
            UniformValue::Mat3x2(_) => "mat3x2",
            UniformValue::Mat3x4(_) => "mat3x4",
            UniformValue::Mat4x2(_) => "mat4x2",
            UniformValue::Mat4x3(_) => "mat4x3",
            UniformValue::Texture(_) => "texture",
        }
    }
}

macro_rules! uniform_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )*
    };
}

uniform_value_from!(
    f32 => Float,
    [f32; 2] => Vec2,
    [f32; 3] => Vec3,
    [f32; 4] => Vec4,
    i32 => Int,
    [i32; 2] => IVec2,
    [i32; 3] => IVec3,
    [i32; 4] => IVec4,
    bool => Bool,
    [bool; 2] => BVec2,
    [bool; 3] => BVec3,
    [bool; 4] => BVec4,
    [f32; 9] => Mat3,
    [f32; 16] => Mat4,
    Texture => Texture,
);

impl From<glam::Vec2> for UniformValue {
    fn from(v: glam::Vec2) -> Self {
        UniformValue::Vec2(v.to_array())
    }
}

impl From<glam::Vec3> for UniformValue {
    fn from(v: glam::Vec3) -> Self {
        UniformValue::Vec3(v.to_array())
    }
}

impl From<glam::Vec4> for UniformValue {
    fn from(v: glam::Vec4) -> Self {
        UniformValue::Vec4(v.to_array())
    }
}

impl From<glam::Mat2> for UniformValue {
    fn from(m: glam::Mat2) -> Self {
        UniformValue::Mat2(m.to_cols_array())
    }
}

impl From<glam::Mat3> for UniformValue {
    fn from(m: glam::Mat3) -> Self {
        UniformValue::Mat3(m.to_cols_array())
    }
}

impl From<glam::Mat4> for UniformValue {
    fn from(m: glam::Mat4) -> Self {
        UniformValue::Mat4(m.to_cols_array())
    }
}

/// A named snapshot of uniform values, applied in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformValues {
    values: BTreeMap<String, UniformValue>,
}

impl UniformValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<UniformValue> {
        self.values.remove(name)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, UniformValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<UniformValue>> Extend<(K, V)> for UniformValues {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.set(name, value);
        }
    }
}

impl<K: Into<String>, V: Into<UniformValue>> FromIterator<(K, V)> for UniformValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        values.extend(iter);
        values
    }
}

impl<'a> IntoIterator for &'a UniformValues {
    type Item = (&'a String, &'a UniformValue);
    type IntoIter = btree_map::Iter<'a, String, UniformValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ----------------------------------------------------------------------------
// Bindings
// ----------------------------------------------------------------------------

/// One reflected uniform: where it lives and how to write it.
#[derive(Debug, Clone, Copy)]
pub struct UniformBinding {
    pub location: UniformLocation,
    pub descriptor: TypeDescriptor,
    setter: UniformSetter,
    /// Texture unit reserved for this uniform, samplers only.
    pub texture_unit: Option<TextureUnit>,
}

impl UniformBinding {
    fn new(location: UniformLocation, descriptor: TypeDescriptor, texture_unit: Option<TextureUnit>) -> Self {
        Self {
            location,
            descriptor,
            setter: descriptor.setter(),
            texture_unit,
        }
    }

    pub fn gl_type(&self) -> GlType {
        self.descriptor.gl_type
    }

    pub fn symbolic_name(&self) -> &'static str {
        self.descriptor.symbolic_name()
    }

    /// Write `value` to this uniform in the current program.
    ///
    /// Returns `false` without touching the context when the value's shape
    /// does not match the uniform's type.
    pub fn apply(&self, ctx: &dyn GlContext, value: &UniformValue) -> bool {
        use UniformSetter as S;
        use UniformValue as V;

        let loc = self.location;
        match (self.setter, value) {
            (S::Float(set), V::Float(v)) => set(ctx, loc, *v),
            (S::FloatVec2(set), V::Vec2(v)) => set(ctx, loc, v),
            (S::FloatVec3(set), V::Vec3(v)) => set(ctx, loc, v),
            (S::FloatVec4(set), V::Vec4(v)) => set(ctx, loc, v),
            (S::Int(set), V::Int(v)) => set(ctx, loc, *v),
            (S::IntVec2(set), V::IVec2(v)) => set(ctx, loc, v),
            (S::IntVec3(set), V::IVec3(v)) => set(ctx, loc, v),
            (S::IntVec4(set), V::IVec4(v)) => set(ctx, loc, v),
            (S::Bool(set), V::Bool(v)) => set(ctx, loc, *v),
            (S::BoolVec2(set), V::BVec2(v)) => set(ctx, loc, v),
            (S::BoolVec3(set), V::BVec3(v)) => set(ctx, loc, v),
            (S::BoolVec4(set), V::BVec4(v)) => set(ctx, loc, v),
            (S::Mat2(set), V::Mat2(m)) => set(ctx, loc, m),
            (S::Mat3(set), V::Mat3(m)) => set(ctx, loc, m),
            (S::Mat4(set), V::Mat4(m)) => set(ctx, loc, m),
            (S::Mat2x3(set), V::Mat2x3(m)) => set(ctx, loc, m),
            (S::Mat2x4(set), V::Mat2x4(m)) => set(ctx, loc, m),
            (S::Mat3x2(set), V::Mat3x2(m)) => set(ctx, loc, m),
            (S::Mat3x4(set), V::Mat3x4(m)) => set(ctx, loc, m),
            (S::Mat4x2(set), V::Mat4x2(m)) => set(ctx, loc, m),
            (S::Mat4x3(set), V::Mat4x3(m)) => set(ctx, loc, m),
            (S::Sampler2d(set), V::Texture(texture)) => match self.texture_unit {
                Some(unit) => set(ctx, loc, unit, *texture),
                None => return false,
            },
            _ => {
                warn!(
                    location = loc.0,
                    expected = self.symbolic_name(),
                    supplied = value.shape(),
                    "uniform value shape does not match its type; skipping"
                );
                return false;
            }
        }
        true
    }
}

/// Strip one trailing `[<digits>]` suffix: `lights[0]` becomes `lights`.
pub fn base_name(name: &str) -> &str {
    let Some(inner) = name.strip_suffix(']') else {
        return name;
    };
    match inner.rfind('[') {
        Some(open)
            if open + 1 < inner.len() && inner[open + 1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            &name[..open]
        }
        _ => name,
    }
}

/// Name-keyed uniform bindings of one linked program.
///
/// Built once by [`reflect`](BindingTable::reflect); texture units are fixed
/// for the table's lifetime, so repeated [`apply`](BindingTable::apply)
/// calls rebind samplers consistently.
#[derive(Debug, Clone)]
pub struct BindingTable {
    program: Program,
    bindings: HashMap<String, UniformBinding>,
    texture_units: Vec<String>,
}

impl BindingTable {
    /// Reflect the active uniforms of a linked program.
    ///
    /// Uniforms without a location (uniform block members) are skipped. A
    /// type with no registered descriptor aborts the whole table.
    pub fn reflect(ctx: &dyn GlContext, program: Program) -> Result<Self> {
        let count = ctx.active_uniform_count(program);
        let mut bindings = HashMap::with_capacity(count as usize);
        let mut texture_units: Vec<String> = Vec::new();
        let mut available_units = None;

        for index in 0..count {
            let Some(active) = ctx.active_uniform(program, index) else {
                continue;
            };
            let name = base_name(&active.name);
            let Some(location) = ctx.uniform_location(program, name) else {
                trace!(uniform = name, "no location, assuming uniform block member");
                continue;
            };
            let descriptor = types::lookup(active.type_id)?;

            let texture_unit = if descriptor.gl_type.is_sampler() {
                let available = *available_units.get_or_insert_with(|| {
                    ctx.get_parameter_i32(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS).max(0) as usize
                });
                if texture_units.len() >= available {
                    return Err(GlError::TextureUnitsExhausted {
                        requested: texture_units.len() + 1,
                        available,
                    });
                }
                texture_units.push(name.to_string());
                Some((texture_units.len() - 1) as TextureUnit)
            } else {
                None
            };

            trace!(
                uniform = name,
                location = location.0,
                ty = descriptor.symbolic_name(),
                unit = ?texture_unit,
                "reflected uniform"
            );
            bindings.insert(
                name.to_string(),
                UniformBinding::new(location, descriptor, texture_unit),
            );
        }

        debug!(
            program = program.raw(),
            uniforms = bindings.len(),
            samplers = texture_units.len(),
            "reflected program uniforms"
        );
        Ok(Self {
            program,
            bindings,
            texture_units,
        })
    }

    /// Write every value whose name has a binding; returns how many were
    /// written.
    ///
    /// The table's program must be current. Sampler writes leave the last
    /// written texture unit active with its texture bound.
    pub fn apply(&self, ctx: &dyn GlContext, values: &UniformValues) -> usize {
        let mut written = 0;
        for (name, value) in values {
            match self.bindings.get(name) {
                Some(binding) => {
                    if binding.apply(ctx, value) {
                        written += 1;
                    }
                }
                None => trace!(uniform = %name, "not active in program, skipping"),
            }
        }
        written
    }

    pub fn program(&self) -> Program {
        self.program
    }

    pub fn get(&self, name: &str) -> Option<&UniformBinding> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Texture unit assigned to a sampler uniform.
    pub fn texture_unit(&self, name: &str) -> Option<TextureUnit> {
        self.bindings.get(name).and_then(|b| b.texture_unit)
    }

    /// Sampler names, indexed by their texture unit.
    pub fn texture_units(&self) -> &[String] {
        &self.texture_units
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
