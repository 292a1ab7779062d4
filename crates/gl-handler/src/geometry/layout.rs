//! Attribute and buffer layout descriptions.
//!
//! A [`BufferLayout`] lists the attributes interleaved in one buffer in
//! declaration order. Byte offsets accumulate over the preceding attributes
//! the program uses; an attribute with a negative location is skipped
//! entirely and takes up no bytes.

use crate::context::{Buffer, GlEnum};
use crate::error::{GlError, Result};

/// Scalar type of one attribute component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    HalfFloat,
    #[default]
    Float,
}

impl ComponentType {
    pub fn size_bytes(self) -> i32 {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort | ComponentType::HalfFloat => 2,
            ComponentType::Int | ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }

    pub fn gl(self) -> GlEnum {
        match self {
            ComponentType::Byte => gl::BYTE,
            ComponentType::UnsignedByte => gl::UNSIGNED_BYTE,
            ComponentType::Short => gl::SHORT,
            ComponentType::UnsignedShort => gl::UNSIGNED_SHORT,
            ComponentType::Int => gl::INT,
            ComponentType::UnsignedInt => gl::UNSIGNED_INT,
            ComponentType::HalfFloat => gl::HALF_FLOAT,
            ComponentType::Float => gl::FLOAT,
        }
    }
}

/// One vertex attribute inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeLayout {
    /// Attribute location in the program; negative when the program does
    /// not use the attribute.
    pub location: i32,
    /// Components per vertex, 1 to 4.
    pub components: i32,
    pub component_type: ComponentType,
    /// Advance once per `divisor` instances instead of once per vertex.
    pub divisor: Option<u32>,
}

impl AttributeLayout {
    /// A float attribute.
    pub fn new(location: i32, components: i32) -> Self {
        Self::typed(location, components, ComponentType::Float)
    }

    pub fn typed(location: i32, components: i32, component_type: ComponentType) -> Self {
        Self {
            location,
            components,
            component_type,
            divisor: None,
        }
    }

    pub fn with_divisor(mut self, divisor: u32) -> Self {
        self.divisor = Some(divisor);
        self
    }

    /// Whether the program uses this attribute.
    pub fn is_present(&self) -> bool {
        self.location >= 0
    }

    /// Bytes one vertex of this attribute occupies.
    pub fn byte_len(&self) -> i32 {
        self.components * self.component_type.size_bytes()
    }
}

/// Attributes sharing one buffer and stride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferLayout {
    pub buffer: Buffer,
    /// Bytes between consecutive vertices; 0 means tightly packed.
    pub stride: i32,
    pub attributes: Vec<AttributeLayout>,
}

impl BufferLayout {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            stride: 0,
            attributes: Vec::new(),
        }
    }

    /// A tightly packed buffer holding a single attribute.
    pub fn single(buffer: Buffer, attribute: AttributeLayout) -> Self {
        Self::new(buffer).attribute(attribute)
    }

    /// An interleaved buffer whose stride is the packed size of the present
    /// `attributes`.
    pub fn interleaved(buffer: Buffer, attributes: impl IntoIterator<Item = AttributeLayout>) -> Self {
        let mut layout = Self::new(buffer);
        layout.attributes.extend(attributes);
        layout.stride = layout.packed_size();
        layout
    }

    pub fn with_stride(mut self, stride: i32) -> Self {
        self.stride = stride;
        self
    }

    pub fn attribute(mut self, attribute: AttributeLayout) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Byte offset of each attribute, in declaration order. Absent
    /// attributes get `None` and do not advance the offset.
    pub fn offsets(&self) -> Vec<Option<i32>> {
        self.attributes
            .iter()
            .scan(0, |offset, attribute| {
                if !attribute.is_present() {
                    return Some(None);
                }
                let current = *offset;
                *offset += attribute.byte_len();
                Some(Some(current))
            })
            .collect()
    }

    /// Sum of the byte lengths of the present attributes.
    pub fn packed_size(&self) -> i32 {
        self.attributes
            .iter()
            .filter(|attribute| attribute.is_present())
            .map(AttributeLayout::byte_len)
            .sum()
    }

    /// Reject component counts outside 1..=4 and attributes reaching past a
    /// non-zero stride. Absent attributes are not checked.
    pub fn validate(&self) -> Result<()> {
        if self.stride < 0 {
            return Err(GlError::InvalidLayout(format!("negative stride {}", self.stride)));
        }
        let present = self
            .attributes
            .iter()
            .zip(self.offsets())
            .filter_map(|(attribute, offset)| Some((attribute, offset?)));
        for (attribute, offset) in present {
            if !(1..=4).contains(&attribute.components) {
                return Err(GlError::InvalidLayout(format!(
                    "attribute at location {} has {} components",
                    attribute.location, attribute.components
                )));
            }
            if self.stride > 0 && offset + attribute.byte_len() > self.stride {
                return Err(GlError::InvalidLayout(format!(
                    "attribute at location {} spans bytes {}..{} past stride {}",
                    attribute.location,
                    offset,
                    offset + attribute.byte_len(),
                    self.stride
                )));
            }
        }
        Ok(())
    }
}
