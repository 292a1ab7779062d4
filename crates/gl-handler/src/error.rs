//! Error taxonomy for program construction, reflection and resource creation.

use thiserror::Error;

use crate::context::ShaderStage;

/// Errors raised by the convenience layer.
///
/// Every variant is fatal to the object being built. There is no transient
/// class: GPU object creation is deterministic for identical inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GlError {
    #[error("failed to compile {stage} shader: {log}")]
    CompileFailure { stage: ShaderStage, log: String },

    #[error("failed to link shader program: {log}")]
    LinkFailure { log: String },

    #[error("no type descriptor for GL type {}{}", fmt_type_id(.id), fmt_type_name(.name))]
    UnknownType { id: u32, name: Option<&'static str> },

    #[error("unsupported {kind} key {key:?}")]
    UnsupportedFormat { kind: &'static str, key: String },

    #[error("texel data for {format} texture holds {actual} elements, expected {expected}")]
    TexelDataMismatch {
        format: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid buffer layout: {0}")]
    InvalidLayout(String),

    #[error("context returned no {0} object")]
    ObjectCreation(&'static str),

    #[error("program needs {requested} texture units but only {available} are available")]
    TextureUnitsExhausted { requested: usize, available: usize },

    #[error("uniform block {0:?} is not active in the program")]
    MissingUniformBlock(String),

    #[error("uniform block {block:?} has no active member {member:?}")]
    MissingBlockMember { block: String, member: String },

    #[error("geometry state: {0}")]
    GeometryState(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GlError>;

fn fmt_type_id(id: &u32) -> String {
    format!("{id:#06x}")
}

fn fmt_type_name(name: &Option<&'static str>) -> String {
    name.map(|n| format!(" ({n})")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_message_names_known_unsupported_types() {
        let err = GlError::UnknownType {
            id: 0x8b60,
            name: Some("SAMPLER_CUBE"),
        };
        assert_eq!(
            err.to_string(),
            "no type descriptor for GL type 0x8b60 (SAMPLER_CUBE)"
        );

        let err = GlError::UnknownType { id: 0x1234, name: None };
        assert_eq!(err.to_string(), "no type descriptor for GL type 0x1234");
    }
}
