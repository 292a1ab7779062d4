//! Active attribute reflection.

use std::collections::HashMap;

use tracing::debug;

use crate::context::{GlContext, Program};
use crate::error::Result;
use crate::types::{self, GlType};

/// One active vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeInfo {
    pub location: i32,
    pub gl_type: GlType,
}

/// Active attributes of a linked program, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    attributes: HashMap<String, AttributeInfo>,
}

impl AttributeTable {
    /// Reflect the active attributes of `program`.
    ///
    /// Built-ins (`gl_VertexID`, `gl_InstanceID`) report a negative location
    /// and are left out.
    pub fn reflect(ctx: &dyn GlContext, program: Program) -> Result<Self> {
        let mut attributes = HashMap::new();
        for index in 0..ctx.active_attribute_count(program) {
            let Some(active) = ctx.active_attribute(program, index) else {
                continue;
            };
            let location = ctx.attrib_location(program, &active.name);
            if location < 0 {
                continue;
            }
            let gl_type = types::lookup(active.type_id)?.gl_type;
            attributes.insert(active.name, AttributeInfo { location, gl_type });
        }
        debug!(program = program.raw(), attributes = attributes.len(), "reflected program attributes");
        Ok(Self { attributes })
    }

    /// Location of `name`, or -1 when the program does not use it.
    pub fn location(&self, name: &str) -> i32 {
        self.attributes.get(name).map_or(-1, |a| a.location)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.get(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
