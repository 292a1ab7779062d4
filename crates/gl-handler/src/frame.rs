//! One draw, sequenced.
//!
//! A [`DrawPass`] issues the calls for a single draw in a fixed order: bind
//! the target framebuffer, set the viewport, use the program, bind the
//! vertex array, apply uniforms, draw, unbind the vertex array.

use tracing::trace;

use crate::context::{DrawMode, Framebuffer, GlContext};
use crate::error::Result;
use crate::geometry::GeometryBuffer;
use crate::uniforms::{BindingTable, UniformValues};

/// Where a pass renders and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPass {
    /// `None` renders to the default framebuffer.
    pub target: Option<Framebuffer>,
    /// `(x, y, width, height)`.
    pub viewport: (i32, i32, i32, i32),
    pub mode: DrawMode,
    /// Draw this many instances when set.
    pub instances: Option<i32>,
}

impl DrawPass {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            target: None,
            viewport: (0, 0, width, height),
            mode: DrawMode::Triangles,
            instances: None,
        }
    }

    pub fn to_framebuffer(mut self, framebuffer: Framebuffer) -> Self {
        self.target = Some(framebuffer);
        self
    }

    pub fn with_mode(mut self, mode: DrawMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn instanced(mut self, instances: i32) -> Self {
        self.instances = Some(instances);
        self
    }

    /// Run the pass. Leaves the program current and the target framebuffer
    /// bound.
    pub fn run(
        &self,
        ctx: &dyn GlContext,
        bindings: &BindingTable,
        geometry: &GeometryBuffer,
        values: &UniformValues,
    ) -> Result<()> {
        ctx.bind_framebuffer(self.target);
        let (x, y, width, height) = self.viewport;
        ctx.viewport(x, y, width, height);
        ctx.use_program(Some(bindings.program()));

        geometry.bind(ctx)?;
        let written = bindings.apply(ctx, values);
        trace!(written, offered = values.len(), "applied uniforms");
        match self.instances {
            Some(instances) => geometry.issue_draw_instanced(ctx, self.mode, instances),
            None => geometry.issue_draw(ctx, self.mode),
        }
        geometry.unbind(ctx);
        Ok(())
    }
}
