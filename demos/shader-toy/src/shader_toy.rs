//! Full-screen fragment shader effect.

use anyhow::{Context, Result};
use gl_handler::context::GlContext;
use gl_handler::{
    BindingTable, DrawPass, GeometryBuffer, MeshData, Program, ShaderSources, UniformValues,
};
use tracing::{debug, error};

/// Passes clip-space positions straight through.
pub const VERTEX: &str = "#version 300 es
precision mediump float;

in vec2 i_Position;

void main() {
    gl_Position = vec4(i_Position, 0.0, 1.0);
}";

/// Colours each pixel by its screen position, pulsing over time.
pub const GRADIENT: &str = "#version 300 es
precision mediump float;

uniform vec2 u_resolution;
uniform float u_time;
out vec4 OUTCOLOUR;

void main() {
    vec2 uv = gl_FragCoord.xy / u_resolution;
    OUTCOLOUR = vec4(uv, 0.5 + 0.5 * sin(u_time), 1.0);
}";

/// A fragment shader drawn over two screen-covering triangles.
///
/// Supplies `u_resolution` (pixels) and `u_time` (seconds) every frame.
#[derive(Debug)]
pub struct ShaderToy {
    program: Program,
    bindings: BindingTable,
    geometry: GeometryBuffer,
    size: (i32, i32),
    clear_colour: [f32; 4],
}

impl ShaderToy {
    pub fn new(ctx: &dyn GlContext, fragment: &str, width: i32, height: i32) -> Result<Self> {
        let program = ShaderSources::new(VERTEX, fragment)
            .link(ctx)
            .context("building shader-toy program")?;
        let bindings = BindingTable::reflect(ctx, program).context("reflecting shader-toy uniforms")?;
        let geometry = GeometryBuffer::link_mesh(ctx, &MeshData::screen_quad(), program)
            .context("uploading screen quad")?;

        debug!(uniforms = bindings.len(), width, height, "shader toy ready");
        Ok(Self {
            program,
            bindings,
            geometry,
            size: (width, height),
            clear_colour: [0.9, 0.9, 0.9, 1.0],
        })
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.size = (width, height);
    }

    pub fn size(&self) -> (i32, i32) {
        self.size
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Uniforms for the frame at `time_ms`, plus any caller extras.
    pub fn uniforms(&self, time_ms: f32) -> UniformValues {
        let (width, height) = self.size;
        UniformValues::new()
            .with("u_resolution", [width as f32, height as f32])
            .with("u_time", time_ms / 1000.0)
    }

    /// Clear the default framebuffer and draw the effect.
    pub fn render(&self, ctx: &dyn GlContext, time_ms: f32, extra: &UniformValues) -> Result<()> {
        let (width, height) = self.size;
        let [r, g, b, a] = self.clear_colour;
        ctx.bind_framebuffer(None);
        ctx.clear_color(r, g, b, a);
        ctx.clear(gl::COLOR_BUFFER_BIT);

        let mut values = self.uniforms(time_ms);
        values.extend(extra.iter().map(|(name, value)| (name.clone(), *value)));
        DrawPass::new(width, height).run(ctx, &self.bindings, &self.geometry, &values)?;
        Ok(())
    }

    /// Render one frame, logging instead of propagating failures.
    pub fn frame(&self, ctx: &dyn GlContext, time_ms: f32) {
        if let Err(err) = self.render(ctx, time_ms, &UniformValues::new()) {
            error!("shader toy frame failed: {err:#}");
        }
    }

    pub fn destroy(mut self, ctx: &dyn GlContext) {
        self.geometry.destroy(ctx);
        ctx.delete_program(self.program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_handler::mock::{GlCall, RecordingContext};
    use gl_handler::DrawMode;

    fn context() -> RecordingContext {
        RecordingContext::new()
            .with_uniform("u_resolution", gl::FLOAT_VEC2)
            .with_uniform("u_time", gl::FLOAT)
            .with_attribute("i_Position", gl::FLOAT_VEC2, 0)
    }

    #[test]
    fn draws_six_vertices_with_resolution_and_time() {
        let ctx = context();
        let toy = ShaderToy::new(&ctx, GRADIENT, 512, 256).unwrap();
        ctx.take_calls();

        toy.render(&ctx, 2000.0, &UniformValues::new()).unwrap();
        let calls = ctx.calls();
        assert!(calls.contains(&GlCall::UniformFloats { location: 0, values: vec![512.0, 256.0] }));
        assert!(calls.contains(&GlCall::Uniform1f { location: 1, value: 2.0 }));
        assert!(calls.contains(&GlCall::DrawArrays { mode: DrawMode::Triangles, first: 0, count: 6 }));
        assert!(calls.contains(&GlCall::Viewport { x: 0, y: 0, width: 512, height: 256 }));
    }

    #[test]
    fn resize_changes_viewport_and_resolution() {
        let ctx = context();
        let mut toy = ShaderToy::new(&ctx, GRADIENT, 512, 512).unwrap();
        toy.resize(100, 50);
        ctx.take_calls();

        toy.frame(&ctx, 0.0);
        let calls = ctx.calls();
        assert!(calls.contains(&GlCall::Viewport { x: 0, y: 0, width: 100, height: 50 }));
        assert!(calls.contains(&GlCall::UniformFloats { location: 0, values: vec![100.0, 50.0] }));
    }

    #[test]
    fn link_failure_carries_the_driver_log() {
        let ctx = context().failing_link("missing main");
        let err = ShaderToy::new(&ctx, GRADIENT, 1, 1).unwrap_err();
        assert!(format!("{err:#}").contains("missing main"));
    }

    #[test]
    fn destroy_releases_everything() {
        let ctx = context();
        let toy = ShaderToy::new(&ctx, GRADIENT, 8, 8).unwrap();
        toy.destroy(&ctx);
        assert_eq!(ctx.live_objects(), 0);
    }
}
