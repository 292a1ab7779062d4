//! Ping-pong feedback: each step reads the previous step's output.
//!
//! Two float textures alternate as source and destination behind a single
//! framebuffer whose colour attachment is re-pointed every step.

use anyhow::{Context, Result};
use gl_handler::context::{Framebuffer, GlContext};
use gl_handler::{
    BindingTable, DrawPass, GeometryBuffer, MeshData, Program, ResourceFactory, ShaderSources,
    Texture, TextureFilter, TextureFormat, TextureOptions, TextureWrap, UniformValues,
};
use tracing::{debug, error, trace};

use crate::shader_toy::VERTEX;

/// Fades the previous frame and adds a moving dot.
pub const DECAY: &str = "#version 300 es
precision highp float;

uniform sampler2D u_texture;
uniform vec2 u_resolution;
uniform int u_frame;
out vec4 OUTCOLOUR;

void main() {
    vec2 uv = gl_FragCoord.xy / u_resolution;
    vec4 previous = texture(u_texture, uv) * 0.98;
    float t = float(u_frame) * 0.02;
    vec2 dot = vec2(0.5) + 0.35 * vec2(cos(t), sin(t));
    float glow = smoothstep(0.03, 0.0, distance(uv, dot));
    OUTCOLOUR = previous + vec4(glow);
}";

/// Shows a texture on screen.
pub const DISPLAY: &str = "#version 300 es
precision highp float;

uniform sampler2D u_texture;
uniform vec2 u_resolution;
out vec4 OUTCOLOUR;

void main() {
    OUTCOLOUR = texture(u_texture, gl_FragCoord.xy / u_resolution);
}";

#[derive(Debug)]
struct Pass {
    program: Program,
    bindings: BindingTable,
    geometry: GeometryBuffer,
}

impl Pass {
    fn new(ctx: &dyn GlContext, fragment: &str, label: &str) -> Result<Self> {
        let program = ShaderSources::new(VERTEX, fragment)
            .link(ctx)
            .with_context(|| format!("building {label} program"))?;
        let bindings = BindingTable::reflect(ctx, program)?;
        let geometry = GeometryBuffer::link_mesh(ctx, &MeshData::screen_quad(), program)?;
        Ok(Self {
            program,
            bindings,
            geometry,
        })
    }

    fn destroy(mut self, ctx: &dyn GlContext) {
        self.geometry.destroy(ctx);
        ctx.delete_program(self.program);
    }
}

/// A feedback simulation at a fixed resolution.
#[derive(Debug)]
pub struct Feedback {
    step: Pass,
    display: Pass,
    textures: [Texture; 2],
    framebuffer: Framebuffer,
    /// Index of the texture holding the latest result.
    current: usize,
    frame: i32,
    size: (i32, i32),
}

impl Feedback {
    pub fn new(ctx: &dyn GlContext, step_fragment: &str, width: i32, height: i32) -> Result<Self> {
        let step = Pass::new(ctx, step_fragment, "feedback step")?;
        let display = Pass::new(ctx, DISPLAY, "feedback display")?;

        let options = TextureOptions::new(TextureFormat::Rgba16f)
            .with_filter(TextureFilter::Linear)
            .with_wrap(TextureWrap::ClampToEdge);
        let textures = [
            ctx.create_texture(width, height, &options).context("allocating feedback texture")?,
            ctx.create_texture(width, height, &options).context("allocating feedback texture")?,
        ];
        let framebuffer = ctx.create_framebuffer(textures[0])?;

        debug!(width, height, "feedback targets ready");
        Ok(Self {
            step,
            display,
            textures,
            framebuffer,
            current: 0,
            frame: 0,
            size: (width, height),
        })
    }

    /// The texture holding the latest result.
    pub fn output(&self) -> Texture {
        self.textures[self.current]
    }

    pub fn frame(&self) -> i32 {
        self.frame
    }

    /// Run one simulation step into the other texture, then swap.
    pub fn step(&mut self, ctx: &dyn GlContext) -> Result<()> {
        let (width, height) = self.size;
        let source = self.textures[self.current];
        let target = self.textures[1 - self.current];
        ctx.attach_color(self.framebuffer, target);

        let values = UniformValues::new()
            .with("u_texture", source)
            .with("u_resolution", [width as f32, height as f32])
            .with("u_frame", self.frame);
        DrawPass::new(width, height)
            .to_framebuffer(self.framebuffer)
            .run(ctx, &self.step.bindings, &self.step.geometry, &values)?;

        trace!(frame = self.frame, from = source.raw(), to = target.raw(), "feedback step");
        self.current = 1 - self.current;
        self.frame += 1;
        Ok(())
    }

    /// Draw the latest result to the default framebuffer.
    pub fn present(&self, ctx: &dyn GlContext, width: i32, height: i32) -> Result<()> {
        let values = UniformValues::new()
            .with("u_texture", self.output())
            .with("u_resolution", [width as f32, height as f32]);
        DrawPass::new(width, height).run(ctx, &self.display.bindings, &self.display.geometry, &values)?;
        Ok(())
    }

    /// Step then present, logging failures.
    pub fn tick(&mut self, ctx: &dyn GlContext, width: i32, height: i32) {
        let result = self.step(ctx).and_then(|()| self.present(ctx, width, height));
        if let Err(err) = result {
            error!("feedback frame {} failed: {err:#}", self.frame);
        }
    }

    pub fn destroy(self, ctx: &dyn GlContext) {
        self.step.destroy(ctx);
        self.display.destroy(ctx);
        for texture in self.textures {
            ctx.delete_texture(texture);
        }
        ctx.delete_framebuffer(self.framebuffer);
    }
}
