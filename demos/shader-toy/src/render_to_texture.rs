//! A quad rendered into a small texture, then shown on a spinning quad.

use anyhow::{Context, Result};
use gl_handler::context::{Framebuffer, GlContext};
use gl_handler::{
    BindingTable, Camera, CameraConfig, DrawPass, GeometryBuffer, MeshData, ModelTransform,
    Program, ProjectionConfig, ResourceFactory, Rotation, ShaderSources, Spin, Texture,
    TextureFormat, TextureOptions, UniformValues,
};
use glam::Vec3;
use tracing::{debug, error};

pub const VERTEX: &str = "#version 300 es
precision mediump float;

in vec3 i_Position;
in vec2 i_TexCoord;

uniform mat4 u_ProjectionMatrix;
uniform mat4 u_ViewMatrix;
uniform mat4 u_ModelMatrix;

out vec2 v_TexCoord;

void main() {
    gl_Position = u_ProjectionMatrix * u_ViewMatrix * u_ModelMatrix * vec4(i_Position, 1.0);
    v_TexCoord = i_TexCoord;
}";

pub const COLOUR: &str = "#version 300 es
precision mediump float;

uniform vec2 u_Resolution;
out vec4 OUTCOLOUR;

void main() {
    OUTCOLOUR = vec4(gl_FragCoord.xy / u_Resolution, 0.0, 1.0);
}";

pub const TEXTURED: &str = "#version 300 es
precision mediump float;

in vec2 v_TexCoord;
uniform sampler2D u_Texture;
out vec4 OUTCOLOUR;

void main() {
    OUTCOLOUR = texture(u_Texture, v_TexCoord);
}";

/// Offscreen texture resolution.
pub const TARGET_SIZE: i32 = 64;

#[derive(Debug)]
struct Stage {
    program: Program,
    bindings: BindingTable,
    geometry: GeometryBuffer,
}

impl Stage {
    fn new(ctx: &dyn GlContext, fragment: &str) -> Result<Self> {
        let program = ShaderSources::new(VERTEX, fragment).link(ctx)?;
        Ok(Self {
            program,
            bindings: BindingTable::reflect(ctx, program)?,
            geometry: GeometryBuffer::link_mesh(ctx, &MeshData::quad(), program)?,
        })
    }
}

#[derive(Debug)]
pub struct RenderToTexture {
    offscreen: Stage,
    onscreen: Stage,
    texture: Texture,
    framebuffer: Framebuffer,
    camera: Camera,
    projection: ProjectionConfig,
    model: ModelTransform,
}

impl RenderToTexture {
    pub fn new(ctx: &dyn GlContext) -> Result<Self> {
        let offscreen = Stage::new(ctx, COLOUR).context("building colour program")?;
        let onscreen = Stage::new(ctx, TEXTURED).context("building display program")?;

        let texture = ctx.create_texture_from_keys(TARGET_SIZE, TARGET_SIZE, "RGB", Some("NEAREST"), None)?;
        let framebuffer = ctx.create_framebuffer(texture)?;

        let camera = Camera::new(CameraConfig {
            position: Vec3::new(0.0, 0.0, 2.0),
            ..CameraConfig::default()
        });
        let model = ModelTransform::new(
            Vec3::ZERO,
            Rotation {
                axis: Vec3::Y,
                spin: Spin::Oscillating { speed: 0.01 },
            },
        );

        debug!(texture = texture.raw(), framebuffer = framebuffer.raw(), "render-to-texture ready");
        Ok(Self {
            offscreen,
            onscreen,
            texture,
            framebuffer,
            camera,
            projection: ProjectionConfig::default(),
            model,
        })
    }

    pub fn texture(&self) -> Texture {
        self.texture
    }

    fn matrices(&self, aspect: f32, time_ms: f32) -> UniformValues {
        UniformValues::new()
            .with("u_ProjectionMatrix", self.projection.matrix(aspect))
            .with("u_ViewMatrix", self.camera.view_matrix())
            .with("u_ModelMatrix", self.model.matrix(time_ms))
    }

    pub fn render(&mut self, ctx: &dyn GlContext, width: i32, height: i32, time_ms: f32) -> Result<()> {
        let offscreen = self
            .matrices(1.0, 0.0)
            .with("u_Resolution", [TARGET_SIZE as f32; 2]);
        ctx.bind_framebuffer(Some(self.framebuffer));
        ctx.clear_color(0.9, 0.9, 0.9, 1.0);
        ctx.clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        DrawPass::new(TARGET_SIZE, TARGET_SIZE)
            .to_framebuffer(self.framebuffer)
            .run(ctx, &self.offscreen.bindings, &self.offscreen.geometry, &offscreen)?;

        let orbit = (time_ms * 0.002).sin() * 2.0;
        self.camera.set_position(Vec3::new(orbit, 1.0, 4.0));
        let aspect = width as f32 / height.max(1) as f32;
        let onscreen = self.matrices(aspect, time_ms).with("u_Texture", self.texture);
        ctx.bind_framebuffer(None);
        ctx.clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        DrawPass::new(width, height).run(ctx, &self.onscreen.bindings, &self.onscreen.geometry, &onscreen)?;
        Ok(())
    }

    pub fn frame(&mut self, ctx: &dyn GlContext, width: i32, height: i32, time_ms: f32) {
        if let Err(err) = self.render(ctx, width, height, time_ms) {
            error!("render-to-texture frame failed: {err:#}");
        }
    }

    pub fn destroy(self, ctx: &dyn GlContext) {
        for mut stage in [self.offscreen, self.onscreen] {
            stage.geometry.destroy(ctx);
            ctx.delete_program(stage.program);
        }
        ctx.delete_texture(self.texture);
        ctx.delete_framebuffer(self.framebuffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_handler::mock::{GlCall, RecordingContext};
    use gl_handler::DrawMode;

    fn context() -> RecordingContext {
        RecordingContext::new()
            .with_uniform("u_ProjectionMatrix", gl::FLOAT_MAT4)
            .with_uniform("u_ViewMatrix", gl::FLOAT_MAT4)
            .with_uniform("u_ModelMatrix", gl::FLOAT_MAT4)
            .with_uniform("u_Resolution", gl::FLOAT_VEC2)
            .with_uniform("u_Texture", gl::SAMPLER_2D)
            .with_attribute("i_Position", gl::FLOAT_VEC3, 0)
            .with_attribute("i_TexCoord", gl::FLOAT_VEC2, 1)
    }

    #[test]
    fn offscreen_then_onscreen() {
        let ctx = context();
        let mut demo = RenderToTexture::new(&ctx).unwrap();
        ctx.take_calls();

        demo.render(&ctx, 512, 512, 0.0).unwrap();
        let calls = ctx.calls();
        let viewports: Vec<_> = calls
            .iter()
            .filter(|c| matches!(c, GlCall::Viewport { .. }))
            .cloned()
            .collect();
        assert_eq!(
            viewports,
            vec![
                GlCall::Viewport { x: 0, y: 0, width: TARGET_SIZE, height: TARGET_SIZE },
                GlCall::Viewport { x: 0, y: 0, width: 512, height: 512 },
            ]
        );
        let draws = calls
            .iter()
            .filter(|c| matches!(c, GlCall::DrawElements { mode: DrawMode::Triangles, count: 6, .. }))
            .count();
        assert_eq!(draws, 2);
        assert_eq!(ctx.bound_texture(0), Some(demo.texture()));
    }

    #[test]
    fn target_texture_is_rgb_nearest() {
        let ctx = context();
        RenderToTexture::new(&ctx).unwrap();
        let calls = ctx.calls();
        assert!(calls.contains(&GlCall::TexImage2D {
            internal_format: gl::RGB as i32,
            width: TARGET_SIZE,
            height: TARGET_SIZE,
            format: gl::RGB,
            ty: gl::UNSIGNED_BYTE,
            data_len: None,
        }));
        assert!(calls.contains(&GlCall::TexParameter {
            parameter: gl::TEXTURE_MAG_FILTER,
            value: gl::NEAREST as i32,
        }));
    }

    #[test]
    fn destroy_releases_everything() {
        let ctx = context();
        let demo = RenderToTexture::new(&ctx).unwrap();
        demo.destroy(&ctx);
        assert_eq!(ctx.live_objects(), 0);
    }
}
