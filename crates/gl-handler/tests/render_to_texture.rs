use gl_handler::context::Framebuffer;
use gl_handler::mock::{GlCall, RecordingContext};
use gl_handler::{
    BindingTable, DrawPass, GeometryBuffer, GlError, MeshData, ResourceFactory, ShaderSources,
    TextureFormat, TextureOptions, UniformValues,
};

const VS: &str = "#version 300 es
in vec3 i_Position;
in vec2 i_TexCoord;
out vec2 v_uv;
void main() { v_uv = i_TexCoord; gl_Position = vec4(i_Position, 1.0); }";

const FS: &str = "#version 300 es
precision highp float;
uniform sampler2D u_texture;
uniform int u_frame;
in vec2 v_uv;
out vec4 o_colour;
void main() { o_colour = texture(u_texture, v_uv) * float(u_frame); }";

fn scripted_context() -> RecordingContext {
    RecordingContext::new()
        .with_uniform("u_texture", gl::SAMPLER_2D)
        .with_uniform("u_frame", gl::INT)
        .with_attribute("i_Position", gl::FLOAT_VEC3, 0)
        .with_attribute("i_TexCoord", gl::FLOAT_VEC2, 2)
}

#[test]
fn rgba16f_texture_becomes_the_framebuffer_colour_attachment() {
    let ctx = scripted_context();
    let texture = ctx
        .create_texture(64, 64, &TextureOptions::new(TextureFormat::Rgba16f))
        .unwrap();
    let framebuffer = ctx.create_framebuffer(texture).unwrap();

    let attachments: Vec<_> = ctx
        .calls()
        .into_iter()
        .filter(|c| matches!(c, GlCall::FramebufferTexture2D { .. }))
        .collect();
    assert_eq!(
        attachments,
        vec![GlCall::FramebufferTexture2D {
            attachment: gl::COLOR_ATTACHMENT0,
            texture: Some(texture),
            level: 0,
        }]
    );
    assert!(ctx.is_live(framebuffer.raw()));
    assert_eq!(ctx.bound_framebuffer(), None::<Framebuffer>);
}

#[test]
fn unknown_format_key_fails_before_any_texture_exists() {
    let ctx = scripted_context();
    let err = ctx
        .create_texture_from_keys(64, 64, "RGBA64F", None, None)
        .unwrap_err();
    assert!(matches!(err, GlError::UnsupportedFormat { .. }));
    assert!(!ctx
        .calls()
        .iter()
        .any(|c| matches!(c, GlCall::GenTexture(_))));
}

#[test]
fn quad_assembles_only_present_attributes() {
    let ctx = scripted_context();
    let program = ShaderSources::new(VS, FS).link(&ctx).unwrap();
    ctx.take_calls();

    let geometry = GeometryBuffer::link_mesh(&ctx, &MeshData::quad(), program).unwrap();
    let enabled: Vec<u32> = ctx
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            GlCall::EnableVertexAttribArray(index) => Some(index),
            _ => None,
        })
        .collect();
    assert_eq!(enabled, vec![0, 2]);
    assert_eq!(geometry.vertex_count(), 4);
    assert_eq!(geometry.index_count(), 6);
}

#[test]
fn draw_pass_orders_calls_and_binds_samplers() {
    let ctx = scripted_context();
    let program = ShaderSources::new(VS, FS).link(&ctx).unwrap();
    let bindings = BindingTable::reflect(&ctx, program).unwrap();
    let geometry = GeometryBuffer::link_mesh(&ctx, &MeshData::quad(), program).unwrap();
    let texture = ctx
        .create_texture(8, 8, &TextureOptions::new(TextureFormat::Rgba))
        .unwrap();
    let framebuffer = ctx.create_framebuffer(texture).unwrap();
    ctx.take_calls();

    let values = UniformValues::new()
        .with("u_texture", texture)
        .with("u_frame", 3)
        .with("u_unused", 1.0f32);
    DrawPass::new(8, 8)
        .to_framebuffer(framebuffer)
        .run(&ctx, &bindings, &geometry, &values)
        .unwrap();

    assert_eq!(
        ctx.calls(),
        vec![
            GlCall::BindFramebuffer(Some(framebuffer)),
            GlCall::Viewport { x: 0, y: 0, width: 8, height: 8 },
            GlCall::UseProgram(Some(program)),
            GlCall::BindVertexArray(geometry.vao()),
            GlCall::Uniform1i { location: 1, value: 3 },
            GlCall::ActiveTexture(0),
            GlCall::BindTexture(Some(texture)),
            GlCall::Uniform1i { location: 0, value: 0 },
            GlCall::DrawElements {
                mode: gl_handler::DrawMode::Triangles,
                count: 6,
                element_type: gl::UNSIGNED_SHORT,
                offset: 0,
            },
            GlCall::BindVertexArray(None),
        ]
    );
}
