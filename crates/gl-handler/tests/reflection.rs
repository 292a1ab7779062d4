use gl_handler::context::Texture;
use gl_handler::mock::{GlCall, RecordingContext};
use gl_handler::{
    AttributeTable, BindingTable, GeometryBuffer, GlContext, GlError, GlType, MeshData, ShaderSources,
    UniformBlock, UniformValue, UniformValues,
};

fn sample_value(ty: GlType) -> UniformValue {
    match ty {
        GlType::Float => UniformValue::Float(0.5),
        GlType::FloatVec2 => UniformValue::Vec2([0.0; 2]),
        GlType::FloatVec3 => UniformValue::Vec3([0.0; 3]),
        GlType::FloatVec4 => UniformValue::Vec4([0.0; 4]),
        GlType::Int => UniformValue::Int(1),
        GlType::IntVec2 => UniformValue::IVec2([1; 2]),
        GlType::IntVec3 => UniformValue::IVec3([1; 3]),
        GlType::IntVec4 => UniformValue::IVec4([1; 4]),
        GlType::Bool => UniformValue::Bool(true),
        GlType::BoolVec2 => UniformValue::BVec2([true; 2]),
        GlType::BoolVec3 => UniformValue::BVec3([true; 3]),
        GlType::BoolVec4 => UniformValue::BVec4([true; 4]),
        GlType::FloatMat2 => UniformValue::Mat2([0.0; 4]),
        GlType::FloatMat3 => UniformValue::Mat3([0.0; 9]),
        GlType::FloatMat4 => UniformValue::Mat4([0.0; 16]),
        GlType::FloatMat2x3 => UniformValue::Mat2x3([0.0; 6]),
        GlType::FloatMat2x4 => UniformValue::Mat2x4([0.0; 8]),
        GlType::FloatMat3x2 => UniformValue::Mat3x2([0.0; 6]),
        GlType::FloatMat3x4 => UniformValue::Mat3x4([0.0; 12]),
        GlType::FloatMat4x2 => UniformValue::Mat4x2([0.0; 8]),
        GlType::FloatMat4x3 => UniformValue::Mat4x3([0.0; 12]),
        GlType::Sampler2d => UniformValue::Texture(Texture::from_raw(99).unwrap()),
    }
}

fn linked(ctx: &RecordingContext) -> gl_handler::Program {
    ShaderSources::new("void main() {}", "void main() {}").link(ctx).unwrap()
}

#[test]
fn every_supported_type_accepts_a_value_of_its_shape() {
    let ctx = GlType::ALL
        .iter()
        .fold(RecordingContext::new(), |ctx, ty| {
            ctx.with_uniform(&format!("u_{}", ty.symbolic_name()), ty.gl())
        });
    let program = linked(&ctx);
    let bindings = BindingTable::reflect(&ctx, program).unwrap();
    assert_eq!(bindings.len(), GlType::ALL.len());

    let values: UniformValues = GlType::ALL
        .iter()
        .map(|ty| (format!("u_{}", ty.symbolic_name()), sample_value(*ty)))
        .collect();
    ctx.use_program(Some(program));
    assert_eq!(bindings.apply(&ctx, &values), GlType::ALL.len());
}

#[test]
fn samplers_get_dense_units_in_encounter_order() {
    let ctx = RecordingContext::new()
        .with_uniform("u_albedo", gl::SAMPLER_2D)
        .with_uniform("u_time", gl::FLOAT)
        .with_uniform("u_normal", gl::SAMPLER_2D)
        .with_uniform("u_mask", gl::SAMPLER_2D);
    let bindings = BindingTable::reflect(&ctx, linked(&ctx)).unwrap();

    assert_eq!(bindings.len(), 4);
    assert_eq!(bindings.texture_unit("u_albedo"), Some(0));
    assert_eq!(bindings.texture_unit("u_normal"), Some(1));
    assert_eq!(bindings.texture_unit("u_mask"), Some(2));
    assert_eq!(bindings.texture_unit("u_time"), None);
}

#[test]
fn too_many_samplers_for_the_context_is_an_error() {
    let ctx = RecordingContext::new()
        .with_max_texture_units(1)
        .with_uniform("u_a", gl::SAMPLER_2D)
        .with_uniform("u_b", gl::SAMPLER_2D);
    let err = BindingTable::reflect(&ctx, linked(&ctx)).unwrap_err();
    assert_eq!(err, GlError::TextureUnitsExhausted { requested: 2, available: 1 });
}

#[test]
fn unsupported_uniform_type_fails_reflection() {
    let ctx = RecordingContext::new().with_uniform("u_env", 0x8b60);
    let err = BindingTable::reflect(&ctx, linked(&ctx)).unwrap_err();
    assert!(matches!(err, GlError::UnknownType { id: 0x8b60, .. }));
}

#[test]
fn offering_only_unknown_names_writes_nothing() {
    let ctx = RecordingContext::new().with_uniform("u_time", gl::FLOAT);
    let bindings = BindingTable::reflect(&ctx, linked(&ctx)).unwrap();
    ctx.take_calls();

    let values = UniformValues::new().with("u_other", 1.0f32).with("u_more", 2);
    assert_eq!(bindings.apply(&ctx, &values), 0);
    assert!(ctx.calls().is_empty());
}

#[test]
fn block_members_are_written_at_reported_offsets() {
    let ctx = RecordingContext::new().with_uniform_block(
        "Light",
        32,
        &[("u_lightPos", 0), ("u_lightColor", 12)],
    );
    let program = linked(&ctx);
    let block = UniformBlock::create(&ctx, program, "Light", &["u_lightPos", "u_lightColor"], 0).unwrap();
    assert_eq!(block.offset("u_lightPos"), Some(0));
    assert_eq!(block.offset("u_lightColor"), Some(12));

    ctx.take_calls();
    let position = [1.0f32, 2.0, 3.0];
    let colour = [0.5f32, 0.5, 0.5];
    block.write(&ctx, [("u_lightPos", &position), ("u_lightColor", &colour)]);

    let writes: Vec<_> = ctx
        .calls()
        .into_iter()
        .filter(|c| matches!(c, GlCall::BufferSubData { .. }))
        .collect();
    assert_eq!(writes.len(), 2);
    assert!(writes.contains(&GlCall::BufferSubData {
        target: gl_handler::BufferTarget::Uniform,
        offset: 12,
        len: 12,
    }));
}

#[test]
fn attribute_table_reports_missing_names_as_negative() {
    let ctx = RecordingContext::new()
        .with_attribute("i_Position", gl::FLOAT_VEC3, 0)
        .with_attribute("i_Normal", gl::FLOAT_VEC3, 1);
    let attributes = AttributeTable::reflect(&ctx, linked(&ctx)).unwrap();

    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes.location("i_Normal"), 1);
    assert_eq!(attributes.location("i_Color"), -1);
}

#[test]
fn unindexed_mesh_draws_one_vertex_per_position_triple() {
    let ctx = RecordingContext::new().with_attribute("i_Position", gl::FLOAT_VEC3, 0);
    let program = linked(&ctx);
    let positions: Vec<f32> = (0..27).map(|i| i as f32).collect();
    let geometry = GeometryBuffer::link_mesh(&ctx, &MeshData::new(positions, 3), program).unwrap();
    assert_eq!(geometry.vertex_count(), 9);

    ctx.take_calls();
    geometry.draw(&ctx, gl_handler::DrawMode::Triangles).unwrap();
    assert!(ctx.calls().contains(&GlCall::DrawArrays {
        mode: gl_handler::DrawMode::Triangles,
        first: 0,
        count: 9,
    }));
}
