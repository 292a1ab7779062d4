//! GPU buffers and vertex arrays for a mesh.
//!
//! [`GeometryBuffer`] uploads vertex channels, records [`BufferLayout`]s into
//! vertex arrays and draws them. It owns every object it creates and moves
//! through [`LinkState`] from unlinked to linked to destroyed.

use tracing::{debug, trace};

use crate::bytes::AsBytes;
use crate::context::{Buffer, BufferTarget, BufferUsage, DrawMode, GlContext, Program, VertexArray};
use crate::error::{GlError, Result};
use crate::resources::ResourceFactory;

use super::layout::{AttributeLayout, BufferLayout, ComponentType};
use super::mesh::MeshData;
use super::{I_COLOR, I_NORMAL, I_POSITION, I_TEX_COORD};

/// Lifecycle of a [`GeometryBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Buffers may exist but no vertex array is assembled.
    Unlinked,
    /// At least one vertex array is assembled. Holds the program the first
    /// one was assembled against; that vertex array is the one drawn.
    Linked(Program),
    /// Every owned GPU object is released.
    Destroyed,
}

#[derive(Debug, Clone, Copy)]
struct OwnedVertexArray {
    vertex_array: VertexArray,
    assembled: bool,
}

/// GPU buffers and vertex arrays for one mesh.
///
/// Every buffer and vertex array created through this type is recorded and
/// released together by [`destroy`](GeometryBuffer::destroy).
#[derive(Debug)]
pub struct GeometryBuffer {
    buffers: Vec<Buffer>,
    vertex_arrays: Vec<OwnedVertexArray>,
    vertex_count: i32,
    index_count: i32,
    state: LinkState,
}

impl Default for GeometryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self {
            buffers: Vec::new(),
            vertex_arrays: Vec::new(),
            vertex_count: 0,
            index_count: 0,
            state: LinkState::Unlinked,
        }
    }

    fn ensure_alive(&self, operation: &str) -> Result<()> {
        if self.state == LinkState::Destroyed {
            return Err(GlError::GeometryState(format!("{operation} after destroy")));
        }
        Ok(())
    }

    /// Create an array buffer holding `data`.
    ///
    /// Use [`BufferUsage::Static`] for data written once and
    /// [`BufferUsage::Stream`] for data rewritten every frame. Leaves the
    /// array buffer target unbound.
    pub fn upload<T: AsBytes>(&mut self, ctx: &dyn GlContext, data: &[T], usage: BufferUsage) -> Result<Buffer> {
        self.ensure_alive("upload")?;
        let buffer = ctx.create_buffer(BufferTarget::Array, data, usage)?;
        ctx.bind_buffer(BufferTarget::Array, None);
        self.buffers.push(buffer);
        trace!(buffer = buffer.raw(), bytes = std::mem::size_of_val(data), "uploaded array buffer");
        Ok(buffer)
    }

    /// Upload vertex positions and take the vertex count from them:
    /// `data.len() / components`, with 0 components read as 3.
    pub fn upload_vertices(
        &mut self,
        ctx: &dyn GlContext,
        data: &[f32],
        components: usize,
        usage: BufferUsage,
    ) -> Result<Buffer> {
        let buffer = self.upload(ctx, data, usage)?;
        let components = if components == 0 { 3 } else { components };
        self.vertex_count = (data.len() / components) as i32;
        Ok(buffer)
    }

    /// Create a vertex array owned by this geometry.
    pub fn create_vertex_array(&mut self, ctx: &dyn GlContext) -> Result<VertexArray> {
        self.ensure_alive("create_vertex_array")?;
        let vertex_array = ctx
            .gen_vertex_array()
            .ok_or(GlError::ObjectCreation("vertex array"))?;
        self.vertex_arrays.push(OwnedVertexArray {
            vertex_array,
            assembled: false,
        });
        Ok(vertex_array)
    }

    /// Record `layouts` into `vertex_array` for `program`.
    ///
    /// Attributes with a negative location produce no GL calls. When
    /// `indices` is given they become this geometry's 16-bit index buffer,
    /// captured by the vertex array. On return the vertex array, array
    /// buffer and element buffer targets are unbound, in that order.
    ///
    /// Each vertex array is assembled once; linking against another program
    /// needs a fresh vertex array.
    pub fn assemble(
        &mut self,
        ctx: &dyn GlContext,
        program: Program,
        vertex_array: VertexArray,
        layouts: &[BufferLayout],
        indices: Option<&[u16]>,
    ) -> Result<()> {
        self.ensure_alive("assemble")?;
        let slot = self
            .vertex_arrays
            .iter()
            .position(|v| v.vertex_array == vertex_array)
            .ok_or_else(|| {
                GlError::GeometryState(format!(
                    "vertex array {} is not owned by this geometry",
                    vertex_array.raw()
                ))
            })?;
        if self.vertex_arrays[slot].assembled {
            return Err(GlError::GeometryState(format!(
                "vertex array {} is already assembled",
                vertex_array.raw()
            )));
        }
        for layout in layouts {
            layout.validate()?;
        }

        ctx.bind_vertex_array(Some(vertex_array));
        for layout in layouts {
            ctx.bind_buffer(BufferTarget::Array, Some(layout.buffer));
            for (attribute, offset) in layout.attributes.iter().zip(layout.offsets()) {
                let Some(offset) = offset else { continue };
                let location = attribute.location as u32;
                ctx.enable_vertex_attrib_array(location);
                ctx.vertex_attrib_pointer(
                    location,
                    attribute.components,
                    attribute.component_type.gl(),
                    false,
                    layout.stride,
                    offset,
                );
                if let Some(divisor) = attribute.divisor {
                    ctx.vertex_attrib_divisor(location, divisor);
                }
            }
        }

        let index_buffer = indices
            .map(|indices| ctx.create_buffer(BufferTarget::ElementArray, indices, BufferUsage::Static))
            .transpose();

        ctx.bind_vertex_array(None);
        ctx.bind_buffer(BufferTarget::Array, None);
        ctx.bind_buffer(BufferTarget::ElementArray, None);

        let indexed = match (index_buffer?, indices) {
            (Some(buffer), Some(indices)) => {
                self.buffers.push(buffer);
                self.index_count = indices.len() as i32;
                true
            }
            _ => false,
        };

        self.vertex_arrays[slot].assembled = true;
        if self.state == LinkState::Unlinked {
            self.state = LinkState::Linked(program);
        }
        debug!(
            vertex_array = vertex_array.raw(),
            program = program.raw(),
            buffers = layouts.len(),
            indexed,
            "assembled vertex array"
        );
        Ok(())
    }

    /// Upload every channel of `mesh` into its own static buffer and assemble
    /// one vertex array against `program`, resolving attributes by name
    /// (`i_Position`, `i_Normal`, `i_TexCoord`, `i_Color`).
    ///
    /// On failure every object created so far is deleted.
    pub fn link_mesh(ctx: &dyn GlContext, mesh: &MeshData, program: Program) -> Result<Self> {
        let mut geometry = Self::new();
        match geometry.fill_from_mesh(ctx, mesh, program) {
            Ok(()) => Ok(geometry),
            Err(err) => {
                geometry.destroy(ctx);
                Err(err)
            }
        }
    }

    fn fill_from_mesh(&mut self, ctx: &dyn GlContext, mesh: &MeshData, program: Program) -> Result<()> {
        let mut layouts = Vec::with_capacity(4);

        let positions = self.upload_vertices(ctx, &mesh.positions, mesh.position_components(), BufferUsage::Static)?;
        layouts.push(BufferLayout::single(
            positions,
            AttributeLayout::new(ctx.attrib_location(program, I_POSITION), mesh.position_components() as i32),
        ));

        let channels = [
            (mesh.normals.as_deref(), I_NORMAL, 3),
            (mesh.tex_coords.as_deref(), I_TEX_COORD, 2),
            (mesh.colors.as_deref(), I_COLOR, 4),
        ];
        for (data, name, components) in channels {
            let Some(data) = data else { continue };
            let buffer = self.upload(ctx, data, BufferUsage::Static)?;
            layouts.push(BufferLayout::single(
                buffer,
                AttributeLayout::typed(ctx.attrib_location(program, name), components, ComponentType::Float),
            ));
        }

        let vertex_array = self.create_vertex_array(ctx)?;
        self.assemble(ctx, program, vertex_array, &layouts, mesh.indices.as_deref())
    }

    /// The first vertex array created, the one drawn by [`draw`](Self::draw).
    pub fn vao(&self) -> Option<VertexArray> {
        self.vertex_arrays.first().map(|v| v.vertex_array)
    }

    fn linked_vao(&self) -> Result<VertexArray> {
        match self.state {
            LinkState::Linked(_) => self
                .vertex_arrays
                .iter()
                .find(|v| v.assembled)
                .map(|v| v.vertex_array)
                .ok_or_else(|| GlError::GeometryState("no assembled vertex array".into())),
            LinkState::Unlinked => Err(GlError::GeometryState("draw before assemble".into())),
            LinkState::Destroyed => Err(GlError::GeometryState("draw after destroy".into())),
        }
    }

    /// Bind the first assembled vertex array.
    pub fn bind(&self, ctx: &dyn GlContext) -> Result<()> {
        ctx.bind_vertex_array(Some(self.linked_vao()?));
        Ok(())
    }

    /// Issue the draw for the bound vertex array: 16-bit element draws when
    /// indexed, array draws otherwise.
    pub fn issue_draw(&self, ctx: &dyn GlContext, mode: DrawMode) {
        if self.index_count > 0 {
            ctx.draw_elements(mode, self.index_count, gl::UNSIGNED_SHORT, 0);
        } else {
            ctx.draw_arrays(mode, 0, self.vertex_count);
        }
    }

    /// Instanced form of [`issue_draw`](Self::issue_draw).
    pub fn issue_draw_instanced(&self, ctx: &dyn GlContext, mode: DrawMode, instances: i32) {
        if self.index_count > 0 {
            ctx.draw_elements_instanced(mode, self.index_count, gl::UNSIGNED_SHORT, 0, instances);
        } else {
            ctx.draw_arrays_instanced(mode, 0, self.vertex_count, instances);
        }
    }

    pub fn unbind(&self, ctx: &dyn GlContext) {
        ctx.bind_vertex_array(None);
    }

    /// Bind, draw, unbind. The program and its uniforms must already be set.
    pub fn draw(&self, ctx: &dyn GlContext, mode: DrawMode) -> Result<()> {
        self.bind(ctx)?;
        self.issue_draw(ctx, mode);
        self.unbind(ctx);
        Ok(())
    }

    pub fn draw_instanced(&self, ctx: &dyn GlContext, mode: DrawMode, instances: i32) -> Result<()> {
        self.bind(ctx)?;
        self.issue_draw_instanced(ctx, mode, instances);
        self.unbind(ctx);
        Ok(())
    }

    /// Release every buffer and vertex array. Calling it again does nothing.
    pub fn destroy(&mut self, ctx: &dyn GlContext) {
        if self.state == LinkState::Destroyed {
            return;
        }
        for buffer in self.buffers.drain(..) {
            ctx.delete_buffer(buffer);
        }
        for owned in self.vertex_arrays.drain(..) {
            ctx.delete_vertex_array(owned.vertex_array);
        }
        self.vertex_count = 0;
        self.index_count = 0;
        self.state = LinkState::Destroyed;
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    /// Override the vertex count, for buffers uploaded with [`upload`](Self::upload).
    pub fn set_vertex_count(&mut self, vertex_count: i32) {
        self.vertex_count = vertex_count;
    }

    pub fn index_count(&self) -> i32 {
        self.index_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{GlCall, ObjectKind, RecordingContext};

    fn program() -> Program {
        Program::from_raw(99).unwrap()
    }

    #[test]
    fn vertex_count_comes_from_components() {
        let ctx = RecordingContext::new();
        let mut geometry = GeometryBuffer::new();
        geometry
            .upload_vertices(&ctx, &[0.0; 18], 3, BufferUsage::Static)
            .unwrap();
        assert_eq!(geometry.vertex_count(), 6);
        assert_eq!(ctx.bound_buffer(BufferTarget::Array), None);
    }

    #[test]
    fn assemble_skips_absent_locations_and_sets_divisors() {
        let ctx = RecordingContext::new();
        let mut geometry = GeometryBuffer::new();
        let buffer = geometry.upload(&ctx, &[0.0f32; 32], BufferUsage::Static).unwrap();
        let vao = geometry.create_vertex_array(&ctx).unwrap();
        let layout = BufferLayout::interleaved(
            buffer,
            [
                AttributeLayout::new(0, 3),
                AttributeLayout::new(-1, 3),
                AttributeLayout::new(2, 2).with_divisor(1),
            ],
        );
        ctx.take_calls();

        geometry.assemble(&ctx, program(), vao, &[layout], None).unwrap();
        assert_eq!(
            ctx.calls(),
            vec![
                GlCall::BindVertexArray(Some(vao)),
                GlCall::BindBuffer(BufferTarget::Array, Some(buffer)),
                GlCall::EnableVertexAttribArray(0),
                GlCall::VertexAttribPointer {
                    index: 0,
                    size: 3,
                    data_type: gl::FLOAT,
                    normalized: false,
                    stride: 20,
                    offset: 0,
                },
                GlCall::EnableVertexAttribArray(2),
                GlCall::VertexAttribPointer {
                    index: 2,
                    size: 2,
                    data_type: gl::FLOAT,
                    normalized: false,
                    stride: 20,
                    offset: 12,
                },
                GlCall::VertexAttribDivisor { index: 2, divisor: 1 },
                GlCall::BindVertexArray(None),
                GlCall::BindBuffer(BufferTarget::Array, None),
                GlCall::BindBuffer(BufferTarget::ElementArray, None),
            ]
        );
        assert_eq!(geometry.state(), LinkState::Linked(program()));
    }

    #[test]
    fn absent_attribute_does_not_shift_later_offsets() {
        let ctx = RecordingContext::new();
        let mut geometry = GeometryBuffer::new();
        let buffer = geometry.upload(&ctx, &[0.0f32; 16], BufferUsage::Static).unwrap();
        let vao = geometry.create_vertex_array(&ctx).unwrap();
        let layout = BufferLayout::new(buffer)
            .attribute(AttributeLayout::new(0, 3))
            .attribute(AttributeLayout::new(-1, 3))
            .attribute(AttributeLayout::new(2, 2));

        geometry.assemble(&ctx, program(), vao, &[layout], None).unwrap();
        let offset = ctx.calls().into_iter().find_map(|c| match c {
            GlCall::VertexAttribPointer { index: 2, stride, offset, .. } => Some((stride, offset)),
            _ => None,
        });
        assert_eq!(offset, Some((0, 12)));
    }

    #[test]
    fn failed_index_upload_still_unbinds_everything() {
        let ctx = RecordingContext::new().with_object_limit(ObjectKind::Buffer, 1);
        let mut geometry = GeometryBuffer::new();
        let buffer = geometry.upload(&ctx, &[0.0f32; 12], BufferUsage::Static).unwrap();
        let vao = geometry.create_vertex_array(&ctx).unwrap();
        ctx.take_calls();

        let result = geometry.assemble(
            &ctx,
            program(),
            vao,
            &[BufferLayout::single(buffer, AttributeLayout::new(0, 3))],
            Some(&[0, 1, 2]),
        );
        assert!(matches!(result, Err(GlError::ObjectCreation("buffer"))));
        let calls = ctx.calls();
        assert_eq!(
            calls[calls.len() - 3..],
            [
                GlCall::BindVertexArray(None),
                GlCall::BindBuffer(BufferTarget::Array, None),
                GlCall::BindBuffer(BufferTarget::ElementArray, None),
            ]
        );
        assert_eq!(geometry.state(), LinkState::Unlinked);
        assert_eq!(geometry.index_count(), 0);
        assert_eq!(ctx.bound_vertex_array(), None);
    }

    #[test]
    fn link_mesh_releases_objects_on_failure() {
        let ctx = RecordingContext::new().with_attribute("i_Position", gl::FLOAT_VEC3, 0);
        let result = GeometryBuffer::link_mesh(&ctx, &MeshData::new(vec![0.0; 10], 5), program());
        assert!(matches!(result, Err(GlError::InvalidLayout(_))));
        assert_eq!(ctx.live_objects(), 0);

        let ctx = RecordingContext::new()
            .with_attribute("i_Position", gl::FLOAT_VEC3, 0)
            .with_object_limit(ObjectKind::VertexArray, 0);
        let result = GeometryBuffer::link_mesh(&ctx, &MeshData::quad(), program());
        assert!(matches!(result, Err(GlError::ObjectCreation("vertex array"))));
        assert_eq!(ctx.live_objects(), 0);
    }

    #[test]
    fn state_keeps_the_program_of_the_drawn_vertex_array() {
        let ctx = RecordingContext::new();
        let mut geometry = GeometryBuffer::new();
        let first = geometry.create_vertex_array(&ctx).unwrap();
        let second = geometry.create_vertex_array(&ctx).unwrap();
        let other = Program::from_raw(100).unwrap();

        geometry.assemble(&ctx, program(), first, &[], None).unwrap();
        geometry.assemble(&ctx, other, second, &[], None).unwrap();
        assert_eq!(geometry.state(), LinkState::Linked(program()));

        ctx.take_calls();
        geometry.bind(&ctx).unwrap();
        assert_eq!(ctx.calls(), vec![GlCall::BindVertexArray(Some(first))]);
    }

    #[test]
    fn indices_are_captured_while_the_vertex_array_is_bound() {
        let ctx = RecordingContext::new();
        let mut geometry = GeometryBuffer::new();
        let buffer = geometry.upload(&ctx, &[0.0f32; 12], BufferUsage::Static).unwrap();
        let vao = geometry.create_vertex_array(&ctx).unwrap();
        ctx.take_calls();

        geometry
            .assemble(
                &ctx,
                program(),
                vao,
                &[BufferLayout::single(buffer, AttributeLayout::new(0, 3))],
                Some(&[0, 2, 1, 0, 3, 2]),
            )
            .unwrap();

        let calls = ctx.calls();
        let upload = calls
            .iter()
            .position(|c| {
                *c == GlCall::BufferData {
                    target: BufferTarget::ElementArray,
                    len: 12,
                    usage: BufferUsage::Static,
                }
            })
            .unwrap();
        let unbind_vao = calls
            .iter()
            .position(|c| *c == GlCall::BindVertexArray(None))
            .unwrap();
        assert!(upload < unbind_vao);
        assert_eq!(geometry.index_count(), 6);
        assert_eq!(geometry.buffers().len(), 2);
    }

    #[test]
    fn state_machine_rejects_misuse() {
        let ctx = RecordingContext::new();
        let mut geometry = GeometryBuffer::new();
        assert!(geometry.draw(&ctx, DrawMode::Triangles).is_err());

        let vao = geometry.create_vertex_array(&ctx).unwrap();
        geometry.assemble(&ctx, program(), vao, &[], None).unwrap();
        assert!(matches!(
            geometry.assemble(&ctx, program(), vao, &[], None),
            Err(GlError::GeometryState(_))
        ));

        let mut other = GeometryBuffer::new();
        let foreign = other.create_vertex_array(&ctx).unwrap();
        assert!(geometry.assemble(&ctx, program(), foreign, &[], None).is_err());

        geometry.destroy(&ctx);
        assert!(geometry.upload(&ctx, &[1.0f32], BufferUsage::Static).is_err());
        assert!(geometry.draw(&ctx, DrawMode::Triangles).is_err());
    }

    #[test]
    fn destroy_releases_buffers_and_vertex_arrays_once() {
        let ctx = RecordingContext::new().with_attribute("i_Position", gl::FLOAT_VEC3, 0);
        let mut geometry = GeometryBuffer::link_mesh(&ctx, &MeshData::quad(), program()).unwrap();
        assert_eq!(ctx.live_objects(), 5);

        geometry.destroy(&ctx);
        assert_eq!(ctx.live_objects(), 0);
        assert_eq!(geometry.state(), LinkState::Destroyed);

        ctx.take_calls();
        geometry.destroy(&ctx);
        assert!(ctx.calls().is_empty());
    }

    #[test]
    fn draw_uses_element_draws_for_indexed_geometry() {
        let ctx = RecordingContext::new().with_attribute("i_Position", gl::FLOAT_VEC3, 0);
        let quad = GeometryBuffer::link_mesh(&ctx, &MeshData::quad(), program()).unwrap();
        let screen = GeometryBuffer::link_mesh(&ctx, &MeshData::screen_quad(), program()).unwrap();
        ctx.take_calls();

        quad.draw(&ctx, DrawMode::Triangles).unwrap();
        screen.draw_instanced(&ctx, DrawMode::Triangles, 3).unwrap();
        assert_eq!(
            ctx.calls(),
            vec![
                GlCall::BindVertexArray(quad.vao()),
                GlCall::DrawElements {
                    mode: DrawMode::Triangles,
                    count: 6,
                    element_type: gl::UNSIGNED_SHORT,
                    offset: 0,
                },
                GlCall::BindVertexArray(None),
                GlCall::BindVertexArray(screen.vao()),
                GlCall::DrawArraysInstanced {
                    mode: DrawMode::Triangles,
                    first: 0,
                    count: 6,
                    instances: 3,
                },
                GlCall::BindVertexArray(None),
            ]
        );
    }
}
