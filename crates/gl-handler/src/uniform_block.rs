//! Uniform buffer objects backing a program's uniform block.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::bytes::AsBytes;
use crate::context::{Buffer, BufferTarget, BufferUsage, GlContext, Program};
use crate::error::{GlError, Result};

/// A dynamic uniform buffer bound to one block of one program.
///
/// Members are addressed by name and written at the byte offsets the driver
/// reported for them.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    name: String,
    buffer: Buffer,
    binding_point: u32,
    data_size: i32,
    offsets: HashMap<String, i32>,
}

impl UniformBlock {
    /// Allocate a buffer sized for `block`, attach it to `binding_point` and
    /// bind the block to that point.
    ///
    /// Leaves the uniform buffer target unbound.
    pub fn create(
        ctx: &dyn GlContext,
        program: Program,
        block: &str,
        members: &[&str],
        binding_point: u32,
    ) -> Result<Self> {
        let block_index = ctx
            .uniform_block_index(program, block)
            .ok_or_else(|| GlError::MissingUniformBlock(block.to_string()))?;
        let data_size = ctx.uniform_block_data_size(program, block_index);

        let indices = ctx
            .uniform_indices(program, members)
            .into_iter()
            .zip(members)
            .map(|(index, member)| {
                index.ok_or_else(|| GlError::MissingBlockMember {
                    block: block.to_string(),
                    member: member.to_string(),
                })
            })
            .collect::<Result<Vec<u32>>>()?;
        let offsets = members
            .iter()
            .map(|m| m.to_string())
            .zip(ctx.uniform_offsets(program, &indices))
            .collect();

        let buffer = ctx.gen_buffer().ok_or(GlError::ObjectCreation("uniform buffer"))?;
        ctx.bind_buffer(BufferTarget::Uniform, Some(buffer));
        ctx.buffer_data_size(BufferTarget::Uniform, data_size, BufferUsage::Dynamic);
        ctx.bind_buffer(BufferTarget::Uniform, None);
        ctx.bind_buffer_base(BufferTarget::Uniform, binding_point, Some(buffer));
        ctx.uniform_block_binding(program, block_index, binding_point);

        debug!(block, binding_point, data_size, "created uniform block buffer");
        Ok(Self {
            name: block.to_string(),
            buffer,
            binding_point,
            data_size,
            offsets,
        })
    }

    /// Write named members. Names the block was not created with are skipped.
    pub fn write<'a, T, I>(&self, ctx: &dyn GlContext, values: I)
    where
        T: AsBytes + 'a,
        I: IntoIterator<Item = (&'a str, &'a T)>,
    {
        ctx.bind_buffer(BufferTarget::Uniform, Some(self.buffer));
        for (member, value) in values {
            match self.offsets.get(member) {
                Some(&offset) => ctx.buffer_sub_data(BufferTarget::Uniform, offset, value.as_bytes()),
                None => trace!(block = %self.name, member, "unknown block member, skipping"),
            }
        }
        ctx.bind_buffer(BufferTarget::Uniform, None);
    }

    pub fn offset(&self, member: &str) -> Option<i32> {
        self.offsets.get(member).copied()
    }

    pub fn buffer(&self) -> Buffer {
        self.buffer
    }

    pub fn binding_point(&self) -> u32 {
        self.binding_point
    }

    pub fn data_size(&self) -> i32 {
        self.data_size
    }

    pub fn destroy(self, ctx: &dyn GlContext) {
        ctx.delete_buffer(self.buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{GlCall, RecordingContext};

    fn scripted() -> RecordingContext {
        RecordingContext::new().with_uniform_block("Light", 32, &[("position", 0), ("colour", 16)])
    }

    #[test]
    fn create_sizes_buffer_and_binds_block() {
        let ctx = scripted();
        let program = Program::from_raw(40).unwrap();
        let block = UniformBlock::create(&ctx, program, "Light", &["position", "colour"], 2).unwrap();

        assert_eq!(block.offset("colour"), Some(16));
        let calls = ctx.calls();
        assert!(calls.contains(&GlCall::BufferData {
            target: BufferTarget::Uniform,
            len: 32,
            usage: BufferUsage::Dynamic,
        }));
        assert!(calls.contains(&GlCall::BindBufferBase {
            target: BufferTarget::Uniform,
            index: 2,
            buffer: Some(block.buffer()),
        }));
        assert!(calls.contains(&GlCall::UniformBlockBinding {
            program,
            block_index: 0,
            binding_point: 2,
        }));
    }

    #[test]
    fn write_places_members_at_their_offsets() {
        let ctx = scripted();
        let block = UniformBlock::create(&ctx, Program::from_raw(40).unwrap(), "Light", &["position", "colour"], 0)
            .unwrap();
        let colour = [0.25f32, 0.5, 0.75, 1.0];
        block.write(&ctx, [("colour", &colour), ("missing", &colour)]);

        let contents = ctx.buffer_contents(block.buffer()).unwrap();
        assert_eq!(&contents[..16], &[0u8; 16]);
        assert_eq!(&contents[16..], colour.as_bytes());
        assert_eq!(ctx.bound_buffer(BufferTarget::Uniform), None);
    }

    #[test]
    fn missing_block_and_member_are_errors() {
        let ctx = scripted();
        let program = Program::from_raw(40).unwrap();
        assert_eq!(
            UniformBlock::create(&ctx, program, "Material", &[], 0).unwrap_err(),
            GlError::MissingUniformBlock("Material".into())
        );
        assert_eq!(
            UniformBlock::create(&ctx, program, "Light", &["radius"], 0).unwrap_err(),
            GlError::MissingBlockMember {
                block: "Light".into(),
                member: "radius".into(),
            }
        );
    }
}
