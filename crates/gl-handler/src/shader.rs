//! Shader compilation and program linking.

use tracing::{debug, warn};

use crate::context::{GlContext, Program, Shader, ShaderStage};
use crate::error::{GlError, Result};

/// Source text for a vertex/fragment program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
    /// Varyings captured by transform feedback, interleaved into one buffer.
    pub feedback_varyings: Vec<String>,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            feedback_varyings: Vec::new(),
        }
    }

    pub fn with_feedback_varyings<I, S>(mut self, varyings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feedback_varyings = varyings.into_iter().map(Into::into).collect();
        self
    }

    /// Compile both stages and link them into a program.
    ///
    /// Nothing is left behind on failure. On success the stage objects are
    /// already deleted; the program keeps them alive as long as it needs.
    pub fn link(&self, ctx: &dyn GlContext) -> Result<Program> {
        let vertex = compile(ctx, ShaderStage::Vertex, &self.vertex)?;
        let fragment = match compile(ctx, ShaderStage::Fragment, &self.fragment) {
            Ok(fragment) => fragment,
            Err(err) => {
                ctx.delete_shader(vertex);
                return Err(err);
            }
        };

        let result = link_program(ctx, vertex, fragment, &self.feedback_varyings);
        ctx.delete_shader(vertex);
        ctx.delete_shader(fragment);
        result
    }
}

fn compile(ctx: &dyn GlContext, stage: ShaderStage, source: &str) -> Result<Shader> {
    let shader = ctx
        .create_shader(stage)
        .ok_or(GlError::ObjectCreation("shader"))?;
    ctx.shader_source(shader, source);
    ctx.compile_shader(shader);

    if !ctx.shader_compile_status(shader) {
        let log = ctx.shader_info_log(shader);
        ctx.delete_shader(shader);
        warn!(%stage, %log, "shader compilation failed");
        return Err(GlError::CompileFailure { stage, log });
    }
    Ok(shader)
}

fn link_program(
    ctx: &dyn GlContext,
    vertex: Shader,
    fragment: Shader,
    feedback_varyings: &[String],
) -> Result<Program> {
    let program = ctx.create_program().ok_or(GlError::ObjectCreation("program"))?;
    ctx.attach_shader(program, vertex);
    ctx.attach_shader(program, fragment);
    if !feedback_varyings.is_empty() {
        let varyings: Vec<&str> = feedback_varyings.iter().map(String::as_str).collect();
        ctx.transform_feedback_varyings(program, &varyings);
    }
    ctx.link_program(program);

    if !ctx.program_link_status(program) {
        let log = ctx.program_info_log(program);
        ctx.delete_program(program);
        warn!(%log, "program link failed");
        return Err(GlError::LinkFailure { log });
    }
    debug!(program = program.raw(), "linked program");
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{GlCall, RecordingContext};

    const VS: &str = "#version 300 es\nvoid main() { gl_Position = vec4(0.0); }";
    const FS: &str = "#version 300 es\nprecision mediump float;\nout vec4 o;\nvoid main() { o = vec4(1.0); }";

    #[test]
    fn linked_program_leaves_no_shader_objects() {
        let ctx = RecordingContext::new();
        let program = ShaderSources::new(VS, FS).link(&ctx).unwrap();
        assert!(ctx.is_live(program.raw()));
        assert_eq!(ctx.live_objects(), 1);
    }

    #[test]
    fn compile_failure_reports_stage_and_log() {
        let ctx = RecordingContext::new().failing_compile(ShaderStage::Fragment, "0:3: syntax error");
        let err = ShaderSources::new(VS, FS).link(&ctx).unwrap_err();
        assert_eq!(
            err,
            GlError::CompileFailure {
                stage: ShaderStage::Fragment,
                log: "0:3: syntax error".into(),
            }
        );
        assert_eq!(ctx.live_objects(), 0);
        assert!(!ctx
            .calls()
            .iter()
            .any(|c| matches!(c, GlCall::CreateProgram(_))));
    }

    #[test]
    fn link_failure_deletes_everything() {
        let ctx = RecordingContext::new().failing_link("varying mismatch");
        let err = ShaderSources::new(VS, FS).link(&ctx).unwrap_err();
        assert_eq!(err, GlError::LinkFailure { log: "varying mismatch".into() });
        assert_eq!(ctx.live_objects(), 0);
    }

    #[test]
    fn feedback_varyings_are_registered_before_linking() {
        let ctx = RecordingContext::new();
        let program = ShaderSources::new(VS, FS)
            .with_feedback_varyings(["v_position", "v_velocity"])
            .link(&ctx)
            .unwrap();

        let calls = ctx.calls();
        let varyings = calls
            .iter()
            .position(|c| matches!(c, GlCall::TransformFeedbackVaryings { .. }))
            .unwrap();
        let link = calls
            .iter()
            .position(|c| *c == GlCall::LinkProgram(program))
            .unwrap();
        assert!(varyings < link);
        assert_eq!(
            calls[varyings],
            GlCall::TransformFeedbackVaryings {
                program,
                varyings: vec!["v_position".into(), "v_velocity".into()],
            }
        );
    }
}
