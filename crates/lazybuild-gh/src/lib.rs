//! GitHub Actions plumbing for lazybuild: reading `INPUT_*` variables into
//! a [`BuildConfig`](lazybuild_core::BuildConfig) and writing results back as
//! step outputs.

use anyhow::Result;
use tracing::instrument;

use lazybuild_core::constants::{
    OUTPUT_BUILD_CONTEXTS, OUTPUT_BUILD_REQUIRED, OUTPUT_CONTEXT, OUTPUT_IMAGE_NAME,
    OUTPUT_IMAGE_NAME_TAG, OUTPUT_IMAGE_TAG, OUTPUT_TAGS, OUTPUT_TAG_EXISTED, OUTPUT_TMPDIR,
};
use lazybuild_core::{BuildDecision, Sandbox};

pub mod inputs;
pub mod outputs;

pub use inputs::{build_config, sandbox_request, EnvInputs, InputSource, MapInputs};
pub use outputs::{OutputSink, OutputValue};

/// Writes every decision output.
#[instrument(skip_all)]
pub fn emit_decision(sink: &mut OutputSink, decision: &BuildDecision) -> Result<()> {
    sink.set_output(OUTPUT_TAGS, decision.tags.clone())?;
    sink.set_output(OUTPUT_TAG_EXISTED, decision.tag_existed)?;
    sink.set_output(OUTPUT_BUILD_REQUIRED, decision.build_required)?;
    sink.set_output(OUTPUT_IMAGE_NAME, decision.image_name.as_str())?;
    sink.set_output(OUTPUT_IMAGE_TAG, decision.image_tag.as_str())?;
    sink.set_output(OUTPUT_IMAGE_NAME_TAG, decision.image_name_tag.as_str())?;
    Ok(())
}

/// Writes the locations of a prepared sandbox.
#[instrument(skip_all)]
pub fn emit_sandbox(sink: &mut OutputSink, sandbox: &Sandbox) -> Result<()> {
    sink.set_output(OUTPUT_TMPDIR, sandbox.root.display().to_string())?;
    sink.set_output(OUTPUT_CONTEXT, sandbox.context.display().to_string())?;
    sink.set_output(
        OUTPUT_BUILD_CONTEXTS,
        OutputValue::List(sandbox.build_context_lines()),
    )?;
    Ok(())
}
