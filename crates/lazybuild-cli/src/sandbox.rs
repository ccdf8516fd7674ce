use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, instrument};

use lazybuild_core::{prepare_sandbox, Sandbox, SandboxRequest};
use lazybuild_gh::{EnvInputs, OutputSink};

/// Runs the `sandbox` command: stages the declared inputs into a new
/// directory that outlives the process, then reports its locations.
#[instrument(skip(sink))]
pub fn run(sink: &mut OutputSink) -> Result<()> {
    let request = lazybuild_gh::sandbox_request(&EnvInputs)?;
    let root = create_root()?;
    let sandbox = stage(&request, &root)?;
    lazybuild_gh::emit_sandbox(sink, &sandbox)
}

fn create_root() -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix("lazybuild-")
        .tempdir()
        .context("failed to create sandbox directory")?;
    Ok(dir.keep())
}

fn stage(request: &SandboxRequest, root: &Path) -> Result<Sandbox> {
    let sandbox = prepare_sandbox(Path::new(""), request, root)?;
    info!(
        "sandbox ready at {} ({} input(s))",
        sandbox.root.display(),
        request.extra_inputs.len()
    );
    Ok(sandbox)
}
