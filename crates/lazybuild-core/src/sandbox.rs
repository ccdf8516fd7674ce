//! Staging of build inputs into an isolated directory.
//!
//! Only the declared inputs end up in the sandbox, so a build run from it
//! cannot depend on files the fingerprint never saw.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument};

use crate::config::normalize;
use crate::constants::{DOCKERFILE, DOCKERIGNORE};
use crate::error::{Error, Result};

/// What to stage, gathered from the action inputs.
#[derive(Debug, Clone, Default)]
pub struct SandboxRequest {
    pub context: PathBuf,
    /// Whether an explicit Dockerfile was configured. When it was, the
    /// caller lists it in `extra_inputs` itself.
    pub file_given: bool,
    pub extra_inputs: Vec<PathBuf>,
    pub build_contexts: Vec<(String, PathBuf)>,
}

/// A prepared sandbox and the locations inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    pub root: PathBuf,
    pub context: PathBuf,
    pub build_contexts: Vec<(String, PathBuf)>,
}

impl Sandbox {
    /// Build contexts rendered as `name=path` lines.
    pub fn build_context_lines(&self) -> Vec<String> {
        self.build_contexts
            .iter()
            .map(|(name, path)| format!("{}={}", name, path.display()))
            .collect()
    }
}

/// Parses `name=path` lines. Lines without a name or without `=` are skipped.
pub fn parse_build_contexts(raw: &str) -> Vec<(String, PathBuf)> {
    raw.lines()
        .filter_map(|line| {
            let (name, path) = line.split_once('=')?;
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), PathBuf::from(path)))
        })
        .collect()
}

/// Where `path` lands inside `root`. Root, prefix and `..` segments are
/// dropped so nothing can be written outside the sandbox.
pub fn sandboxed(root: &Path, path: &Path) -> PathBuf {
    let mut out = root.to_path_buf();
    for component in path.components() {
        if let Component::Normal(part) = component {
            out.push(part);
        }
    }
    out
}

/// Copies every path (relative to `base_dir`) into `root`, keeping its
/// relative location. Directories are copied recursively, following symlinks.
pub fn stage_paths(base_dir: &Path, paths: &[PathBuf], root: &Path) -> Result<()> {
    for path in paths {
        let source = base_dir.join(path);
        let target = sandboxed(root, path);

        if source.is_dir() {
            copy_dir(&source, &target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| sandbox_error(parent, e))?;
            }
            fs::copy(&source, &target).map_err(|e| sandbox_error(&source, e))?;
        }
        debug!("sandbox: staged {}", path.display());
    }
    Ok(())
}

fn copy_dir(source: &Path, target: &Path) -> Result<()> {
    fs::create_dir_all(target).map_err(|e| sandbox_error(target, e))?;
    let entries = fs::read_dir(source).map_err(|e| sandbox_error(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| sandbox_error(source, e))?;
        let from = entry.path();
        let to = target.join(entry.file_name());
        if from.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| sandbox_error(&from, e))?;
        }
    }
    Ok(())
}

fn sandbox_error(path: &Path, source: std::io::Error) -> Error {
    Error::Sandbox {
        path: path.to_path_buf(),
        source,
    }
}

/// Stages the declared inputs into `root` and reports where things ended up.
///
/// `context/Dockerfile` is staged unless an explicit file was given, and
/// `context/.dockerignore` whenever it exists.
#[instrument(skip(request))]
pub fn prepare_sandbox(base_dir: &Path, request: &SandboxRequest, root: &Path) -> Result<Sandbox> {
    let context = normalize(&request.context);

    let mut paths: Vec<PathBuf> = request.extra_inputs.iter().map(|p| normalize(p)).collect();
    if !request.file_given {
        paths.push(normalize(&context.join(DOCKERFILE)));
    }
    let dockerignore = normalize(&context.join(DOCKERIGNORE));
    if base_dir.join(&dockerignore).exists() {
        paths.push(dockerignore);
    }

    stage_paths(base_dir, &paths, root)?;

    Ok(Sandbox {
        root: root.to_path_buf(),
        context: sandboxed(root, &context),
        build_contexts: request
            .build_contexts
            .iter()
            .map(|(name, path)| (name.clone(), sandboxed(root, path)))
            .collect(),
    })
}
