use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::constants::DOCKERFILE;
use crate::inputs::DockerInputs;

/// Everything a single invocation needs, gathered up front by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Raw `name[:tag]` declarations, already split into items.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Build context directory, `.` when unset.
    pub context: Option<PathBuf>,
    /// Explicit Dockerfile path, overriding `<context>/Dockerfile`.
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub docker: DockerInputs,
    /// Additional files folded into the fingerprint.
    #[serde(default)]
    pub extra_files: Vec<PathBuf>,
    /// Directory relative paths are read from. Empty means the working
    /// directory; never part of the fingerprint.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl BuildConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        let cfg = toml::from_str::<Self>(&text)
            .with_context(|| format!("failed to parse TOML config: {path}"))?;
        Ok(cfg)
    }

    /// The build context, `.` when none was configured.
    pub fn context_dir(&self) -> PathBuf {
        match &self.context {
            Some(context) if !context.as_os_str().is_empty() => normalize(context),
            _ => PathBuf::from("."),
        }
    }

    /// The Dockerfile that always takes part in the fingerprint.
    pub fn dockerfile(&self) -> PathBuf {
        match &self.file {
            Some(file) if !file.as_os_str().is_empty() => normalize(file),
            _ => normalize(&self.context_dir().join(DOCKERFILE)),
        }
    }
}

/// Lexically tidies a path: drops `.` segments, repeated and trailing
/// separators. `..` is kept as-is since resolving it needs the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let out: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}
