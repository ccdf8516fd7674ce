//! Writing step outputs through the `GITHUB_OUTPUT` file protocol.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use lazybuild_core::quoted;
use tracing::info;
use uuid::Uuid;

/// A single output value as the workflow sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl OutputValue {
    /// Text form: flags as `true`/`false`, lists joined by newlines.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Flag(true) => "true".to_string(),
            Self::Flag(false) => "false".to_string(),
            Self::List(items) => items.join("\n"),
        }
    }
}

impl From<&str> for OutputValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OutputValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for OutputValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for OutputValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Collects outputs, logging each one and appending it to the runner's
/// output file when there is one.
#[derive(Debug, Default)]
pub struct OutputSink {
    github_output: Option<PathBuf>,
    recorded: Vec<(String, String)>,
}

impl OutputSink {
    /// A sink that only logs.
    pub fn log_only() -> Self {
        Self::default()
    }

    /// A sink that appends to `path` using the delimited protocol.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            github_output: Some(path.into()),
            recorded: Vec::new(),
        }
    }

    /// Picks the sink from the runner environment. Outside GitHub Actions
    /// outputs are only logged.
    ///
    /// # Errors
    /// Fails when running inside Actions without `GITHUB_OUTPUT` set.
    pub fn from_env() -> Result<Self> {
        let in_actions = std::env::var("GITHUB_ACTIONS")
            .map(|v| !v.is_empty())
            .unwrap_or(false);
        if !in_actions {
            return Ok(Self::log_only());
        }

        let path = std::env::var("GITHUB_OUTPUT")
            .context("GITHUB_OUTPUT must be set when running in GitHub Actions")?;
        Ok(Self::to_file(path))
    }

    pub fn set_output(&mut self, name: &str, value: impl Into<OutputValue>) -> Result<()> {
        let value = value.into().render();
        info!("Output: {}={}", name, quoted(&value));

        if let Some(path) = &self.github_output {
            // A fresh delimiter per value lets the value span several lines.
            let delimiter = format!("gh-delim-{}", Uuid::new_v4());
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open output file '{}'", path.display()))?;
            writeln!(file, "{name}<<{delimiter}\n{value}\n{delimiter}")
                .with_context(|| format!("failed to write output file '{}'", path.display()))?;
        }

        self.recorded.push((name.to_string(), value));
        Ok(())
    }

    /// Outputs set so far, in the order they were set.
    pub fn recorded(&self) -> &[(String, String)] {
        &self.recorded
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.recorded
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}
