use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures raised by the fingerprint, tag and sandbox logic.
#[derive(Debug, Error)]
pub enum Error {
    /// A structurally required input (only `tags` today) was absent or empty.
    #[error("Missing value for input '{name}'")]
    MissingInput { name: String },

    /// A file that contributes to the fingerprint could not be read.
    #[error("failed to read fingerprint input '{}'", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tag '{spec}': {reason}")]
    InvalidTagSpec { spec: String, reason: &'static str },

    #[error("failed to stage '{}' into sandbox", path.display())]
    Sandbox {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn missing_input(name: impl Into<String>) -> Self {
        Self::MissingInput { name: name.into() }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
