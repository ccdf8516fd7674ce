//! Reading action inputs.

use std::collections::HashMap;
use std::path::PathBuf;

use lazybuild_core::constants::{
    INPUT_BUILD_CONTEXTS, INPUT_CONTEXT, INPUT_EXTRA_INPUTS, INPUT_FILE, INPUT_TAGS,
};
use lazybuild_core::sandbox::parse_build_contexts;
use lazybuild_core::{split_list, BuildConfig, DockerInputs, Error, SandboxRequest};
use tracing::debug;

/// A source of raw input values, keyed by their logical name.
pub trait InputSource {
    fn raw(&self, name: &str) -> Option<String>;
}

/// Inputs passed by the runner as `INPUT_<NAME>` environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvInputs;

impl InputSource for EnvInputs {
    fn raw(&self, name: &str) -> Option<String> {
        std::env::var(env_name(name)).ok()
    }
}

/// In-memory inputs, keyed by logical name.
#[derive(Debug, Default, Clone)]
pub struct MapInputs(pub HashMap<String, String>);

impl MapInputs {
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }
}

impl InputSource for MapInputs {
    fn raw(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// Environment variable carrying input `name`: spaces become underscores and
/// the result is upper-cased. Hyphens are kept, so `build-args` is read from
/// `INPUT_BUILD-ARGS`.
pub fn env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Reads and trims an input. Absent inputs read as an empty string.
///
/// # Errors
/// `MissingInput` when `required` is set and the trimmed value is empty.
pub fn get_input(source: &dyn InputSource, name: &str, required: bool) -> Result<String, Error> {
    let value = source.raw(name).unwrap_or_default().trim().to_string();
    if required && value.is_empty() {
        return Err(Error::missing_input(name));
    }
    Ok(value)
}

/// Reads a list-valued input, see [`split_list`].
pub fn get_input_list(
    source: &dyn InputSource,
    name: &str,
    required: bool,
) -> Result<Vec<String>, Error> {
    Ok(split_list(&get_input(source, name, required)?))
}

fn optional_path(source: &dyn InputSource, name: &str) -> Result<Option<PathBuf>, Error> {
    let value = get_input(source, name, false)?;
    Ok((!value.is_empty()).then(|| PathBuf::from(value)))
}

/// Builds the configuration for a decision run.
///
/// # Errors
/// `MissingInput("tags")` when no tags were declared.
pub fn build_config(source: &dyn InputSource) -> Result<BuildConfig, Error> {
    let tags = get_input_list(source, INPUT_TAGS, true)?;

    // Reading an optional input cannot fail.
    let docker = DockerInputs::from_lookup(|name| {
        get_input(source, name, false).unwrap_or_default()
    });

    let cfg = BuildConfig {
        tags,
        context: optional_path(source, INPUT_CONTEXT)?,
        file: optional_path(source, INPUT_FILE)?,
        docker,
        ..Default::default()
    };
    debug!("config from inputs: {:?}", cfg);
    Ok(cfg)
}

/// Builds the staging request for the sandbox command.
///
/// `extra-inputs` is whitespace separated, `build-contexts` holds one
/// `name=path` pair per line. An explicit `file` is staged as well.
pub fn sandbox_request(source: &dyn InputSource) -> Result<SandboxRequest, Error> {
    let context = optional_path(source, INPUT_CONTEXT)?.unwrap_or_else(|| PathBuf::from("."));
    let file = optional_path(source, INPUT_FILE)?;

    let mut extra_inputs: Vec<PathBuf> = get_input(source, INPUT_EXTRA_INPUTS, false)?
        .split_whitespace()
        .map(PathBuf::from)
        .collect();
    if let Some(file) = &file {
        extra_inputs.push(file.clone());
    }

    Ok(SandboxRequest {
        context,
        file_given: file.is_some(),
        extra_inputs,
        build_contexts: parse_build_contexts(&get_input(source, INPUT_BUILD_CONTEXTS, false)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_name_follows_runner_convention() {
        assert_eq!(env_name("tags"), "INPUT_TAGS");
        assert_eq!(env_name("build-args"), "INPUT_BUILD-ARGS");
        assert_eq!(env_name("extra inputs"), "INPUT_EXTRA_INPUTS");
    }

    #[test]
    fn env_inputs_read_process_environment() {
        std::env::set_var("INPUT_LAZYBUILD-PROBE", "  value  ");
        let value = get_input(&EnvInputs, "lazybuild-probe", false).unwrap();
        std::env::remove_var("INPUT_LAZYBUILD-PROBE");
        assert_eq!(value, "value");
    }

    #[test]
    fn missing_required_input_names_it() {
        let err = get_input(&MapInputs::default(), "tags", true).expect_err("must fail");
        assert_eq!(err.to_string(), "Missing value for input 'tags'");
    }

    #[test]
    fn blank_required_input_is_missing() {
        let source = MapInputs::default().with("tags", "  \n ");
        assert!(get_input(&source, "tags", true).is_err());
    }

    #[test]
    fn build_config_reads_every_recognized_input() {
        let source = MapInputs::default()
            .with("tags", "user/app:latest, user/app:commit-abc\nuser/app:v1.2.3")
            .with("context", "app")
            .with("build-args", " A=1 ")
            .with("target", "runtime")
            .with("push", "true");

        let cfg = build_config(&source).unwrap();
        assert_eq!(cfg.tags.len(), 3);
        assert_eq!(cfg.docker.build_args, "A=1");
        assert_eq!(cfg.docker.target, "runtime");
        assert_eq!(cfg.docker.labels, "");
        assert_eq!(cfg.dockerfile(), PathBuf::from("app/Dockerfile"));
        assert_eq!(cfg.file, None);
    }

    #[test]
    fn build_config_requires_tags() {
        let source = MapInputs::default().with("target", "runtime");
        let err = build_config(&source).expect_err("must fail");
        assert!(matches!(err, Error::MissingInput { ref name } if name == "tags"));
    }

    #[test]
    fn sandbox_request_collects_inputs() {
        let source = MapInputs::default()
            .with("context", "app")
            .with("file", "docker/app.dockerfile")
            .with("extra-inputs", "app/src  Cargo.lock")
            .with("build-contexts", "base=images/base\nbroken");

        let request = sandbox_request(&source).unwrap();
        assert_eq!(request.context, PathBuf::from("app"));
        assert!(request.file_given);
        assert_eq!(
            request.extra_inputs,
            vec![
                PathBuf::from("app/src"),
                PathBuf::from("Cargo.lock"),
                PathBuf::from("docker/app.dockerfile"),
            ]
        );
        assert_eq!(request.build_contexts.len(), 1);
    }

    #[test]
    fn sandbox_request_defaults_to_current_context() {
        let request = sandbox_request(&MapInputs::default()).unwrap();
        assert_eq!(request.context, PathBuf::from("."));
        assert!(!request.file_given);
        assert!(request.extra_inputs.is_empty());
    }
}
