//! Core logic for lazybuild.
//!
//! This crate computes the content fingerprint of a docker build, merges it
//! into the requested image tags, decides whether a build is required and
//! stages build inputs into a sandbox.

pub mod config;
pub mod constants;
pub mod decision;
pub mod error;
pub mod fingerprint;
pub mod inputs;
pub mod sandbox;
pub mod tags;

pub use config::BuildConfig;
pub use decision::{decide, BuildDecision, ImageProbe};
pub use error::{Error, Result};
pub use fingerprint::{compute_fingerprint, Fingerprint, FingerprintHasher};
pub use inputs::{quoted, split_list, DockerInputs, DOCKER_INPUTS};
pub use sandbox::{prepare_sandbox, Sandbox, SandboxRequest};
pub use tags::{parse_tag_specs, resolve_tags, ImageTagSet, TagSpec};
