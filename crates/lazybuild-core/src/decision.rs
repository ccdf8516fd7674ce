use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::BuildConfig;
use crate::error::Result;
use crate::fingerprint::compute_fingerprint;
use crate::tags::{parse_tag_specs, resolve_tags};

/// Answers whether an image reference (`name:tag`) already exists.
///
/// Implementations decide where to look; any failure to find out must be
/// reported as `false` so that an inconclusive answer leads to a rebuild.
pub trait ImageProbe {
    fn exists(&self, name_tag: &str) -> bool;
}

impl<F> ImageProbe for F
where
    F: Fn(&str) -> bool,
{
    fn exists(&self, name_tag: &str) -> bool {
        self(name_tag)
    }
}

/// The outcome of a single invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildDecision {
    /// Every `name:tag` the built image should carry.
    pub tags: Vec<String>,
    /// Whether any content tag was already present.
    pub tag_existed: bool,
    pub build_required: bool,
    /// Name of the first declared image.
    pub image_name: String,
    /// The content tag, identical for every image name.
    pub image_tag: String,
    pub image_name_tag: String,
}

/// Fingerprints the configured inputs and checks whether a build is needed.
///
/// Tag declarations are validated before any file is read. Every content tag
/// is probed; finding any one of them is enough to skip the build.
#[instrument(skip_all)]
pub fn decide(config: &BuildConfig, probe: &dyn ImageProbe) -> Result<BuildDecision> {
    let specs = parse_tag_specs(&config.tags)?;

    let fingerprint = compute_fingerprint(
        &config.base_dir,
        &config.docker,
        &config.dockerfile(),
        &config.extra_files,
    )?;
    let images = resolve_tags(&specs, &fingerprint)?;

    let mut tag_existed = false;
    for name_tag in images.content_tags() {
        let exists = probe.exists(&name_tag);
        debug!("image {} exists: {}", name_tag, exists);
        tag_existed |= exists;
    }

    // resolve_tags guarantees at least one name.
    let image_name = images.names().next().unwrap_or_default().to_string();
    let image_tag = fingerprint.to_string();
    let image_name_tag = format!("{image_name}:{image_tag}");

    info!(
        "{} at {}: {}",
        image_name,
        image_tag,
        if tag_existed { "up to date" } else { "build required" }
    );

    Ok(BuildDecision {
        tags: images.all_tags(),
        tag_existed,
        build_required: !tag_existed,
        image_name,
        image_tag,
        image_name_tag,
    })
}
