use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::normalize;
use crate::constants::{CONTENT_HASH_PREFIX, HASH_CHUNK_SIZE};
use crate::error::{Error, Result};
use crate::inputs::{quoted, DockerInputs};

/// A content tag of the form `content-hash-<hex sha256>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wraps an already computed hex digest.
    pub fn from_digest(digest: &str) -> Self {
        Self(format!("{CONTENT_HASH_PREFIX}{digest}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare hex digest without the `content-hash-` prefix.
    pub fn digest(&self) -> &str {
        &self.0[CONTENT_HASH_PREFIX.len()..]
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Streams the canonical fingerprint layout into a SHA-256 hasher.
///
/// The byte layout is a compatibility contract, any change here changes
/// every content tag ever produced:
///
/// ```text
/// docker:<name>=<quoted value>\n            (per input, sorted by name)
/// file:<path>\n----\n<file bytes>\n----\n   (per file, sorted by path)
/// ```
#[derive(Debug, Default)]
pub struct FingerprintHasher {
    hasher: Sha256,
}

impl FingerprintHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mix_input(&mut self, name: &str, value: &str) {
        self.hasher
            .update(format!("docker:{name}={}\n", quoted(value)).as_bytes());
    }

    /// Mixes in the file `path`, read from `base_dir`. Only `path` itself is
    /// written into the stream, so the same tree hashes identically wherever
    /// it is checked out.
    pub fn mix_file(&mut self, base_dir: &Path, path: &Path) -> Result<()> {
        let source_path = base_dir.join(path);
        let read_error = |source| Error::InputRead {
            path: source_path.clone(),
            source,
        };

        // Open before writing the header so a missing file leaves nothing behind.
        let mut file = File::open(&source_path).map_err(read_error)?;

        self.hasher.update(b"file:");
        self.hasher.update(path.as_os_str().as_encoded_bytes());
        self.hasher.update(b"\n----\n");

        let mut buf = [0u8; HASH_CHUNK_SIZE];
        let mut total = 0usize;
        loop {
            let n = file.read(&mut buf).map_err(read_error)?;
            if n == 0 {
                break;
            }
            self.hasher.update(&buf[..n]);
            total += n;
        }

        self.hasher.update(b"\n----\n");
        debug!("fingerprint: mixed {} ({} bytes)", path.display(), total);
        Ok(())
    }

    pub fn finish(self) -> Fingerprint {
        Fingerprint::from_digest(&hex::encode(self.hasher.finalize()))
    }
}

/// Computes the content tag for the given docker inputs and files.
///
/// The Dockerfile always takes part. Files are normalised, sorted and
/// deduplicated, so the order they were declared in never matters. Relative
/// paths are resolved against `base_dir`; an empty `base_dir` means the
/// current directory.
pub fn compute_fingerprint(
    base_dir: &Path,
    inputs: &DockerInputs,
    dockerfile: &Path,
    extra_files: &[PathBuf],
) -> Result<Fingerprint> {
    let mut hasher = FingerprintHasher::new();

    for (name, value) in inputs.sorted_entries() {
        hasher.mix_input(name, value);
    }

    let mut files: Vec<PathBuf> = extra_files
        .iter()
        .map(|p| normalize(p))
        .chain(std::iter::once(normalize(dockerfile)))
        .collect();
    files.sort();
    files.dedup();

    for file in &files {
        hasher.mix_file(base_dir, file)?;
    }

    let fingerprint = hasher.finish();
    debug!(
        "fingerprint: {} over {} file(s)",
        fingerprint,
        files.len()
    );
    Ok(fingerprint)
}
