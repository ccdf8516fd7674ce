//! Constants used across the lazybuild workspace.

/// Prefix of every content tag, followed by the hex SHA-256 digest.
pub const CONTENT_HASH_PREFIX: &str = "content-hash-";

/// Dockerfile name looked up inside the build context.
pub const DOCKERFILE: &str = "Dockerfile";

/// Ignore file staged into the sandbox alongside the Dockerfile.
pub const DOCKERIGNORE: &str = ".dockerignore";

/// Chunk size used when streaming file contents into the hasher.
pub const HASH_CHUNK_SIZE: usize = 4096;

/// Input names understood by the action.
pub const INPUT_TAGS: &str = "tags";
pub const INPUT_CONTEXT: &str = "context";
pub const INPUT_FILE: &str = "file";
pub const INPUT_EXTRA_INPUTS: &str = "extra-inputs";
pub const INPUT_BUILD_CONTEXTS: &str = "build-contexts";

/// Output names written back to the workflow.
pub const OUTPUT_TAGS: &str = "tags";
pub const OUTPUT_TAG_EXISTED: &str = "tag-existed";
pub const OUTPUT_BUILD_REQUIRED: &str = "build-required";
pub const OUTPUT_IMAGE_NAME: &str = "image-name";
pub const OUTPUT_IMAGE_TAG: &str = "image-tag";
pub const OUTPUT_IMAGE_NAME_TAG: &str = "image-name-tag";
pub const OUTPUT_TMPDIR: &str = "tmpdir";
pub const OUTPUT_CONTEXT: &str = "context";
pub const OUTPUT_BUILD_CONTEXTS: &str = "build-contexts";
