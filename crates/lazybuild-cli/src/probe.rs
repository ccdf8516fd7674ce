use std::process::{Command, Stdio};

use lazybuild_core::ImageProbe;
use tracing::{debug, warn};

/// Checks image existence with the docker CLI: the local image store first,
/// then the remote registry manifest.
///
/// Every failure, including a missing docker binary, reads as "does not
/// exist" so the caller falls back to building.
#[derive(Debug, Clone)]
pub struct DockerProbe {
    binary: String,
}

impl DockerProbe {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn inspect(&self, args: &[&str]) -> bool {
        let status = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) => {
                debug!("{} {} -> {}", self.binary, args.join(" "), status);
                status.success()
            }
            Err(e) => {
                warn!("failed to run '{}': {}", self.binary, e);
                false
            }
        }
    }
}

impl Default for DockerProbe {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ImageProbe for DockerProbe {
    fn exists(&self, name_tag: &str) -> bool {
        // Local first, mostly for developer machines; CI runners rarely have it.
        self.inspect(&["image", "inspect", name_tag])
            || self.inspect(&["manifest", "inspect", name_tag])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    /// Writes a fake docker that logs its arguments and succeeds only for
    /// the listed subcommand (`image` or `manifest`), or never when `None`.
    fn create_mock_docker(dir: &TempDir, succeed_on: Option<&str>) -> String {
        let script_path = dir.path().join("docker");
        let log_path = dir.path().join("calls.log");
        let script = format!(
            r#"#!/usr/bin/env sh
echo "$@" >> "{log}"
if [ "$1" = "{ok}" ]; then
    exit 0
fi
exit 1
"#,
            log = log_path.display(),
            ok = succeed_on.unwrap_or("never"),
        );
        fs::write(&script_path, script).unwrap();

        let mut perms = fs::metadata(&script_path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script_path, perms).unwrap();

        script_path.to_string_lossy().to_string()
    }

    fn calls(dir: &Path) -> Vec<String> {
        fs::read_to_string(dir.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(ToOwned::to_owned)
            .collect()
    }

    #[test]
    fn local_hit_skips_remote_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let probe = DockerProbe::new(create_mock_docker(&dir, Some("image")));

        assert!(probe.exists("user/app:content-hash-x"));
        assert_eq!(calls(dir.path()), vec!["image inspect user/app:content-hash-x"]);
    }

    #[test]
    fn falls_back_to_manifest_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let probe = DockerProbe::new(create_mock_docker(&dir, Some("manifest")));

        assert!(probe.exists("user/app:content-hash-x"));
        assert_eq!(
            calls(dir.path()),
            vec![
                "image inspect user/app:content-hash-x",
                "manifest inspect user/app:content-hash-x"
            ]
        );
    }

    #[test]
    fn both_failures_mean_absent() {
        let dir = tempfile::tempdir().unwrap();
        let probe = DockerProbe::new(create_mock_docker(&dir, None));
        assert!(!probe.exists("user/app:content-hash-x"));
        assert_eq!(calls(dir.path()).len(), 2);
    }

    #[test]
    fn missing_binary_means_absent() {
        let probe = DockerProbe::new("/nonexistent/lazybuild-docker");
        assert!(!probe.exists("user/app:content-hash-x"));
    }
}
