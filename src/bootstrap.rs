use std::fs;

use crate::config::Config;
use crate::error::Result;
use crate::git::Repository;

/// Zero-byte marker file inside the repository metadata directory.
///
/// Its presence means first-run setup already happened; no other state
/// is persisted between runs.
pub const MARKER_FILE: &str = "kernel-bump-initialized";

/// One-time bootstrap: add the configured upstream remote (if any) and
/// fetch its tags, then drop the marker file so later runs skip this.
///
/// Returns whether setup ran this time.
pub fn run_first_time_setup(repo: &dyn Repository, config: &Config) -> Result<bool> {
    let marker = repo.metadata_dir().join(MARKER_FILE);
    if marker.exists() {
        return Ok(false);
    }

    if let Some(remote) = &config.remote {
        if !repo.has_remote(&remote.name)? {
            repo.add_remote(&remote.name, &remote.url)?;
        }
        repo.fetch_tags(&remote.name)?;
    }

    fs::write(&marker, b"")?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;
    use crate::git::MockRepository;

    fn repo_with_marker_dir() -> (MockRepository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let repo = MockRepository::with_tree("master", &[("Makefile", "VERSION = 6\n")]);
        repo.set_metadata_dir(dir.path());
        (repo, dir)
    }

    fn config_with_remote() -> Config {
        Config {
            platform: None,
            remote: Some(RemoteConfig {
                name: "origin".to_string(),
                url: "https://example.com/linux.git".to_string(),
            }),
        }
    }

    #[test]
    fn test_first_run_adds_remote_and_marker() {
        let (repo, dir) = repo_with_marker_dir();

        let ran = run_first_time_setup(&repo, &config_with_remote()).unwrap();
        assert!(ran);
        assert!(dir.path().join(MARKER_FILE).exists());
        assert!(repo.has_remote("origin").unwrap());
        assert!(repo
            .operations()
            .iter()
            .any(|op| op.starts_with("fetch_tags")));
    }

    #[test]
    fn test_second_run_is_gated_by_marker() {
        let (repo, _dir) = repo_with_marker_dir();

        assert!(run_first_time_setup(&repo, &config_with_remote()).unwrap());
        assert!(!run_first_time_setup(&repo, &config_with_remote()).unwrap());

        // Remote was only added once
        let adds = repo
            .operations()
            .iter()
            .filter(|op| op.starts_with("add_remote"))
            .count();
        assert_eq!(adds, 1);
    }

    #[test]
    fn test_no_remote_configured_still_writes_marker() {
        let (repo, dir) = repo_with_marker_dir();

        assert!(run_first_time_setup(&repo, &Config::default()).unwrap());
        assert!(dir.path().join(MARKER_FILE).exists());
        assert!(repo.operations().is_empty());
    }

    #[test]
    fn test_existing_remote_is_not_re_added() {
        let (repo, _dir) = repo_with_marker_dir();
        repo.add_remote("origin", "https://example.com/linux.git")
            .unwrap();

        run_first_time_setup(&repo, &config_with_remote()).unwrap();
        let adds = repo
            .operations()
            .iter()
            .filter(|op| op.starts_with("add_remote"))
            .count();
        assert_eq!(adds, 1);
    }
}
