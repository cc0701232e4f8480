use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KernelBumpError, Result};

/// Optional configuration for kernel-bump.
///
/// Everything here has a sensible absence: without a config file the
/// tool runs with no bootstrap remote and no default platform name.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Default platform name when neither -p nor PLATFORM_NAME is given
    #[serde(default)]
    pub platform: Option<String>,

    /// Upstream remote used by the one-time first-run bootstrap
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

/// Remote used for first-run tag bootstrap.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_name")]
    pub name: String,

    pub url: String,
}

fn default_remote_name() -> String {
    "origin".to_string()
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `kernelbump.toml` in the current directory
/// 3. `.kernelbump.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./kernelbump.toml").exists() {
        fs::read_to_string("./kernelbump.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".kernelbump.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str)
        .map_err(|e| KernelBumpError::config(format!("cannot parse configuration: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_remote() {
        let config = Config::default();
        assert!(config.remote.is_none());
        assert!(config.platform.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            platform = "x86_64"

            [remote]
            name = "stable"
            url = "https://git.kernel.org/pub/scm/linux/kernel/git/stable/linux.git"
            "#,
        )
        .unwrap();

        assert_eq!(config.platform.as_deref(), Some("x86_64"));
        let remote = config.remote.unwrap();
        assert_eq!(remote.name, "stable");
        assert!(remote.url.contains("kernel.org"));
    }

    #[test]
    fn test_remote_name_defaults_to_origin() {
        let config: Config = toml::from_str(
            r#"
            [remote]
            url = "https://example.com/linux.git"
            "#,
        )
        .unwrap();

        assert_eq!(config.remote.unwrap().name, "origin");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        assert!(load_config(Some("/nonexistent/kernelbump.toml")).is_err());
    }
}
