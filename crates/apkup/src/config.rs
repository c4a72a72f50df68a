//! Project configuration
//!
//! An optional `apkup.toml` (or YAML) file supplies defaults for the
//! package name, key file, track and endpoints. Flags and environment
//! variables take precedence over it.

use std::path::{Path, PathBuf};

use apkup_core::{CleanupPolicy, PublisherConfig, TrackName};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Configuration file names, in search order
pub const CONFIG_FILE_NAMES: &[&str] = &["apkup.toml", ".apkup.toml", "apkup.yaml", ".apkup.yaml"];

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingField(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Endpoint overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub api_base_url: Option<String>,
    pub upload_base_url: Option<String>,
    pub token_url: Option<String>,
}

/// Contents of a project configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Package name (e.g., "com.example.app")
    pub package_name: Option<String>,

    /// Path to the service account JSON key, relative to the config file
    pub key: Option<PathBuf>,

    /// Default track for uploads
    pub track: Option<String>,

    /// Delete edits whose mutation failed instead of leaving them open
    pub discard_failed_edits: bool,

    pub endpoints: EndpointConfig,
}

impl ProjectConfig {
    /// Publisher configuration with endpoint overrides applied
    pub fn publisher_config(&self, discard_failed_edits: bool) -> PublisherConfig {
        let mut config = PublisherConfig::default();

        if let Some(url) = &self.endpoints.api_base_url {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = &self.endpoints.upload_base_url {
            config.upload_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = &self.endpoints.token_url {
            config.token_url = url.clone();
        }

        let cleanup = if discard_failed_edits || self.discard_failed_edits {
            CleanupPolicy::DeleteOnFailure
        } else {
            CleanupPolicy::LeaveOpen
        };

        config.with_cleanup(cleanup)
    }
}

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<ProjectConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let is_yaml = path
        .extension()
        .is_some_and(|e| e == "yaml" || e == "yml");
    let format = if is_yaml { "YAML" } else { "TOML" };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path)?;
    let mut config: ProjectConfig = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };

    // key paths are relative to the file that names them
    if let (Some(key), Some(dir)) = (&config.key, path.parent()) {
        if key.is_relative() {
            config.key = Some(dir.join(key));
        }
    }

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find a configuration file in a directory or its parents.
///
/// Each level checks `<dir>/<name>` and then `<dir>/.github/<name>`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in CONFIG_FILE_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.is_file() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load the explicit file when given, otherwise search upward from `dir`
pub fn load_project_config(
    explicit: Option<&Path>,
    dir: &Path,
) -> Result<ProjectConfig, ConfigError> {
    match explicit {
        Some(path) => load_config(path),
        None => match find_config(dir) {
            Some(path) => load_config(&path),
            None => Ok(ProjectConfig::default()),
        },
    }
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if let Some(package_name) = &config.package_name {
        if package_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "package_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
    }

    if let Some(track) = &config.track {
        track
            .parse::<TrackName>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "track".to_string(),
                message: e.to_string(),
            })?;
    }

    let endpoints = [
        ("endpoints.api_base_url", &config.endpoints.api_base_url),
        ("endpoints.upload_base_url", &config.endpoints.upload_base_url),
        ("endpoints.token_url", &config.endpoints.token_url),
    ];
    for (field, value) in endpoints {
        let Some(value) = value else { continue };
        let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_walks_parents() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("apkup.toml");
        std::fs::write(&config_path, "package_name = \"com.example.app\"").unwrap();

        let nested = temp.path().join("android").join("app");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_find_config_in_github_dir() {
        let temp = TempDir::new().unwrap();
        let github = temp.path().join(".github");
        std::fs::create_dir_all(&github).unwrap();
        let config_path = github.join("apkup.yaml");
        std::fs::write(&config_path, "track: beta").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_load_toml_resolves_key_relative_to_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("apkup.toml");
        std::fs::write(
            &config_path,
            r#"
package_name = "com.example.app"
key = "secrets/play.json"
track = "beta"
discard_failed_edits = true

[endpoints]
api_base_url = "http://localhost:8080/v3/"
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.package_name.as_deref(), Some("com.example.app"));
        assert_eq!(config.key, Some(temp.path().join("secrets/play.json")));

        let publisher = config.publisher_config(false);
        assert_eq!(publisher.api_base_url, "http://localhost:8080/v3");
        assert_eq!(publisher.cleanup, CleanupPolicy::DeleteOnFailure);
    }

    #[test]
    fn test_load_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(".apkup.yaml");
        std::fs::write(&config_path, "package_name: com.example.app\ntrack: alpha\n").unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.track.as_deref(), Some("alpha"));
        assert!(!config.discard_failed_edits);
        assert_eq!(config.publisher_config(false).cleanup, CleanupPolicy::LeaveOpen);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("apkup.toml");

        std::fs::write(&config_path, "package_name = \"\"").unwrap();
        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::InvalidValue { .. })
        ));

        std::fs::write(&config_path, "[endpoints]\ntoken_url = \"ftp://example.com\"").unwrap();
        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(matches!(
            load_project_config(Some(&missing), temp.path()),
            Err(ConfigError::NotFound(_))
        ));
    }
}
