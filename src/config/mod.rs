pub mod types;

use crate::error::{ConfigError, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub use types::Config;

const CONFIG_FILE_NAME: &str = ".prov-ctl.toml";

/// Get the global config file path (~/.prov-ctl.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (dir/.prov-ctl.toml)
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| ConfigError::ParsingFailed(e.to_string()).into())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content)
}

/// Load configuration from file or use defaults
///
/// An explicit path must exist and parse. Otherwise the working directory
/// is checked first, then the home directory; unreadable discovered files
/// are skipped with a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(local_config_path(&cwd));
    }
    if let Some(global) = global_config_path() {
        candidates.push(global);
    }

    for candidate in candidates {
        if !candidate.exists() {
            continue;
        }
        match read_config(&candidate) {
            Ok(config) => {
                debug!("Loaded configuration from {}", candidate.display());
                return Ok(config);
            }
            Err(e) => warn!("Ignoring {}: {}", candidate.display(), e),
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_config(
            r#"
            [provisioning]
            no_prompt = true
            default_cloud = "aws-east"
            "#,
        )
        .unwrap();
        assert!(config.provisioning.no_prompt);
        assert_eq!(config.provisioning.default_cloud.as_deref(), Some("aws-east"));
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.remote.token_env, "PROV_CTL_TOKEN");
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[remote]\nurl = \"https://catalog.example.com\"").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.remote.url, "https://catalog.example.com");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = parse_config("[remote\nurl=").unwrap_err();
        assert!(err.to_string().contains("Failed to parse configuration"));
    }
}
