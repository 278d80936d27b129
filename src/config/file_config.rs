//! Configuration file discovery and generation.
//!
//! # Configuration File Format
//!
//! ```toml
//! [endpoints]
//! eutils_base = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils"
//! article_base = "https://pmc.ncbi.nlm.nih.gov/articles"
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! user_agent = "pmc-reader/0.1.0"
//!
//! [retry]
//! max_attempts = 3
//! initial_delay_ms = 1000
//! max_delay_ms = 30000
//!
//! [pipeline]
//! request_timeout_secs = 60
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use super::Config;

const LOCAL_FILE_NAME: &str = "pmc-reader.toml";
const APP_DIR_NAME: &str = "pmc-reader";

/// Look for a configuration file in the usual places.
///
/// Checks `./pmc-reader.toml`, then `<config dir>/pmc-reader/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    default_config_path().filter(|path| path.is_file())
}

/// Per-user configuration file location, whether or not it exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
}

/// The default configuration rendered as TOML
pub fn default_config_toml() -> Result<String, ConfigFileError> {
    toml::to_string_pretty(&Config::default())
        .map_err(|e| ConfigFileError::Serialize(e.to_string()))
}

/// Write the default configuration to `path`, refusing to overwrite an existing file
pub fn write_default_config(path: &Path) -> Result<(), ConfigFileError> {
    if path.exists() {
        return Err(ConfigFileError::Exists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
    }

    let content = default_config_toml()?;
    std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Refusing to overwrite existing file: {}", .0.display())]
    Exists(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_toml_round_trips() {
        let content = default_config_toml().unwrap();
        assert!(content.contains("[endpoints]"));
        assert!(content.contains("request_timeout_secs = 60"));

        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_write_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default_config(&path).unwrap();
        assert!(path.is_file());

        let loaded = crate::config::load_config(&path).unwrap();
        assert_eq!(loaded.endpoints, Config::default().endpoints);

        assert!(matches!(write_default_config(&path), Err(ConfigFileError::Exists(_))));
    }
}
