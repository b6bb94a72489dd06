//! Configuration file loading.
//!
//! This module handles loading acton-seq configuration from TOML files
//! at XDG-compliant locations.

use crate::config::types::SeqConfig;
use crate::error::SequenceError;
use std::path::{Path, PathBuf};

/// Default configuration file name for project-local config.
const LOCAL_CONFIG_NAME: &str = "acton-seq.toml";

/// Default configuration file name within XDG config directory.
const XDG_CONFIG_NAME: &str = "config.toml";

/// Application name for XDG directory lookup.
const APP_NAME: &str = "acton-seq";

/// Loads configuration from the default search paths.
///
/// Search order:
/// 1. `./acton-seq.toml` (project-local)
/// 2. `~/.config/acton-seq/config.toml` (XDG config)
///
/// Returns the default configuration if no config file is found.
///
/// # Errors
///
/// Returns a `Configuration` error if a config file exists but cannot be parsed.
pub fn load() -> Result<SeqConfig, SequenceError> {
    for path in search_paths() {
        if path.exists() {
            return from_path(&path);
        }
    }

    Ok(SeqConfig::default())
}

/// Loads configuration from a specific file path.
///
/// # Errors
///
/// Returns a `Configuration` error if:
/// - The file cannot be read
/// - The file contains invalid TOML
/// - The TOML doesn't match the expected schema
///
/// # Example
///
/// ```rust,ignore
/// use acton_seq::config::from_path;
/// use std::path::Path;
///
/// let config = from_path(Path::new("/etc/acton-seq/config.toml"))?;
/// ```
pub fn from_path(path: &Path) -> Result<SeqConfig, SequenceError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        SequenceError::configuration(
            "config_file",
            format!("failed to read '{}': {}", path.display(), e),
        )
    })?;

    toml::from_str(&contents).map_err(|e| {
        SequenceError::configuration(
            "config_file",
            format!("failed to parse '{}': {}", path.display(), e),
        )
    })
}

/// Parses configuration from a TOML string.
///
/// # Errors
///
/// Returns a `Configuration` error if the TOML is invalid or doesn't match the schema.
///
/// # Example
///
/// ```rust
/// use acton_seq::config::from_str;
///
/// let config = from_str("[open]\ntools = true\n").unwrap();
/// assert!(config.open_options().tools_enabled());
/// ```
pub fn from_str(toml_str: &str) -> Result<SeqConfig, SequenceError> {
    toml::from_str(toml_str)
        .map_err(|e| SequenceError::configuration("config", format!("invalid TOML: {e}")))
}

/// Returns the paths that would be searched for configuration files.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_NAME)];

    if let Some(dir) = xdg_config_dir() {
        paths.push(dir.join(XDG_CONFIG_NAME));
    }

    paths
}

/// Returns the path to the XDG config directory for acton-seq.
///
/// This is `~/.config/acton-seq` on most systems.
#[must_use]
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn from_str_parses_all_sections() {
        let toml = r#"
[open]
tools = true
system_prompt = "Be terse."
skip_prelude = false

[prelude]
knowledge_cutoff = "June 2025"

[logging]
enabled = false
        "#;

        let config = from_str(toml).unwrap();

        assert!(config.open.tools);
        assert_eq!(config.open.system_prompt.as_deref(), Some("Be terse."));
        assert_eq!(config.prelude.knowledge_cutoff, "June 2025");
        assert!(!config.logging.enabled);
    }

    #[test]
    fn from_str_accepts_empty_document() {
        let config = from_str("").unwrap();
        assert_eq!(config, SeqConfig::default());
    }

    #[test]
    fn from_str_error_on_invalid_toml() {
        let err = from_str("this is not valid toml [[[").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn from_str_error_on_wrong_type() {
        let err = from_str("[open]\ntools = \"yes\"\n").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn from_path_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
            [prelude]
            environment = "python"
        "#
        )
        .unwrap();

        let config = from_path(&config_path).unwrap();

        assert_eq!(config.prelude.environment, "python");
    }

    #[test]
    fn from_path_error_names_the_file() {
        let err = from_path(Path::new("/nonexistent/path/config.toml")).unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("/nonexistent/path/config.toml"));
    }

    #[test]
    fn search_paths_starts_with_local() {
        let paths = search_paths();

        assert_eq!(paths[0], PathBuf::from(LOCAL_CONFIG_NAME));
    }

    #[test]
    fn xdg_config_dir_returns_path() {
        if let Some(dir) = xdg_config_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }
}
