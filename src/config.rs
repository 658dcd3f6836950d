//! Configuration file handling for the command-line tool.
//!
//! This module loads `.rowmapper.json` files. Every field is optional; a
//! missing file means defaults.
//!
//! Lookup order:
//! 1. An explicit path (`--config`), which must exist
//! 2. `./.rowmapper.json`
//! 3. `~/.rowmapper.json`

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Name of the configuration file looked up in the working and home directories.
pub const CONFIG_FILE_NAME: &str = ".rowmapper.json";

/// Top-level configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Output format used when `--format` is not given
    pub format: OutputFormat,
    /// Maximum number of rows printed by commands
    pub limit: Option<usize>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            format: OutputFormat::Table,
            limit: None,
        }
    }
}

impl ConfigFile {
    /// Load configuration using the standard lookup order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The explicit config file doesn't exist
    /// - The file cannot be read
    /// - The JSON is invalid or has unknown fields
    pub fn load(explicit: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let cwd = std::env::current_dir()?;
        let home = home::home_dir();
        Self::load_from(explicit, &cwd, home.as_deref())
    }

    /// Same as [`ConfigFile::load`] with the working and home directories given.
    pub fn load_from(explicit: Option<&Path>, cwd: &Path, home: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(format!("Configuration file not found: {}", path.display()).into());
            }
            return Self::read(path);
        }

        let candidates: Vec<PathBuf> = std::iter::once(cwd.join(CONFIG_FILE_NAME))
            .chain(home.map(|dir| dir.join(CONFIG_FILE_NAME)))
            .collect();

        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => Self::read(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse one configuration file.
    pub fn read(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[rstest]
    fn test_empty_object_uses_defaults() {
        let config: ConfigFile = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.format, OutputFormat::Table);
        assert_eq!(config.limit, None);
    }

    #[rstest]
    fn test_full_deserialization() {
        let json = r#"
        {
            "log_level": "debug",
            "format": "json",
            "limit": 25
        }
        "#;
        let config: ConfigFile = serde_json::from_str(json).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.limit, Some(25));
    }

    #[rstest]
    fn test_unknown_field_rejected() {
        let result: Result<ConfigFile, _> = serde_json::from_str(r#"{ "database": "x" }"#);
        assert!(result.is_err());
    }

    #[rstest]
    fn test_missing_files_give_defaults() {
        let cwd = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();

        let config = ConfigFile::load_from(None, cwd.path(), Some(home.path())).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[rstest]
    fn test_working_directory_before_home() {
        let cwd = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        write_config(cwd.path(), r#"{ "format": "toon" }"#);
        write_config(home.path(), r#"{ "format": "json" }"#);

        let config = ConfigFile::load_from(None, cwd.path(), Some(home.path())).unwrap();
        assert_eq!(config.format, OutputFormat::Toon);
    }

    #[rstest]
    fn test_home_directory_fallback() {
        let cwd = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        write_config(home.path(), r#"{ "limit": 5 }"#);

        let config = ConfigFile::load_from(None, cwd.path(), Some(home.path())).unwrap();
        assert_eq!(config.limit, Some(5));
    }

    #[rstest]
    fn test_explicit_path_wins() {
        let cwd = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        write_config(cwd.path(), r#"{ "limit": 1 }"#);
        let explicit = write_config(other.path(), r#"{ "limit": 2 }"#);

        let config = ConfigFile::load_from(Some(&explicit), cwd.path(), None).unwrap();
        assert_eq!(config.limit, Some(2));
    }

    #[rstest]
    fn test_explicit_path_must_exist() {
        let cwd = tempfile::tempdir().unwrap();
        let missing = cwd.path().join("missing.json");

        let result = ConfigFile::load_from(Some(&missing), cwd.path(), None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Configuration file not found"));
    }

    #[rstest]
    fn test_load_invalid_json() {
        let cwd = tempfile::tempdir().unwrap();
        write_config(cwd.path(), "{ invalid json }");

        let result = ConfigFile::load_from(None, cwd.path(), None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid JSON"));
    }
}
