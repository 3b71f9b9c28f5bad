//! Repository configuration file support for refnotify.
//!
//! Loads `refnotify.toml` from the git dir, or a file named on the command line.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The config file name looked up in the git dir
pub const CONFIG_FILE_NAME: &str = "refnotify.toml";

/// Settings read from `refnotify.toml`; command-line flags take precedence
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Repository name used in subjects and headers
    pub repo_name: Option<String>,
    /// Subject prefix
    pub prefix: Option<String>,
    /// Maximum body size in bytes before diffs are dropped (0 = unlimited)
    pub max_diff_size: Option<usize>,
    /// Length of "most recent commits" listings
    pub recent_commits: Option<usize>,
    /// Base gitweb URL for commit links
    pub gitweb_url: Option<String>,
    /// Sender address
    pub from: Option<String>,
    /// Mail recipients
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Branches that never produce notifications
    #[serde(default)]
    pub exclude_branches: Vec<String>,
    /// Path to the sendmail program
    pub sendmail: Option<PathBuf>,
}

impl FileConfig {
    /// Load a config file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from the git dir.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn discover(git_dir: &Path) -> Result<Option<Self>> {
        let config_path = git_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        Self::load(&config_path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
repo_name = "compiler"
prefix = "COMPILER"
max_diff_size = 50000
gitweb_url = "https://git.example.com/compiler.git"
recipients = ["commits@example.com"]
exclude_branches = ["wip"]
"#;

        let config: FileConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.repo_name.as_deref(), Some("compiler"));
        assert_eq!(config.prefix.as_deref(), Some("COMPILER"));
        assert_eq!(config.max_diff_size, Some(50000));
        assert_eq!(config.recipients, vec!["commits@example.com"]);
        assert_eq!(config.exclude_branches, vec!["wip"]);
        assert!(config.from.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("max_size = 10\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_discover_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(FileConfig::discover(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_discover_present_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "prefix = \"PROJ\"\n").unwrap();

        let config = FileConfig::discover(dir.path()).unwrap().unwrap();
        assert_eq!(config.prefix.as_deref(), Some("PROJ"));
    }

    #[test]
    fn test_discover_invalid_file_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "prefix = [").unwrap();

        assert!(FileConfig::discover(dir.path()).is_err());
    }
}
