use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BumpError, Result};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "pombump.toml";

/// Represents the complete configuration for pom-bump.
///
/// Selects the version control backend and carries the settings for each one.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub version_control: VersionControlConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub subversion: SubversionConfig,

    #[serde(default)]
    pub clearcase: ClearCaseConfig,
}

/// Version control system used when saving modules
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VersionControlKind {
    #[default]
    None,
    Git,
    Subversion,
    Clearcase,
}

fn default_command_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersionControlConfig {
    #[serde(default)]
    pub kind: VersionControlKind,

    /// Timeout for each external command
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

impl Default for VersionControlConfig {
    fn default() -> Self {
        VersionControlConfig {
            kind: VersionControlKind::None,
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct GitConfig {
    /// Repository to commit to; discovered from each module's directory when unset
    #[serde(default)]
    pub repository: Option<PathBuf>,
}

fn default_svn_command() -> String {
    "svn".to_string()
}

fn default_tags_base() -> String {
    "tags".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SubversionConfig {
    #[serde(default = "default_svn_command")]
    pub command: String,

    /// Directory below the repository root where labels are copied
    #[serde(default = "default_tags_base")]
    pub tags_base: String,

    /// Copy this path below the repository root instead of the module directory
    #[serde(default)]
    pub alternate_repository_base: Option<String>,
}

impl Default for SubversionConfig {
    fn default() -> Self {
        SubversionConfig {
            command: default_svn_command(),
            tags_base: default_tags_base(),
            alternate_repository_base: None,
        }
    }
}

fn default_label_timeout_secs() -> u64 {
    15 * 60
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClearCaseConfig {
    /// Full path to cleartool
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default = "default_label_timeout_secs")]
    pub label_timeout_secs: u64,
}

impl Default for ClearCaseConfig {
    fn default() -> Self {
        ClearCaseConfig {
            command: None,
            label_timeout_secs: default_label_timeout_secs(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `pombump.toml` in current directory
/// 3. `.pombump.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        PathBuf::from(CONFIG_FILE_NAME)
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if user_config.exists() {
            user_config
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let content = fs::read_to_string(&path).map_err(|e| {
        BumpError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;
    parse_config(&content)
        .map_err(|e| BumpError::config(format!("{}: {}", path.display(), e)))
}

/// Parse configuration text
pub fn parse_config(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}
