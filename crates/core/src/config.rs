//! Settings for the gitid tool itself.
//!
//! These live in a small TOML file (by default
//! `~/.config/gitid/config.toml`) and are all optional. The identity catalog
//! is not stored here; it lives in git config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// gitid settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".into()
}

/// Where git configuration is read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitConfig {
    /// Global git config file to use instead of the one git itself would
    /// pick. `~` is expanded.
    #[serde(default)]
    pub global_config: Option<PathBuf>,
}

impl GitConfig {
    /// `global_config` with a leading `~/` expanded.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config.as_deref().map(expand_tilde)
    }
}

/// Presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Width of the nickname column in `gitid list`.
    #[serde(default = "default_nickname_width")]
    pub nickname_width: usize,

    /// Ask before deleting from the interactive menu.
    #[serde(default = "default_true")]
    pub confirm_delete: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            nickname_width: default_nickname_width(),
            confirm_delete: true,
        }
    }
}

fn default_nickname_width() -> usize {
    12
}

fn default_true() -> bool {
    true
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading gitid configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Load from `path` if given (it must exist), otherwise from
    /// [`AppConfig::default_path`] if that file exists, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_file(&path)?,
                _ => {
                    debug!("no configuration file, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/gitid/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gitid").join("config.toml"))
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "log.level".into(),
                detail: format!(
                    "'{}' is not one of {}",
                    self.log.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        if self.ui.nickname_width == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ui.nickname_width".into(),
                detail: "must be > 0".into(),
            });
        }
        if let Some(path) = &self.git.global_config {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "git.global_config".into(),
                    detail: "path must not be empty".into(),
                });
            }
        }
        Ok(())
    }

    /// Commented template for `gitid config init`.
    pub fn default_template() -> &'static str {
        r#"# gitid configuration

[log]
level = "warn"

[git]
# global_config = "~/.gitconfig"

[ui]
nickname_width = 12
confirm_delete = true
"#
    }
}

/// Expand `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: AppConfig = toml::from_str(
            r#"
[log]
level = "debug"

[git]
global_config = "/tmp/gitconfig"

[ui]
nickname_width = 20
confirm_delete = false
"#,
        )
        .unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(
            config.git.global_config_path(),
            Some(PathBuf::from("/tmp/gitconfig"))
        );
        assert_eq!(config.ui.nickname_width, 20);
        assert!(!config.ui.confirm_delete);
    }

    #[test]
    fn test_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.log.level, "warn");
        assert!(config.git.global_config.is_none());
        assert_eq!(config.ui.nickname_width, 12);
        assert!(config.ui.confirm_delete);
        config.validate().unwrap();
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[log]\nlevel = \"info\"\n").unwrap();

        let config = AppConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_file_not_found() {
        let result = AppConfig::load_from_file("/nonexistent/gitid.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[log\nlevel = ").unwrap();
        assert!(matches!(
            AppConfig::load_from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let mut config = AppConfig::default();
        config.log.level = "loud".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "log.level"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_width() {
        let mut config = AppConfig::default();
        config.ui.nickname_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let git = GitConfig {
            global_config: Some(PathBuf::from("~/.gitconfig")),
        };
        let expanded = git.global_config_path().unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join(".gitconfig"));
        }
    }

    #[test]
    fn test_default_template_is_valid() {
        let config: AppConfig =
            toml::from_str(AppConfig::default_template()).expect("template should parse");
        config.validate().unwrap();
    }
}
