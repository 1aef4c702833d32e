//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files, reading
//! `ACME_CHECK_*` environment variables and merging both with proper
//! precedence rules.

use crate::error::CheckError;
use crate::types::{is_valid_method, ValidationMethod};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Log levels accepted in configuration.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Default validation method (e.g., "dns-01")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Default JSON output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    /// Default pretty output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,

    /// Default log level when RUST_LOG is not set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to log which files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load and validate configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, CheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            CheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is lowest, then the home directory file, then the file in
    /// the current directory. Files that fail to load are skipped with a
    /// warning.
    pub fn discover_and_load(&self) -> FileConfig {
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        let mut merged = FileConfig::default();
        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    if self.verbose {
                        info!(path = %path.display(), "loaded configuration file");
                    }
                    merged = merge_configs(merged, config);
                }
                Err(err) => warn!(path = %path.display(), error = %err, "ignoring configuration file"),
            }
        }

        merged
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        let path = Path::new("./acme-check.toml");
        path.exists().then(|| path.to_path_buf())
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let path = Path::new(&home).join(".acme-check.toml");
        path.exists().then_some(path)
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("acme-check").join("config.toml");
        path.exists().then_some(path)
    }

    fn validate_config(&self, config: &FileConfig) -> Result<(), CheckError> {
        let Some(defaults) = &config.defaults else {
            return Ok(());
        };

        if let Some(method) = &defaults.method {
            if !is_valid_method(method) {
                return Err(CheckError::config(format!(
                    "Unknown validation method '{}'. Use one of: http-01, dns-01, tls-sni-01, tls-sni-02",
                    method
                )));
            }
        }

        if let Some(level) = &defaults.log_level {
            if !is_log_level(level) {
                return Err(CheckError::config(format!(
                    "Invalid log_level '{}'. Use one of: {}",
                    level,
                    LOG_LEVELS.join(", ")
                )));
            }
        }

        Ok(())
    }
}

/// Merge two configurations; values from `higher` win.
fn merge_configs(lower: FileConfig, higher: FileConfig) -> FileConfig {
    let defaults = match (lower.defaults, higher.defaults) {
        (Some(lower), Some(higher)) => Some(DefaultsConfig {
            method: higher.method.or(lower.method),
            json: higher.json.or(lower.json),
            pretty: higher.pretty.or(lower.pretty),
            log_level: higher.log_level.or(lower.log_level),
        }),
        (lower, higher) => higher.or(lower),
    };

    FileConfig { defaults }
}

fn is_log_level(level: &str) -> bool {
    LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
}

/// Configuration values read from ACME_CHECK_* environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub method: Option<String>,
    pub json: Option<bool>,
    pub pretty: Option<bool>,
    pub log_level: Option<String>,
}

/// Load configuration from the process environment.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

/// Build an [`EnvConfig`] from any variable lookup.
pub fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(method) = lookup("ACME_CHECK_METHOD") {
        let method = method.trim().to_string();
        if is_valid_method(&method) {
            env_config.method = Some(method);
        } else {
            warn!(value = %method, "invalid ACME_CHECK_METHOD, ignoring");
        }
    }

    env_config.json = lookup("ACME_CHECK_JSON").and_then(|v| parse_flag("ACME_CHECK_JSON", &v));
    env_config.pretty =
        lookup("ACME_CHECK_PRETTY").and_then(|v| parse_flag("ACME_CHECK_PRETTY", &v));

    if let Some(level) = lookup("ACME_CHECK_LOG") {
        if is_log_level(&level) {
            env_config.log_level = Some(level.to_ascii_lowercase());
        } else {
            warn!(value = %level, "invalid ACME_CHECK_LOG, ignoring");
        }
    }

    env_config
}

fn parse_flag(key: &str, value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            warn!(key, value, "invalid boolean, use true/false");
            None
        }
    }
}

/// Settings after applying env over file over built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub method: ValidationMethod,
    pub json: bool,
    pub pretty: bool,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            method: ValidationMethod::HTTP_01,
            json: false,
            pretty: false,
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Resolve settings; environment wins over file values.
    pub fn resolve(file: &FileConfig, env: &EnvConfig) -> Self {
        let defaults = file.defaults.clone().unwrap_or_default();
        let fallback = Settings::default();

        Self {
            method: env
                .method
                .clone()
                .or(defaults.method)
                .map(ValidationMethod::new)
                .unwrap_or(fallback.method),
            json: env.json.or(defaults.json).unwrap_or(fallback.json),
            pretty: env.pretty.or(defaults.pretty).unwrap_or(fallback.pretty),
            log_level: env
                .log_level
                .clone()
                .or(defaults.log_level)
                .unwrap_or(fallback.log_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
method = "dns-01"
json = true
log_level = "debug"
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();
        let defaults = config.defaults.unwrap();

        assert_eq!(defaults.method, Some("dns-01".to_string()));
        assert_eq!(defaults.json, Some(true));
        assert_eq!(defaults.pretty, None);
        assert_eq!(defaults.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_invalid_method_rejected() {
        let temp_file = write_config("[defaults]\nmethod = \"http-02\"\n");
        let result = ConfigManager::new(false).load_file(temp_file.path());
        assert!(matches!(result, Err(CheckError::ConfigError { .. })));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let temp_file = write_config("[defaults]\nlog_level = \"loud\"\n");
        assert!(ConfigManager::new(false).load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let temp_file = write_config("[defaults\nmethod = ");
        let err = ConfigManager::new(false)
            .load_file(temp_file.path())
            .unwrap_err();
        assert!(err.to_string().contains("TOML"));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigManager::new(false).load_file("/nonexistent/acme-check.toml");
        assert!(matches!(result, Err(CheckError::FileError { .. })));
    }

    #[test]
    fn test_merge_configs() {
        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                method: Some("http-01".to_string()),
                pretty: Some(false),
                log_level: Some("info".to_string()),
                ..Default::default()
            }),
        };
        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                method: Some("dns-01".to_string()),
                pretty: Some(true),
                ..Default::default()
            }),
        };

        let defaults = merge_configs(lower, higher).defaults.unwrap();

        assert_eq!(defaults.method, Some("dns-01".to_string())); // Higher wins
        assert_eq!(defaults.pretty, Some(true)); // Higher wins
        assert_eq!(defaults.log_level, Some("info".to_string())); // Lower preserved
        assert_eq!(defaults.json, None);
    }

    #[test]
    fn test_env_config_parsing() {
        let vars: HashMap<&str, &str> = [
            ("ACME_CHECK_METHOD", "dns-01"),
            ("ACME_CHECK_JSON", "yes"),
            ("ACME_CHECK_PRETTY", "maybe"),
            ("ACME_CHECK_LOG", "DEBUG"),
        ]
        .into_iter()
        .collect();

        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(env_config.method, Some("dns-01".to_string()));
        assert_eq!(env_config.json, Some(true));
        assert_eq!(env_config.pretty, None);
        assert_eq!(env_config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_env_ignores_unknown_method() {
        let env_config = env_config_from(|key| {
            (key == "ACME_CHECK_METHOD").then(|| "tls-alpn-01".to_string())
        });
        assert_eq!(env_config, EnvConfig::default());
    }

    #[test]
    fn test_settings_precedence() {
        let file = FileConfig {
            defaults: Some(DefaultsConfig {
                method: Some("tls-sni-01".to_string()),
                json: Some(true),
                log_level: Some("info".to_string()),
                ..Default::default()
            }),
        };
        let env = EnvConfig {
            method: Some("dns-01".to_string()),
            ..Default::default()
        };

        let settings = Settings::resolve(&file, &env);

        assert_eq!(settings.method, ValidationMethod::DNS_01);
        assert!(settings.json);
        assert!(!settings.pretty);
        assert_eq!(settings.log_level, "info");
        assert_eq!(
            Settings::resolve(&FileConfig::default(), &EnvConfig::default()),
            Settings::default()
        );
    }
}
