//! Configuration for the mwkit CLI.
//!
//! A TOML file at the platform config path, overridden by `MWKIT_*`
//! environment variables, translated into `mwkit_core::FactoryConfig`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mwkit_core::FactoryConfig;
use mwkit_core::config::DEFAULT_ACTION_QUEUE_CAPACITY;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Registry snapshot file. Defaults to `registry.json` in the data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<PathBuf>,

    /// How many long-running actions may queue at once.
    #[serde(default = "default_action_queue_capacity")]
    pub action_queue_capacity: usize,

    /// `tracing` filter used when neither `-v` nor `RUST_LOG` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_path: None,
            action_queue_capacity: default_action_queue_capacity(),
            log_level: None,
        }
    }
}

fn default_action_queue_capacity() -> usize {
    DEFAULT_ACTION_QUEUE_CAPACITY
}

impl Config {
    /// Registry file to use: the configured one, else the platform default.
    pub fn resolve_registry_path(&self) -> PathBuf {
        self.registry_path
            .clone()
            .unwrap_or_else(default_registry_path)
    }

    /// Build the factory settings, rejecting values the queue can't use.
    pub fn to_factory_config(&self) -> Result<FactoryConfig, ConfigError> {
        if self.action_queue_capacity == 0 {
            return Err(ConfigError::Validation {
                field: "action_queue_capacity".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(FactoryConfig {
            action_queue_capacity: self.action_queue_capacity,
        })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "mbientlab", "mwkit")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default registry snapshot location.
pub fn default_registry_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("registry.json"),
        |dirs| dirs.data_dir().join("registry.json"),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("mwkit");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MWKIT_"))
        .extract()?;
    Ok(config)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("absent.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.action_queue_capacity, 16);
            Ok(())
        });
    }

    #[test]
    fn file_values_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    registry_path = "/tmp/lab.json"
                    action_queue_capacity = 4
                "#,
            )?;
            let cfg = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(cfg.registry_path, Some(PathBuf::from("/tmp/lab.json")));
            assert_eq!(cfg.action_queue_capacity, 4);
            assert_eq!(cfg.log_level, None);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "action_queue_capacity = 4")?;
            jail.set_env("MWKIT_ACTION_QUEUE_CAPACITY", "32");
            jail.set_env("MWKIT_LOG_LEVEL", "debug");
            let cfg = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(cfg.action_queue_capacity, 32);
            assert_eq!(cfg.log_level.as_deref(), Some("debug"));
            Ok(())
        });
    }

    #[test]
    fn malformed_file_is_a_figment_error() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "action_queue_capacity = \"many\"")?;
            let err = load_config_from(&jail.directory().join("config.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::Figment(_)));
            Ok(())
        });
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let cfg = Config {
            action_queue_capacity: 0,
            ..Config::default()
        };
        assert!(matches!(
            cfg.to_factory_config().unwrap_err(),
            ConfigError::Validation { .. }
        ));
        assert_eq!(
            Config::default().to_factory_config().unwrap(),
            FactoryConfig::default()
        );
    }

    #[test]
    fn explicit_registry_path_wins() {
        let cfg = Config {
            registry_path: Some(PathBuf::from("/data/registry.json")),
            ..Config::default()
        };
        assert_eq!(
            cfg.resolve_registry_path(),
            PathBuf::from("/data/registry.json")
        );
        assert!(
            Config::default()
                .resolve_registry_path()
                .ends_with("registry.json")
        );
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let cfg = Config {
            registry_path: Some(PathBuf::from("/srv/mw.json")),
            action_queue_capacity: 8,
            log_level: Some("info".into()),
        };
        save_config_to(&cfg, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("action_queue_capacity = 8"));
        let parsed: Config = toml::from_str(&written).unwrap();
        assert_eq!(parsed, cfg);
    }
}
