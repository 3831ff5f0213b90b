//! Configuration loading for `issue_tracker`.
//!
//! Layers, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. User config (`~/.config/issues/config.yaml`)
//! 3. Project config (`issues.yaml`, or the file named by `ISSUES_CONFIG`)
//! 4. Environment variables (`ISSUES_*`)
//! 5. Command-line flags

use crate::error::{Result, TrackerError};
use crate::storage::SqliteStore;
use crate::util::parse_bool;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_DB_FILENAME: &str = "issues.db";
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;
const PROJECT_CONFIG_FILENAME: &str = "issues.yaml";
const ENV_PREFIX: &str = "ISSUES_";
const CONFIG_PATH_VAR: &str = "ISSUES_CONFIG";

/// A configuration layer of normalized keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Set a key, normalizing its name.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// Look up a key by any of its spellings.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from `ISSUES_*` variables. `ISSUES_CONFIG` is skipped
    /// and empty variables count as unset.
    #[must_use]
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            let key = key.as_ref();
            if key == CONFIG_PATH_VAR {
                continue;
            }
            let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value: String = value.into();
            if !value.is_empty() {
                layer.insert(stripped, value);
            }
        }
        layer
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub bind: Option<String>,
    pub lock_timeout: Option<u64>,
    pub strict_status: Option<bool>,
    pub memory: Option<bool>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            layer.insert("db", path.to_string_lossy());
        }
        if let Some(bind) = &self.bind {
            layer.insert("bind", bind.clone());
        }
        if let Some(lock_timeout) = self.lock_timeout {
            layer.insert("lock-timeout", lock_timeout.to_string());
        }
        if let Some(strict_status) = self.strict_status {
            layer.insert("strict-status", strict_status.to_string());
        }
        if let Some(memory) = self.memory {
            layer.insert("memory", memory.to_string());
        }

        layer
    }
}

/// Where configuration is read from. Injected so tests can avoid the
/// process environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Directory searched for `issues.yaml`.
    pub project_dir: PathBuf,
    /// Environment variables.
    pub env: HashMap<String, String>,
}

impl ConfigSources {
    /// Sources for the running process: current directory and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn from_process() -> Result<Self> {
        Ok(Self {
            project_dir: env::current_dir()?,
            env: env::vars().collect(),
        })
    }

    fn project_config_path(&self) -> PathBuf {
        self.env.get(CONFIG_PATH_VAR).map_or_else(
            || self.project_dir.join(PROJECT_CONFIG_FILENAME),
            PathBuf::from,
        )
    }

    fn user_config_path(&self) -> Option<PathBuf> {
        self.env.get("HOME").map(|home| {
            Path::new(home)
                .join(".config")
                .join("issues")
                .join("config.yaml")
        })
    }
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.insert("bind", DEFAULT_BIND);
    layer.insert("db", DEFAULT_DB_FILENAME);
    layer.insert("lock-timeout", DEFAULT_LOCK_TIMEOUT_MS.to_string());
    layer.insert("strict-status", "false");
    layer.insert("memory", "false");
    layer
}

/// Merge every configuration layer in precedence order.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
pub fn load_config_layer(sources: &ConfigSources, cli: &CliOverrides) -> Result<ConfigLayer> {
    let user = match sources.user_config_path() {
        Some(path) => ConfigLayer::from_yaml(&path)?,
        None => ConfigLayer::default(),
    };
    let project = ConfigLayer::from_yaml(&sources.project_config_path())?;
    let env_layer = ConfigLayer::from_env_vars(&sources.env);

    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        user,
        project,
        env_layer,
        cli.as_layer(),
    ]))
}

/// Typed service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub lock_timeout_ms: u64,
    pub strict_status: bool,
    pub memory: bool,
    /// Tracing filter directive (`log` key), used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
    /// Emit logs as JSON lines (`log-format: json`).
    pub log_json: bool,
}

impl ServiceConfig {
    /// Parse a merged layer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfigValue` for an unparseable address, timeout or flag.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let bind_raw = layer.get("bind").unwrap_or(DEFAULT_BIND).trim();
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| TrackerError::invalid_config("bind", bind_raw, "expected host:port"))?;

        let db_path = layer
            .get("db")
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DB_FILENAME), PathBuf::from);

        let lock_timeout_ms = match layer.get("lock-timeout") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                TrackerError::invalid_config("lock-timeout", raw, "expected milliseconds")
            })?,
            None => DEFAULT_LOCK_TIMEOUT_MS,
        };

        let log_filter = layer
            .get("log")
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let log_json = match layer.get("log-format").map(|v| v.trim().to_lowercase()) {
            None => false,
            Some(format) if format == "text" => false,
            Some(format) if format == "json" => true,
            Some(other) => {
                return Err(TrackerError::invalid_config(
                    "log-format",
                    other,
                    "expected text or json",
                ));
            }
        };

        Ok(Self {
            bind,
            db_path,
            lock_timeout_ms,
            strict_status: flag(layer, "strict-status")?,
            memory: flag(layer, "memory")?,
            log_filter,
            log_json,
        })
    }

    /// Open the configured store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open_store(&self) -> Result<SqliteStore> {
        if self.memory {
            tracing::warn!("Using an in-memory database; issues are lost on exit");
            SqliteStore::open_memory()
        } else {
            SqliteStore::open(&self.db_path, Some(self.lock_timeout_ms))
        }
    }
}

/// Load the typed configuration for the running process.
///
/// # Errors
///
/// Returns an error if a config file is unreadable or a value is invalid.
pub fn load_config(cli: &CliOverrides) -> Result<ServiceConfig> {
    let sources = ConfigSources::from_process()?;
    let layer = load_config_layer(&sources, cli)?;
    ServiceConfig::from_layer(&layer)
}

fn flag(layer: &ConfigLayer, key: &str) -> Result<bool> {
    match layer.get(key) {
        Some(raw) => parse_bool(raw)
            .ok_or_else(|| TrackerError::invalid_config(key, raw, "expected true or false")),
        None => Ok(false),
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.insert(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
