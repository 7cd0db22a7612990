//! Layered CLI configuration
//!
//! Priority, lowest first: built-in defaults, the TOML file, `FILEHASH_`
//! environment variables (`__` separates sections), command line flags.

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use filehash_core::{AlgorithmConfig, DateZone, EngineOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "filehash";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "FILEHASH_";

/// Every key `config get`/`config set` accept
pub const KNOWN_KEYS: &[&str] = &[
    "checks.include_version",
    "checks.include_date",
    "checks.include_md5",
    "checks.include_sha1",
    "checks.include_crc32",
    "engine.read_timeout_seconds",
    "engine.time_zone",
    "output.default_format",
    "output.color_enabled",
    "output.progress_enabled",
];

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct AppConfig {
    /// Checks run by `hash` when `--checks` is not given
    #[serde(default)]
    pub checks: AlgorithmConfig,

    #[serde(default)]
    pub engine: EngineOptions,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub default_format: String,
    pub color_enabled: bool,
    pub progress_enabled: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: "text".to_string(),
            color_enabled: true,
            progress_enabled: true,
        }
    }
}

/// Command line values that take precedence over every other layer
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub checks: Option<AlgorithmConfig>,
    pub format: Option<String>,
    pub read_timeout_seconds: Option<u64>,
    pub utc: bool,
    pub no_progress: bool,
}

impl AppConfig {
    /// Apply CLI argument overrides to the configuration
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(checks) = overrides.checks {
            self.checks = checks;
        }
        if let Some(format) = overrides.format {
            self.output.default_format = format;
        }
        if let Some(seconds) = overrides.read_timeout_seconds {
            self.engine.read_timeout_seconds = Some(seconds);
        }
        if overrides.utc {
            self.engine.time_zone = DateZone::Utc;
        }
        if overrides.no_progress {
            self.output.progress_enabled = false;
        }
    }
}

/// Handles the config file location and layered loading
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a ConfigManager using the platform config location
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// `$XDG_CONFIG_HOME/filehash/config.toml`, else the platform config dir
    fn default_config_path() -> PathBuf {
        #[cfg(not(target_os = "windows"))]
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return PathBuf::from(xdg_config).join(APP_DIR).join(CONFIG_FILE);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load defaults, file and environment
    pub fn load(&self) -> Result<AppConfig> {
        let config: AppConfig = self
            .figment()
            .extract()
            .context("Failed to load configuration")?;
        config
            .engine
            .validate()
            .context("Invalid [engine] configuration")?;
        Ok(config)
    }

    /// Get a configuration value by key (dot notation)
    pub fn get(&self, key: &str) -> Result<String> {
        ensure_known_key(key)?;
        let value = toml::Value::try_from(self.load()?)?;

        let mut current = &value;
        for part in key.split('.') {
            current = current
                .get(part)
                .ok_or_else(|| anyhow::anyhow!("Key '{key}' is not set"))?;
        }

        scalar_to_string(current)
            .ok_or_else(|| anyhow::anyhow!("Value at '{key}' is not a simple type"))
    }

    /// Set a configuration value by key (dot notation) in the config file
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        ensure_known_key(key)?;
        let parsed = parse_config_value(key, value)?;

        let mut document = if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path).with_context(|| {
                format!("Failed to read {}", self.config_path.display())
            })?;
            toml::from_str::<toml::Table>(&content).with_context(|| {
                format!("Failed to parse {}", self.config_path.display())
            })?
        } else {
            toml::Table::new()
        };

        let (section, field) = key
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Invalid key path: {key}"))?;
        let table = document
            .entry(section)
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        match table {
            toml::Value::Table(table) => {
                table.insert(field.to_string(), parsed);
            }
            _ => anyhow::bail!("Invalid key path: expected table at '{section}'"),
        }

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&self.config_path, toml::to_string_pretty(&document)?)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;

        Ok(())
    }

    /// List all effective configuration values, sorted by key
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self.load()?)?;

        let mut items = Vec::new();
        collect_values(&value, String::new(), &mut items);
        items.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(items)
    }
}

fn ensure_known_key(key: &str) -> Result<()> {
    if KNOWN_KEYS.contains(&key) {
        Ok(())
    } else {
        anyhow::bail!(
            "Unknown configuration key '{key}'. Known keys: {}",
            KNOWN_KEYS.join(", ")
        )
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

fn collect_values(value: &toml::Value, prefix: String, items: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_values(val, new_prefix, items);
            }
        }
        other => {
            if let Some(text) = scalar_to_string(other) {
                items.push((prefix, text));
            }
        }
    }
}

/// Validate a value for `key` and convert it to its TOML type
fn parse_config_value(key: &str, value: &str) -> Result<toml::Value> {
    match key {
        k if k.starts_with("checks.") || k.ends_with("_enabled") => {
            let enabled: bool = value
                .parse()
                .context("Expected boolean value (true/false)")?;
            Ok(toml::Value::Boolean(enabled))
        }
        "engine.read_timeout_seconds" => {
            let seconds: i64 = value
                .parse()
                .context("read_timeout_seconds must be a positive integer")?;
            if seconds <= 0 {
                anyhow::bail!("read_timeout_seconds must be greater than 0");
            }
            Ok(toml::Value::Integer(seconds))
        }
        "engine.time_zone" => match value.to_lowercase().as_str() {
            zone @ ("local" | "utc") => Ok(toml::Value::String(zone.to_string())),
            _ => anyhow::bail!("time_zone must be 'local' or 'utc'"),
        },
        "output.default_format" => match value.to_lowercase().as_str() {
            format @ ("text" | "json" | "csv") => Ok(toml::Value::String(format.to_string())),
            _ => anyhow::bail!("default_format must be one of: text, json, csv"),
        },
        _ => Ok(toml::Value::String(value.to_string())),
    }
}

/// Load the configuration from the default location
pub fn get_config() -> Result<AppConfig> {
    ConfigManager::new().load()
}
