//! TOML-based ledger configuration.
//!
//! Holds the store file name and the ledger tunables (grind cooldown, grind
//! XP, activity cap, spin cooldown). Stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::ledger::grind::{GrindRules, COOLDOWN_SECS, GRIND_XP};
use crate::spin::SPIN_COOLDOWN_HOURS;
use crate::user::ACTIVITY_CAP;

/// Document store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// File name of the JSON document, relative to the data directory.
    #[serde(default = "default_store_file")]
    pub file: String,
}

/// Grind and activity tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: i64,
    #[serde(default = "default_grind_xp")]
    pub grind_xp: u64,
    #[serde(default = "default_activity_cap")]
    pub activity_cap: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinConfig {
    #[serde(default = "default_spin_cooldown_hours")]
    pub cooldown_hours: i64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/ascension/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub spin: SpinConfig,
}

fn default_store_file() -> String {
    "database.json".into()
}
fn default_cooldown_secs() -> i64 {
    COOLDOWN_SECS
}
fn default_grind_xp() -> u64 {
    GRIND_XP
}
fn default_activity_cap() -> usize {
    ACTIVITY_CAP
}
fn default_spin_cooldown_hours() -> i64 {
    SPIN_COOLDOWN_HOURS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file: default_store_file(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: COOLDOWN_SECS,
            grind_xp: GRIND_XP,
            activity_cap: ACTIVITY_CAP,
        }
    }
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            cooldown_hours: SPIN_COOLDOWN_HOURS,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        if key.is_empty() {
            return Err(unknown());
        }

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<i64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content)
                    .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every leaf key with its current value, in declaration order.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let negative = |key: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must not be negative".into(),
        };
        if self.ledger.cooldown_secs < 0 {
            return Err(negative("ledger.cooldown_secs"));
        }
        if self.spin.cooldown_hours < 0 {
            return Err(negative("spin.cooldown_hours"));
        }
        if self.ledger.grind_xp == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ledger.grind_xp".into(),
                message: "must be greater than zero".into(),
            });
        }
        if !(1..=ACTIVITY_CAP).contains(&self.ledger.activity_cap) {
            return Err(ConfigError::InvalidValue {
                key: "ledger.activity_cap".into(),
                message: format!("must be between 1 and {ACTIVITY_CAP}"),
            });
        }
        if self.store.file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "store.file".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Grind tunables as the ledger consumes them.
    pub fn grind_rules(&self) -> GrindRules {
        GrindRules {
            cooldown_secs: self.ledger.cooldown_secs,
            grind_xp: self.ledger.grind_xp,
            activity_cap: self.ledger.activity_cap,
        }
    }

    /// Path of the JSON document inside `dir`.
    pub fn store_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.store.file)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }
}
