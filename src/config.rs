//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rsavl/rsavl.toml`
//! 3. Local config: `--config <file>` or `./.rsavl.toml`
//! 4. Environment variables: `RSAVL_*` prefix, `__` between table and key

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::services::CompareRequest;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{BalanceStrategy, Key, TreeOptions};

/// Name of the local config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".rsavl.toml";

/// Defaults for `rsavl compare`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompareConfig {
    pub count: usize,
    pub min_key: Key,
    pub max_key: Key,
    /// Fixed RNG seed, random when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            count: 100,
            min_key: 1,
            max_key: 500,
            seed: None,
        }
    }
}

/// Raw compare table; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCompareConfig {
    pub count: Option<usize>,
    pub min_key: Option<Key>,
    pub max_key: Option<Key>,
    pub seed: Option<u64>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub strategy: Option<BalanceStrategy>,
    pub node_limit: Option<usize>,
    pub verify: Option<bool>,
    pub compare: RawCompareConfig,
}

/// Unified configuration for rsavl.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Rebalancing strategy of AVL trees
    pub strategy: BalanceStrategy,
    /// Maximum number of nodes per tree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_limit: Option<usize>,
    /// Check all tree invariants after every mutation (debug builds)
    pub verify: bool,
    pub compare: CompareConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let options = TreeOptions::default();
        Self {
            strategy: options.strategy,
            node_limit: options.node_limit,
            verify: options.verify,
            compare: CompareConfig::default(),
        }
    }
}

/// Get the XDG config directory for rsavl.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rsavl").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rsavl.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// An explicit `local` path must exist. Without one, `./.rsavl.toml` is
    /// used when present.
    pub fn load(local: Option<&Path>) -> ApplicationResult<Self> {
        let implicit = PathBuf::from(LOCAL_CONFIG_FILE);
        let local = match local {
            Some(path) => Some(path),
            None if implicit.is_file() => Some(implicit.as_path()),
            None => None,
        };
        Self::load_layers(global_config_path().as_deref(), local, None)
    }

    /// Layered load with every source injectable.
    ///
    /// `global` is skipped when the file does not exist; `local` is required.
    /// `env` replaces the process environment when given.
    pub fn load_layers(
        global: Option<&Path>,
        local: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> ApplicationResult<Self> {
        let mut current = Self::default();

        if let Some(path) = global.filter(|p| p.exists()) {
            debug!(path = %path.display(), "loading global config");
            current = current.merge_with(&load_raw_settings(path)?);
        }

        if let Some(path) = local {
            if !path.exists() {
                return Err(ApplicationError::ConfigNotFound(path.to_path_buf()));
            }
            debug!(path = %path.display(), "loading local config");
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current.apply_env_overrides(env)
    }

    /// Scalar overlay: a value set in `overlay` wins.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            strategy: overlay.strategy.unwrap_or(self.strategy),
            node_limit: overlay.node_limit.or(self.node_limit),
            verify: overlay.verify.unwrap_or(self.verify),
            compare: CompareConfig {
                count: overlay.compare.count.unwrap_or(self.compare.count),
                min_key: overlay.compare.min_key.unwrap_or(self.compare.min_key),
                max_key: overlay.compare.max_key.unwrap_or(self.compare.max_key),
                seed: overlay.compare.seed.or(self.compare.seed),
            },
        }
    }

    /// Apply RSAVL_* environment variables as explicit overrides.
    fn apply_env_overrides(mut self, env: Option<Map<String, String>>) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RSAVL")
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(config_err)?;

        if let Some(val) = lookup::<String>(&config, "strategy")? {
            self.strategy = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Some(val) = lookup_int(&config, "node_limit")? {
            self.node_limit = Some(narrow("node_limit", val)?);
        }
        if let Some(val) = lookup::<bool>(&config, "verify")? {
            self.verify = val;
        }
        if let Some(val) = lookup_int(&config, "compare.count")? {
            self.compare.count = narrow("compare.count", val)?;
        }
        if let Some(val) = lookup_int(&config, "compare.min_key")? {
            self.compare.min_key = narrow("compare.min_key", val)?;
        }
        if let Some(val) = lookup_int(&config, "compare.max_key")? {
            self.compare.max_key = narrow("compare.max_key", val)?;
        }
        if let Some(val) = lookup_int(&config, "compare.seed")? {
            self.compare.seed = Some(narrow("compare.seed", val)?);
        }

        Ok(self)
    }

    /// Tree construction options derived from these settings.
    pub fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            strategy: self.strategy,
            node_limit: self.node_limit,
            verify: self.verify,
        }
    }

    /// Compare request from the `[compare]` table.
    pub fn compare_request(&self) -> CompareRequest {
        CompareRequest {
            count: self.compare.count,
            min_key: self.compare.min_key,
            max_key: self.compare.max_key,
            seed: self.compare.seed,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rsavl configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rsavl/rsavl.toml
#   Local:  ./.rsavl.toml or --config <file>
#   Env:    RSAVL_* environment variables, e.g. RSAVL_COMPARE__SEED=42

# Rebalancing strategy: "balance-factor" or "height"
# strategy = "balance-factor"

# Maximum number of nodes per tree (unbounded when unset)
# node_limit = 100000

# Check all tree invariants after every mutation (debug builds only)
# verify = true

[compare]
# count = 100
# min_key = 1
# max_key = 500
# seed = 42
"#
        .to_string()
    }
}

/// Typed lookup that maps "not set" to `None`.
fn lookup<T: serde::de::DeserializeOwned>(
    config: &Config,
    key: &str,
) -> ApplicationResult<Option<T>> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn lookup_int(config: &Config, key: &str) -> ApplicationResult<Option<i64>> {
    match config.get_int(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn narrow<T: TryFrom<i64>>(key: &str, val: i64) -> ApplicationResult<T> {
    T::try_from(val).map_err(|_| ApplicationError::Config {
        message: format!("{key}: value {val} out of range"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn given_no_sources_when_loading_then_uses_defaults() {
        let settings = Settings::load_layers(None, None, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.compare.count, 100);
        assert_eq!(settings.strategy, BalanceStrategy::BalanceFactor);
    }

    #[test]
    fn given_env_overrides_when_loading_then_replace_values() {
        let settings = Settings::load_layers(
            None,
            None,
            env(&[
                ("RSAVL_STRATEGY", "height"),
                ("RSAVL_NODE_LIMIT", "64"),
                ("RSAVL_COMPARE__SEED", "9"),
                ("UNRELATED", "1"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.strategy, BalanceStrategy::Height);
        assert_eq!(settings.node_limit, Some(64));
        assert_eq!(settings.compare.seed, Some(9));
        assert_eq!(settings.compare.max_key, 500);
    }

    #[test]
    fn given_bad_strategy_in_env_when_loading_then_config_error() {
        let err = Settings::load_layers(None, None, env(&[("RSAVL_STRATEGY", "splay")]))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_negative_limit_in_env_when_loading_then_config_error() {
        let err = Settings::load_layers(None, None, env(&[("RSAVL_NODE_LIMIT", "-1")]))
            .unwrap_err();
        assert!(err.to_string().contains("node_limit"));
    }

    #[test]
    fn given_settings_when_converted_then_options_and_request_match() {
        let mut settings = Settings::default();
        settings.node_limit = Some(3);
        settings.compare.seed = Some(1);
        assert_eq!(settings.tree_options().node_limit, Some(3));
        assert_eq!(settings.compare_request().seed, Some(1));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.strategy.is_none());
        assert!(raw.compare.count.is_none());
    }

    #[test]
    fn given_defaults_when_to_toml_then_omits_unset_options() {
        let text = Settings::default().to_toml().unwrap();
        assert!(text.contains("strategy = \"balance-factor\""));
        assert!(!text.contains("node_limit"));
        assert!(text.contains("[compare]"));
    }
}
