//! Finding, reading and overriding the harness configuration.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const ENV_PREFIX: &str = "BLEHIL";
const CONFIG_FILE_NAME: &str = "blehil.toml";
/// Names a configuration file explicitly, ahead of the search path.
const CONFIG_PATH_ENV: &str = "BLEHIL_CONFIG";

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// File the configuration came from, `None` for built-in defaults.
    pub config_path: Option<PathBuf>,
    pub config: Config,
}

impl ConfigLoader {
    /// Load from the first file on the search path, or defaults.
    ///
    /// Search order:
    /// 1. the file named by `BLEHIL_CONFIG`
    /// 2. `./blehil.toml`
    /// 3. `blehil.toml` in the platform configuration directory
    ///
    /// `BLEHIL_<SECTION>_<KEY>` variables are applied on top.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();
        let mut config = match &config_path {
            Some(path) => load_from_file(path)?,
            None => Config::default(),
        };
        apply_env_overrides(&mut config)?;
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load `path`, then apply environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;
        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Defaults plus environment overrides. Malformed overrides are
    /// logged and skipped.
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        if let Err(e) = apply_env_overrides(&mut config) {
            tracing::warn!(error = %e, "ignoring malformed environment override");
        }
        Self {
            config_path: None,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        save_to_file(&self.config, path.as_ref())
    }
}

/// First existing file on the search path.
pub fn resolve_config_path() -> Option<PathBuf> {
    let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let local = Some(PathBuf::from(CONFIG_FILE_NAME));
    [explicit, local, get_default_config_path()]
        .into_iter()
        .flatten()
        .find(|path| path.exists())
}

/// Platform configuration directory, e.g. `~/.config/blehil` on Linux.
pub fn get_default_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "blehil").map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn save_to_file(config: &Config, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn env_var(key: &str) -> Option<(String, String)> {
    let var = format!("{}_{}", ENV_PREFIX, key);
    std::env::var(&var).ok().map(|val| (var, val))
}

fn parse_env<T: FromStr>(var: &str, val: &str, expected: &'static str) -> ConfigResult<T> {
    val.trim().parse().map_err(|_| ConfigError::InvalidOverride {
        var: var.to_owned(),
        value: val.to_owned(),
        expected,
    })
}

/// Overrides recognised:
/// - `BLEHIL_INVENTORY_PATH=/etc/bench/devices.json`
/// - `BLEHIL_LOGGING_LEVEL=blehil=debug`
/// - `BLEHIL_LOGGING_FILE=/var/log/bench.log`
/// - `BLEHIL_SERIAL_POLL_INTERVAL_MS=20`
/// - `BLEHIL_SERIAL_OPEN_SETTLE_MS=0`
/// - `BLEHIL_BENCH_RESET_ATTEMPTS=3`
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    if let Some((_, val)) = env_var("INVENTORY_PATH") {
        config.inventory.path = PathBuf::from(val);
    }

    if let Some((_, val)) = env_var("LOGGING_LEVEL") {
        config.logging.level = val;
    }
    if let Some((_, val)) = env_var("LOGGING_FILE") {
        config.logging.file = Some(PathBuf::from(val));
    }

    if let Some((var, val)) = env_var("SERIAL_POLL_INTERVAL_MS") {
        config.serial.poll_interval_ms = parse_env(&var, &val, "interval")?;
    }
    if let Some((var, val)) = env_var("SERIAL_OPEN_SETTLE_MS") {
        config.serial.open_settle_ms = parse_env(&var, &val, "delay")?;
    }

    if let Some((var, val)) = env_var("BENCH_RESET_ATTEMPTS") {
        config.bench.reset_attempts = parse_env(&var, &val, "attempt count")?;
    }

    Ok(())
}
