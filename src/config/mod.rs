//! Harness configuration: serial timing, per-board command budgets and
//! firmware settle delays, inventory location, bench policy and logging.
//!
//! Every value has a default suited to bench hardware, so running without a
//! `blehil.toml` is normal. See [`ConfigLoader::load`] for the search path
//! and the environment overrides.
//!
//! ```rust,no_run
//! use blehil::config::ConfigLoader;
//!
//! let config = ConfigLoader::load()?.into_config();
//! println!("inventory at {}", config.inventory.path.display());
//! println!("BX310X budget {:?}", config.boards.euler.command_timeout());
//! # Ok::<(), blehil::config::ConfigError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{
    BenchConfig, BoardsConfig, Config, EddingtonConfig, EulerConfig, InventoryConfig, LogFormat,
    LoggingConfig, MelodyConfig, SerialConfig,
};
