//! Configuration file loading for synod
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SYNOD_`-prefixed environment variables (`SYNOD_ENGINE__MAX_TICKS=50`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./synod.toml` or `./.synod.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/synod/config.toml`
//! 5. Default values

mod error;
mod file_config;
mod loader;

pub use error::ConfigValidationError;
pub use file_config::{
    FileConfig, FileEngineConfig, FileGovernanceConfig, FileLearnedOverride, FileLoggingConfig,
    FilePacingConfig,
};
pub use loader::ConfigLoader;
