//! Configuration loading, env substitution and validation.
//!
//! Config files: `joingate.toml`, `joingate.yaml` or `joingate.json`,
//! searched in `./` then `~/.config/joingate/`. The bot's environment
//! variables (`BOT_TOKEN`, `CHANNEL_1`, ...) override file values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{
        apply_env_overrides, config_dir, data_dir, database_path, discover_and_load, load,
        load_config,
    },
    schema::{ChannelConfig, JoingateConfig, RequiredChannels, StorageConfig, TelegramConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
