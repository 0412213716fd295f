use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::JoingateConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "joingate.toml",
    "joingate.yaml",
    "joingate.yml",
    "joingate.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<JoingateConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.display().to_string(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./joingate.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/joingate/joingate.{toml,yaml,yml,json}` (user-global)
///
/// Returns `JoingateConfig::default()` if no config file is found or the one
/// found cannot be parsed.
pub fn discover_and_load() -> JoingateConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    JoingateConfig::default()
}

/// Load from `explicit` when given (errors propagate), otherwise discover,
/// then apply environment overrides.
pub fn load(explicit: Option<&Path>) -> Result<JoingateConfig> {
    let mut config = match explicit {
        Some(path) => load_config(path)?,
        None => discover_and_load(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/joingate/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "joingate").map(|d| d.config_dir().to_path_buf())
}

/// Returns the user data directory, falling back to `./data`.
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "joingate")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Resolve the SQLite file: the configured path, else `<data_dir>/users.db`.
pub fn database_path(config: &JoingateConfig, data_dir: &Path) -> PathBuf {
    config
        .storage
        .database
        .clone()
        .unwrap_or_else(|| data_dir.join("users.db"))
}

/// Apply the bot's environment variables on top of file config.
///
/// `BOT_TOKEN`, `CHANNEL_1`, `CHANNEL_2`, `ADMIN_IDS` (comma separated),
/// `SUCCESS_MESSAGE` and `JOINGATE_DATABASE`.
pub fn apply_env_overrides(config: &mut JoingateConfig) -> Result<()> {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    config: &mut JoingateConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let tg = &mut config.telegram;

    if let Some(token) = lookup("BOT_TOKEN") {
        tg.token = Secret::new(token);
    }
    if let Some(chat) = lookup("CHANNEL_1") {
        tg.channels.first.chat = chat.trim().to_string();
    }
    if let Some(chat) = lookup("CHANNEL_2") {
        tg.channels.second.chat = chat.trim().to_string();
    }
    if let Some(ids) = lookup("ADMIN_IDS") {
        tg.operators = parse_id_list(&ids)
            .map_err(|e| Error::invalid_env("ADMIN_IDS", e.to_string()))?;
    }
    if let Some(text) = lookup("SUCCESS_MESSAGE") {
        tg.success_message = text;
    }
    if let Some(path) = lookup("JOINGATE_DATABASE") {
        config.storage.database = Some(PathBuf::from(path));
    }
    Ok(())
}

/// Parse `"1, 2,,3"` into `[1, 2, 3]`; blank entries are skipped.
fn parse_id_list(raw: &str) -> std::result::Result<Vec<i64>, std::num::ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

fn parse_config(raw: &str, path: &Path) -> Result<JoingateConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        other => Err(Error::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}
