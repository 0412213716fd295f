use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JoingateConfig {
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
}

/// Bot credentials, gating channels and operator allow-list.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// The two channels a user must join.
    pub channels: RequiredChannels,

    /// User IDs allowed to run `/broadcast`. Empty means nobody.
    pub operators: Vec<i64>,

    /// Text that replaces the welcome message once both channels are joined.
    pub success_message: String,

    /// Long-polling timeout passed to `getUpdates` (seconds).
    pub poll_timeout_secs: u32,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("channels", &self.channels)
            .field("operators", &self.operators)
            .finish_non_exhaustive()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            channels: RequiredChannels::default(),
            operators: Vec::new(),
            success_message: "✅ Access granted!".into(),
            poll_timeout_secs: 30,
        }
    }
}

impl TelegramConfig {
    #[must_use]
    pub fn is_operator(&self, user_id: i64) -> bool {
        self.operators.contains(&user_id)
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// The pair of channels gating access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequiredChannels {
    pub first: ChannelConfig,
    pub second: ChannelConfig,
}

impl Default for RequiredChannels {
    fn default() -> Self {
        Self {
            first: ChannelConfig::new("@channel1"),
            second: ChannelConfig::new("@channel2"),
        }
    }
}

impl RequiredChannels {
    pub fn iter(&self) -> impl Iterator<Item = &ChannelConfig> {
        [&self.first, &self.second].into_iter()
    }
}

/// A single gating channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// `@username` or numeric chat ID (e.g. `-1001234567890`).
    pub chat: String,

    /// Join link shown on the welcome keyboard. Derived from `chat` when it
    /// is a public `@username`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_link: Option<String>,
}

impl ChannelConfig {
    pub fn new(chat: impl Into<String>) -> Self {
        Self {
            chat: chat.into(),
            invite_link: None,
        }
    }

    /// Public username without the leading `@`, if the chat is addressed by name.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.chat
            .strip_prefix('@')
            .filter(|name| !name.is_empty())
    }

    /// Numeric chat ID, if the chat is addressed by ID.
    #[must_use]
    pub fn numeric_id(&self) -> Option<i64> {
        self.chat.parse().ok()
    }

    /// Link users follow to join the channel.
    #[must_use]
    pub fn join_url(&self) -> Option<String> {
        self.invite_link
            .clone()
            .or_else(|| self.username().map(|name| format!("https://t.me/{name}")))
    }
}

/// Database location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file path. Defaults to `<data_dir>/users.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}
