//! Semantic checks on a loaded configuration.

use secrecy::ExposeSecret;

use crate::schema::{ChannelConfig, JoingateConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "telegram.channels.first.chat"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &JoingateConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    let tg = &config.telegram;

    if tg.token.expose_secret().trim().is_empty() {
        result.push(
            Severity::Error,
            "telegram.token",
            "bot token is empty (set BOT_TOKEN or telegram.token)",
        );
    }

    check_channel(&mut result, "telegram.channels.first", &tg.channels.first);
    check_channel(&mut result, "telegram.channels.second", &tg.channels.second);

    if !tg.channels.first.chat.is_empty()
        && tg.channels.first.chat.eq_ignore_ascii_case(&tg.channels.second.chat)
    {
        result.push(
            Severity::Error,
            "telegram.channels",
            "both required channels are the same chat",
        );
    }

    if tg.success_message.trim().is_empty() {
        result.push(
            Severity::Error,
            "telegram.success_message",
            "success message is empty",
        );
    }

    if tg.operators.is_empty() {
        result.push(
            Severity::Warning,
            "telegram.operators",
            "no operators configured, /broadcast is disabled",
        );
    }

    result
}

fn check_channel(result: &mut ValidationResult, path: &str, channel: &ChannelConfig) {
    let chat_path = format!("{path}.chat");
    let chat = channel.chat.trim();
    if chat.is_empty() {
        result.push(Severity::Error, &chat_path, "channel is empty");
        return;
    }
    if channel.username().is_none() && channel.numeric_id().is_none() {
        result.push(
            Severity::Error,
            &chat_path,
            format!("`{chat}` is neither an @username nor a numeric chat id"),
        );
        return;
    }
    if channel.join_url().is_none() {
        result.push(
            Severity::Warning,
            &format!("{path}.invite_link"),
            "numeric channel without invite_link gets no join button",
        );
    }
}
