//! The slice of the Bot API the gate needs, behind a trait so workflows can
//! run against a fake in tests.

use {async_trait::async_trait, teloxide::types::InlineKeyboardMarkup};

use joingate_config::ChannelConfig;

use crate::Result;

/// A user's relationship to a chat as reported by `getChatMember`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MembershipStatus {
    /// Only creators, administrators and plain members pass the gate.
    #[must_use]
    pub fn is_member(self) -> bool {
        matches!(self, Self::Creator | Self::Administrator | Self::Member)
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Creator => "creator",
            Self::Administrator => "administrator",
            Self::Member => "member",
            Self::Restricted => "restricted",
            Self::Left => "left",
            Self::Banned => "banned",
        };
        f.write_str(s)
    }
}

#[async_trait]
pub trait BotApi: Send + Sync {
    /// `getChatMember` for `user_id` in `channel`.
    async fn member_status(&self, channel: &ChannelConfig, user_id: i64)
    -> Result<MembershipStatus>;

    /// `sendMessage` to a chat, optionally with an inline keyboard.
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    /// `editMessageText`; drops any inline keyboard on the message.
    async fn edit_text(&self, chat_id: i64, message_id: i32, text: &str) -> Result<()>;

    /// `answerCallbackQuery`; `alert` shows a modal instead of nothing.
    async fn answer_callback(&self, query_id: &str, alert: Option<&str>) -> Result<()>;
}
