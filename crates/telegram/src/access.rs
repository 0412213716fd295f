//! The `/start` → "Check" cycle.
//!
//! A user's gate state is implicit in their stored record: no record means
//! unknown, `joined_ok = false` means pending, `joined_ok = true` means
//! verified. `/start` always writes pending, including for verified users.

use std::sync::Arc;

use tracing::{info, warn};

use {
    joingate_config::{RequiredChannels, TelegramConfig},
    joingate_store::UserStore,
};

use crate::{Result, api::BotApi, keyboard::join_keyboard, membership::MembershipChecker};

pub const NOT_JOINED_ALERT: &str = "You haven't joined both channels.";
pub const RETRY_ALERT: &str = "Something went wrong. Please tap ✅ Check again.";

/// Where the "Check" button lives, so it can be replaced with the success text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonMessage {
    pub chat_id: i64,
    pub message_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Verified,
    NotJoined,
}

pub fn welcome_text(channels: &RequiredChannels) -> String {
    format!(
        "Welcome!\nJoin both channels:\n{}\n{}\nTap ✅ Check after joining.",
        channels.first.chat, channels.second.chat
    )
}

pub struct AccessWorkflow {
    store: Arc<dyn UserStore>,
    api: Arc<dyn BotApi>,
    membership: MembershipChecker,
    channels: RequiredChannels,
    success_message: String,
}

impl AccessWorkflow {
    pub fn new(config: &TelegramConfig, store: Arc<dyn UserStore>, api: Arc<dyn BotApi>) -> Self {
        Self {
            membership: MembershipChecker::new(Arc::clone(&api), config.channels.clone()),
            store,
            api,
            channels: config.channels.clone(),
            success_message: config.success_message.clone(),
        }
    }

    /// Record the user as pending and send the welcome text with join links.
    pub async fn start(&self, user_id: i64, chat_id: i64) -> Result<()> {
        self.store.upsert(user_id, false).await?;
        self.api
            .send_text(
                chat_id,
                &welcome_text(&self.channels),
                Some(join_keyboard(&self.channels)),
            )
            .await?;
        info!(user_id, chat_id, "sent welcome");
        Ok(())
    }

    /// Handle a press of the "Check" button.
    ///
    /// On success the user is stored as verified and the button message is
    /// replaced with the success text. Otherwise only an alert is shown and
    /// the stored record is left as is. The callback is answered on every
    /// path, including when storing or showing the result fails.
    pub async fn check(
        &self,
        user_id: i64,
        query_id: &str,
        button: Option<ButtonMessage>,
    ) -> Result<CheckOutcome> {
        if !self.membership.joined_both(user_id).await {
            self.api
                .answer_callback(query_id, Some(NOT_JOINED_ALERT))
                .await?;
            info!(user_id, "check failed, channels not joined");
            return Ok(CheckOutcome::NotJoined);
        }

        if let Err(e) = self.grant(user_id, button).await {
            // The button press still gets an answer so the client stops waiting.
            if let Err(answer_err) = self.api.answer_callback(query_id, Some(RETRY_ALERT)).await {
                warn!(user_id, error = %answer_err, "failed to answer check callback");
            }
            return Err(e);
        }
        self.api.answer_callback(query_id, None).await?;
        info!(user_id, "user verified");
        Ok(CheckOutcome::Verified)
    }

    async fn grant(&self, user_id: i64, button: Option<ButtonMessage>) -> Result<()> {
        self.store.upsert(user_id, true).await?;
        self.show_success(user_id, button).await
    }

    /// Edit the button message in place; when that is impossible (message
    /// gone or too old) send the success text as a fresh message instead.
    async fn show_success(&self, user_id: i64, button: Option<ButtonMessage>) -> Result<()> {
        if let Some(b) = button {
            match self
                .api
                .edit_text(b.chat_id, b.message_id, &self.success_message)
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(user_id, chat_id = b.chat_id, error = %e, "failed to edit check message");
                },
            }
        }
        let chat_id = button.map_or(user_id, |b| b.chat_id);
        self.api
            .send_text(chat_id, &self.success_message, None)
            .await
    }
}
