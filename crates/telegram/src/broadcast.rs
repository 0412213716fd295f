//! Operator broadcast to every stored user.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use {joingate_config::TelegramConfig, joingate_store::UserStore};

use crate::{Result, api::BotApi};

pub const NOT_ALLOWED: &str = "Not allowed.";
pub const USAGE: &str = "Usage: /broadcast Your message";
pub const LOAD_FAILED: &str = "Broadcast failed: could not load users.";

/// Delivery tally for one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

impl std::fmt::Display for BroadcastReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "✅ Sent: {} | ❌ Failed: {}", self.sent, self.failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// Sender is not on the operator allow-list.
    Denied,
    /// Body was empty or whitespace.
    EmptyBody,
    Delivered(BroadcastReport),
}

pub struct BroadcastWorkflow {
    store: Arc<dyn UserStore>,
    api: Arc<dyn BotApi>,
    config: TelegramConfig,
}

impl BroadcastWorkflow {
    pub fn new(config: &TelegramConfig, store: Arc<dyn UserStore>, api: Arc<dyn BotApi>) -> Self {
        Self {
            store,
            api,
            config: config.clone(),
        }
    }

    /// Run `/broadcast` for `sender_id`; every reply goes to `reply_chat`.
    pub async fn run(&self, sender_id: i64, reply_chat: i64, body: &str) -> Result<BroadcastOutcome> {
        if !self.config.is_operator(sender_id) {
            warn!(sender_id, "broadcast denied, not an operator");
            self.api.send_text(reply_chat, NOT_ALLOWED, None).await?;
            return Ok(BroadcastOutcome::Denied);
        }

        let text = body.trim();
        if text.is_empty() {
            self.api.send_text(reply_chat, USAGE, None).await?;
            return Ok(BroadcastOutcome::EmptyBody);
        }

        let users = match self.store.list_all_ids().await {
            Ok(users) => users,
            Err(e) => {
                error!(sender_id, error = %e, "failed to load users for broadcast");
                self.api.send_text(reply_chat, LOAD_FAILED, None).await?;
                return Err(e.into());
            },
        };

        info!(sender_id, recipients = users.len(), "broadcast started");
        let report = self.deliver(text, &users).await;
        info!(
            sender_id,
            sent = report.sent,
            failed = report.failed,
            "broadcast finished"
        );

        self.api
            .send_text(reply_chat, &report.to_string(), None)
            .await?;
        Ok(BroadcastOutcome::Delivered(report))
    }

    /// Send to each user in turn. A failed delivery is counted and skipped.
    async fn deliver(&self, text: &str, users: &[i64]) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for &user_id in users {
            match self.api.send_text(user_id, text, None).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    debug!(user_id, error = %e, "broadcast delivery failed");
                    report.failed += 1;
                },
            }
        }
        report
    }
}
