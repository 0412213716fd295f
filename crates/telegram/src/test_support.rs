//! Scripted [`BotApi`] fake shared by the workflow tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use {async_trait::async_trait, teloxide::types::InlineKeyboardMarkup};

use joingate_config::ChannelConfig;

use crate::{
    Error, Result,
    api::{BotApi, MembershipStatus},
};

#[derive(Debug, Clone)]
pub enum ApiCall {
    MemberStatus {
        channel: String,
        user_id: i64,
    },
    Send {
        chat_id: i64,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Edit {
        chat_id: i64,
        message_id: i32,
        text: String,
    },
    Answer {
        query_id: String,
        alert: Option<String>,
    },
}

/// Records every call. Membership lookups without a scripted status fail,
/// as do sends to chats marked with [`FakeApi::fail_sends_to`].
#[derive(Default)]
pub struct FakeApi {
    statuses: Mutex<HashMap<(String, i64), MembershipStatus>>,
    failing_chats: Mutex<HashSet<i64>>,
    fail_edits: Mutex<bool>,
    calls: Mutex<Vec<ApiCall>>,
}

impl FakeApi {
    pub fn set_status(&self, channel: &str, user_id: i64, status: MembershipStatus) {
        self.statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((channel.to_string(), user_id), status);
    }

    pub fn fail_sends_to(&self, chat_id: i64) {
        self.failing_chats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(chat_id);
    }

    pub fn fail_edits(&self) {
        *self.fail_edits.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// `(chat_id, text)` of every attempted send, failed ones included.
    pub fn sends(&self) -> Vec<(i64, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Send { chat_id, text, .. } => Some((chat_id, text)),
                _ => None,
            })
            .collect()
    }

    pub fn member_lookups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::MemberStatus { channel, .. } => Some(channel),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl BotApi for FakeApi {
    async fn member_status(
        &self,
        channel: &ChannelConfig,
        user_id: i64,
    ) -> Result<MembershipStatus> {
        self.record(ApiCall::MemberStatus {
            channel: channel.chat.clone(),
            user_id,
        });
        self.statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(channel.chat.clone(), user_id))
            .copied()
            .ok_or_else(|| Error::message("Bad Request: user not found"))
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.record(ApiCall::Send {
            chat_id,
            text: text.to_string(),
            keyboard,
        });
        let failing = self
            .failing_chats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&chat_id);
        if failing {
            return Err(Error::message("Forbidden: bot was blocked by the user"));
        }
        Ok(())
    }

    async fn edit_text(&self, chat_id: i64, message_id: i32, text: &str) -> Result<()> {
        self.record(ApiCall::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        if *self.fail_edits.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(Error::message("Bad Request: message can't be edited"));
        }
        Ok(())
    }

    async fn answer_callback(&self, query_id: &str, alert: Option<&str>) -> Result<()> {
        self.record(ApiCall::Answer {
            query_id: query_id.to_string(),
            alert: alert.map(str::to_string),
        });
        Ok(())
    }
}
