//! Live channel-membership checks.
//!
//! [`MembershipChecker::status`] returns the explicit lookup result.
//! [`MembershipChecker::is_member`] collapses any error (network, unknown
//! user, bot not an admin of the channel) to "not a member" and never
//! propagates it.

use std::sync::Arc;

use tracing::{debug, warn};

use joingate_config::{ChannelConfig, RequiredChannels};

use crate::{
    Result,
    api::{BotApi, MembershipStatus},
};

pub struct MembershipChecker {
    api: Arc<dyn BotApi>,
    channels: RequiredChannels,
}

impl MembershipChecker {
    pub fn new(api: Arc<dyn BotApi>, channels: RequiredChannels) -> Self {
        Self { api, channels }
    }

    pub async fn status(&self, user_id: i64, channel: &ChannelConfig) -> Result<MembershipStatus> {
        self.api.member_status(channel, user_id).await
    }

    pub async fn is_member(&self, user_id: i64, channel: &ChannelConfig) -> bool {
        match self.status(user_id, channel).await {
            Ok(status) => {
                debug!(user_id, channel = %channel.chat, %status, "membership checked");
                status.is_member()
            },
            Err(e) => {
                warn!(
                    user_id,
                    channel = %channel.chat,
                    error = %e,
                    "membership lookup failed, treating as not joined"
                );
                false
            },
        }
    }

    /// Both channels, checked one after the other; the second lookup is
    /// skipped once the first fails.
    pub async fn joined_both(&self, user_id: i64) -> bool {
        self.is_member(user_id, &self.channels.first).await
            && self.is_member(user_id, &self.channels.second).await
    }
}
