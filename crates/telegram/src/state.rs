use std::sync::Arc;

use {joingate_config::TelegramConfig, joingate_store::UserStore};

use crate::{access::AccessWorkflow, api::BotApi, broadcast::BroadcastWorkflow};

/// Everything a handler needs, built once at startup and owned by the
/// polling task.
pub struct AppContext {
    pub api: Arc<dyn BotApi>,
    /// Used to accept `/cmd@username` mentions addressed to this bot.
    pub bot_username: Option<String>,
    pub access: AccessWorkflow,
    pub broadcast: BroadcastWorkflow,
}

impl AppContext {
    pub fn new(
        config: TelegramConfig,
        store: Arc<dyn UserStore>,
        api: Arc<dyn BotApi>,
        bot_username: Option<String>,
    ) -> Self {
        let access = AccessWorkflow::new(&config, Arc::clone(&store), Arc::clone(&api));
        let broadcast = BroadcastWorkflow::new(&config, store, Arc::clone(&api));
        Self {
            api,
            bot_username,
            access,
            broadcast,
        }
    }
}
