use std::{sync::Arc, time::Duration};

use {
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, Update, UpdateKind},
    },
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use {joingate_config::TelegramConfig, joingate_store::UserStore};

use crate::{
    Error, Result, commands::bot_commands, handlers, outbound::TelegramApi, state::AppContext,
};

/// Headroom on top of the long-poll timeout for the HTTP client.
const CLIENT_TIMEOUT_MARGIN_SECS: u64 = 15;
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// A bot whose credentials have been verified.
pub struct Connection {
    pub bot: Bot,
    pub username: Option<String>,
}

/// Build a bot whose HTTP client outlives a long-poll request, so the
/// client never aborts before Telegram answers.
pub fn build_bot(config: &TelegramConfig) -> Result<Bot> {
    let timeout = u64::from(config.poll_timeout_secs) + CLIENT_TIMEOUT_MARGIN_SECS;
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(timeout))
        .build()
        .map_err(|e| Error::external("failed to build telegram client", e))?;
    Ok(Bot::with_client(config.token.expose_secret(), client))
}

/// Verify the token, clear any webhook and register slash commands.
pub async fn connect(bot: Bot) -> Result<Connection> {
    let me = bot.get_me().await?;
    let username = me.username.clone();

    // Long polling is rejected while a webhook is set.
    bot.delete_webhook().send().await?;

    if let Err(e) = bot.set_my_commands(bot_commands()).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(username = ?username, "telegram bot connected (webhook cleared)");
    Ok(Connection { bot, username })
}

/// Running polling loop.
pub struct PollingHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Cancelled on shutdown, and by the loop itself when another instance
    /// takes over the token.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop polling and wait for the in-flight update to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "telegram polling task panicked");
        }
    }
}

/// Spawn the long-polling loop. Updates are handled one at a time, in order.
pub fn start_polling(
    connection: Connection,
    config: TelegramConfig,
    store: Arc<dyn UserStore>,
) -> PollingHandle {
    let Connection { bot, username } = connection;
    let poll_timeout = config.poll_timeout_secs;
    let api = Arc::new(TelegramApi::new(bot.clone()));
    let ctx = AppContext::new(config, store, api, username);

    let cancel = CancellationToken::new();
    let task = tokio::spawn(poll_loop(bot, ctx, poll_timeout, cancel.clone()));
    PollingHandle { cancel, task }
}

async fn poll_loop(bot: Bot, ctx: AppContext, poll_timeout: u32, cancel: CancellationToken) {
    info!("starting telegram polling loop");
    let mut offset: i32 = 0;

    loop {
        let request = bot
            .get_updates()
            .offset(offset)
            .timeout(poll_timeout)
            .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
            .send();

        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = request => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "got telegram updates");
                for update in updates {
                    offset = update.id.as_offset();
                    dispatch(update, &ctx).await;
                }
            },
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                warn!("telegram polling disabled: another instance is running with this token");
                cancel.cancel();
                break;
            },
            Err(e) => {
                warn!(error = %e, "telegram getUpdates failed");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => {},
                }
            },
        }
    }

    info!("telegram polling stopped");
}

/// Route one update. Handler errors are logged and never stop the loop.
async fn dispatch(update: Update, ctx: &AppContext) {
    match update.kind {
        UpdateKind::Message(msg) => {
            let chat_id = msg.chat.id.0;
            debug!(chat_id, "received telegram message");
            if let Err(e) = handlers::handle_message(msg, ctx).await {
                error!(chat_id, error = %e, "error handling telegram message");
            }
        },
        UpdateKind::CallbackQuery(query) => {
            debug!(callback_data = ?query.data, "received telegram callback query");
            if let Err(e) = handlers::handle_callback_query(query, ctx).await {
                error!(error = %e, "error handling telegram callback query");
            }
        },
        other => debug!("ignoring update: {other:?}"),
    }
}
