use {
    teloxide::types::{CallbackQuery, Message, User},
    tracing::debug,
};

use crate::{
    Result,
    access::ButtonMessage,
    commands::{Command, parse_command},
    keyboard::CHECK_CALLBACK,
    state::AppContext,
};

fn user_id_of(user: &User) -> i64 {
    user.id.0 as i64
}

/// Handle a single inbound Telegram message (called from the polling loop).
///
/// Only `/start` and `/broadcast` are acted on; everything else is ignored.
pub async fn handle_message(msg: Message, ctx: &AppContext) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
        return Ok(());
    };
    let Some(command) = parse_command(text, ctx.bot_username.as_deref()) else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-command message");
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        debug!(chat_id = msg.chat.id.0, "ignoring command without sender");
        return Ok(());
    };

    let user_id = user_id_of(user);
    let chat_id = msg.chat.id.0;
    debug!(user_id, chat_id, ?command, "handling command");

    match command {
        Command::Start => ctx.access.start(user_id, chat_id).await,
        Command::Broadcast(body) => {
            ctx.broadcast.run(user_id, chat_id, &body).await?;
            Ok(())
        },
    }
}

/// Handle a Telegram callback query (inline keyboard button press).
pub async fn handle_callback_query(query: CallbackQuery, ctx: &AppContext) -> Result<()> {
    let user_id = user_id_of(&query.from);

    if query.data.as_deref() != Some(CHECK_CALLBACK) {
        debug!(user_id, data = ?query.data, "ignoring unknown callback");
        // Dismiss the client's loading spinner anyway.
        return ctx.api.answer_callback(&query.id, None).await;
    }

    let button = query.message.as_ref().map(|m| ButtonMessage {
        chat_id: m.chat().id.0,
        message_id: m.id().0,
    });
    ctx.access.check(user_id, &query.id, button).await?;
    Ok(())
}
