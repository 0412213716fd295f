use {
    teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup},
    tracing::warn,
};

use joingate_config::RequiredChannels;

/// Callback data carried by the "Check" button.
pub const CHECK_CALLBACK: &str = "check";

/// One "Join Channel N" URL button per channel that has a usable link, then
/// the "✅ Check" callback button.
pub fn join_keyboard(channels: &RequiredChannels) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = channels
        .iter()
        .enumerate()
        .filter_map(|(i, channel)| {
            let link = channel.join_url()?;
            match reqwest::Url::parse(&link) {
                Ok(url) => Some(vec![InlineKeyboardButton::url(
                    format!("Join Channel {}", i + 1),
                    url,
                )]),
                Err(e) => {
                    warn!(channel = %channel.chat, link, error = %e, "skipping invalid join link");
                    None
                },
            }
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        "✅ Check",
        CHECK_CALLBACK,
    )]);
    InlineKeyboardMarkup::new(rows)
}
