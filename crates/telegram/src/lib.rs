//! Telegram side of joingate.
//!
//! Long-polls the Bot API with teloxide, gates users behind membership of two
//! channels and lets operators broadcast to every user who ever pressed
//! `/start`.

pub mod access;
pub mod api;
pub mod bot;
pub mod broadcast;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod keyboard;
pub mod membership;
pub mod outbound;
pub mod state;

#[cfg(test)]
mod test_support;

pub use {
    access::{AccessWorkflow, CheckOutcome},
    api::{BotApi, MembershipStatus},
    bot::{Connection, PollingHandle, build_bot, connect, start_polling},
    broadcast::{BroadcastOutcome, BroadcastReport, BroadcastWorkflow},
    error::{Error, Result},
    membership::MembershipChecker,
    outbound::TelegramApi,
    state::AppContext,
};
