//! User persistence for the gate bot.
//!
//! One record per Telegram user: whether they have been verified as a member
//! of both required channels, plus creation and last-update timestamps.

pub mod error;
pub mod store;
pub mod store_memory;
pub mod store_sqlite;
pub mod types;

pub use {
    error::{Error, Result},
    store::UserStore,
    store_memory::InMemoryUserStore,
    store_sqlite::SqliteUserStore,
    types::{UserRecord, UserStats},
};

/// Run database migrations for the store crate.
///
/// Creates the `users` table. Call at startup before
/// [`SqliteUserStore::with_pool`].
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
