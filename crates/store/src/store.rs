//! Persistence trait for user records.

use async_trait::async_trait;

use crate::{
    Result,
    types::{UserRecord, UserStats},
};

/// Durable mapping from user ID to gate status.
///
/// Every method is a single self-contained statement; there are no
/// multi-record transactions.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert with `joined_ok`, or update `joined_ok` and `updated_at` in place.
    async fn upsert(&self, user_id: i64, joined_ok: bool) -> Result<()>;
    /// All known user IDs, in no particular order.
    async fn list_all_ids(&self) -> Result<Vec<i64>>;
    async fn get(&self, user_id: i64) -> Result<Option<UserRecord>>;
    async fn stats(&self) -> Result<UserStats>;
}
