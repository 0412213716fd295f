//! In-memory store for testing.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{
    Result,
    store::UserStore,
    types::{UserRecord, UserStats, now_ms},
};

/// In-memory store backed by `HashMap`. No persistence.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<i64, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn upsert(&self, user_id: i64, joined_ok: bool) -> Result<()> {
        let now = now_ms();
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        users
            .entry(user_id)
            .and_modify(|r| {
                r.joined_ok = joined_ok;
                r.updated_at = now;
            })
            .or_insert(UserRecord {
                user_id,
                joined_ok,
                created_at: now,
                updated_at: now,
            });
        Ok(())
    }

    async fn list_all_ids(&self) -> Result<Vec<i64>> {
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        Ok(users.keys().copied().collect())
    }

    async fn get(&self, user_id: i64) -> Result<Option<UserRecord>> {
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        Ok(users.get(&user_id).cloned())
    }

    async fn stats(&self) -> Result<UserStats> {
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        Ok(UserStats {
            total: users.len() as i64,
            verified: users.values().filter(|r| r.joined_ok).count() as i64,
        })
    }
}
