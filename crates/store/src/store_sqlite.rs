//! SQLite-backed user store using sqlx.

use {
    async_trait::async_trait,
    sqlx::{SqlitePool, sqlite::SqlitePoolOptions},
    tracing::debug,
};

use crate::{
    Result,
    store::UserStore,
    types::{UserRecord, UserStats, now_ms},
};

/// SQLite-backed persistence for user records.
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Create a new store with its own connection pool and run migrations.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        crate::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a store using an existing pool (migrations must already be run).
    ///
    /// Call [`crate::run_migrations`] before using this constructor.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn upsert(&self, user_id: i64, joined_ok: bool) -> Result<()> {
        let now = now_ms();
        sqlx::query(
            "INSERT INTO users (user_id, joined_ok, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                joined_ok  = excluded.joined_ok,
                updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(joined_ok)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        debug!(user_id, joined_ok, "upserted user");
        Ok(())
    }

    async fn list_all_ids(&self) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT user_id FROM users")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn get(&self, user_id: i64) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, (i64, bool, i64, i64)>(
            "SELECT user_id, joined_ok, created_at, updated_at
             FROM users
             WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserRecord {
            user_id: r.0,
            joined_ok: r.1,
            created_at: r.2,
            updated_at: r.3,
        }))
    }

    async fn stats(&self) -> Result<UserStats> {
        let (total, verified) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN joined_ok THEN 1 ELSE 0 END), 0)
             FROM users",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(UserStats { total, verified })
    }
}
