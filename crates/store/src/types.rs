/// A user who has sent `/start` at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: i64,
    /// `true` once both channels were confirmed joined.
    pub joined_ok: bool,
    /// Unix millis, set on insert only.
    pub created_at: i64,
    /// Unix millis, refreshed on every write.
    pub updated_at: i64,
}

/// Aggregate counts over all stored users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: i64,
    pub verified: i64,
}

pub(crate) fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
