//! Blocked recipient repository for usermail.
//!
//! Addresses are stored in normalized form; callers are expected to pass
//! trimmed, lowercase addresses (see [`crate::mail::normalize_recipient`]).

use sqlx::{FromRow, SqlitePool};

use crate::{Result, UsermailError};

/// A recipient that mail is no longer sent to.
#[derive(Debug, Clone, FromRow)]
pub struct BlockedEmail {
    pub id: i64,
    pub email: String,
    /// Number of failed dispatch rounds that led to the block.
    pub retry_count: i64,
    pub created_at: String,
}

/// Repository for blocked recipients.
pub struct BlockedEmailRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BlockedEmailRepository<'a> {
    /// Create a new BlockedEmailRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the block record for an address.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<BlockedEmail>> {
        let row = sqlx::query_as::<_, BlockedEmail>(
            "SELECT id, email, retry_count, created_at FROM blocked_emails WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| UsermailError::Database(e.to_string()))?;

        Ok(row)
    }

    /// Check whether an address is blocked.
    pub async fn exists(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM blocked_emails WHERE email = ?)")
                .bind(email)
                .fetch_one(self.pool)
                .await
                .map_err(|e| UsermailError::Database(e.to_string()))?;

        Ok(exists)
    }

    /// Insert a block record unless one already exists.
    ///
    /// Returns true if a new record was created.
    pub async fn create_if_absent(&self, email: &str) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO blocked_emails (email) VALUES (?) ON CONFLICT(email) DO NOTHING",
        )
        .bind(email)
        .execute(self.pool)
        .await
        .map_err(|e| UsermailError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove the block record for an address.
    ///
    /// Returns true if a record was removed.
    pub async fn delete(&self, email: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blocked_emails WHERE email = ?")
            .bind(email)
            .execute(self.pool)
            .await
            .map_err(|e| UsermailError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// List all block records, oldest first.
    pub async fn list(&self) -> Result<Vec<BlockedEmail>> {
        let rows = sqlx::query_as::<_, BlockedEmail>(
            "SELECT id, email, retry_count, created_at FROM blocked_emails ORDER BY id",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| UsermailError::Database(e.to_string()))?;

        Ok(rows)
    }
}
