//! User repository

use crate::error::{DbError, Result};
use crate::models::UserRow;
use sqlx::SqlitePool;

const SELECT_USER: &str = r#"
    SELECT u.user_id, u.username, u.team_id, t.team_name, u.is_active
    FROM users u
    INNER JOIN teams t ON t.team_id = u.team_id
    WHERE u.user_id = ?
"#;

/// Repository for user records
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user with its team name
    pub async fn get_by_id(&self, user_id: &str) -> Result<UserRow> {
        sqlx::query_as::<_, UserRow>(SELECT_USER)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::UserNotFound(user_id.to_string()))
    }

    /// Set the activity flag of a user and return the updated record
    pub async fn set_is_active(&self, user_id: &str, is_active: bool) -> Result<UserRow> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
            .bind(is_active)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::UserNotFound(user_id.to_string()));
        }

        let user = sqlx::query_as::<_, UserRow>(SELECT_USER)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(user)
    }
}
