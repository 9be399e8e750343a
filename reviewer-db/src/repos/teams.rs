//! Team repository: teams and their membership

use crate::error::{DbError, Result};
use crate::models::{MemberRow, NewMember, TeamRecord, TeamRow};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Repository for managing teams
pub struct TeamRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TeamRepository<'a> {
    /// Create a new team repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a team and upsert its members in one transaction.
    ///
    /// Users that already exist are moved into the new team and their
    /// username and activity flag are overwritten.
    /// Returns [`DbError::TeamExists`] if the name is taken.
    pub async fn create_with_members(
        &self,
        team_name: &str,
        members: &[NewMember],
    ) -> Result<TeamRecord> {
        let mut tx = self.pool.begin().await?;

        let team_id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO teams (team_name, created_at)
            VALUES (?, ?)
            ON CONFLICT (team_name) DO NOTHING
            RETURNING team_id
            "#,
        )
        .bind(team_name)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let team_id = team_id.ok_or_else(|| DbError::TeamExists(team_name.to_string()))?;

        for member in members {
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, team_id, is_active)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (user_id) DO UPDATE SET
                    username = excluded.username,
                    team_id = excluded.team_id,
                    is_active = excluded.is_active
                "#,
            )
            .bind(&member.user_id)
            .bind(&member.username)
            .bind(team_id)
            .bind(member.is_active)
            .execute(&mut *tx)
            .await?;
        }

        let members = Self::members_of(&mut tx, team_id).await?;
        tx.commit().await?;

        Ok(TeamRecord {
            team_id,
            team_name: team_name.to_string(),
            members,
        })
    }

    /// Get a team with all of its members by name
    pub async fn get_by_name(&self, team_name: &str) -> Result<TeamRecord> {
        let mut tx = self.pool.begin().await?;

        let team = sqlx::query_as::<_, TeamRow>(
            "SELECT team_id, team_name FROM teams WHERE team_name = ?",
        )
        .bind(team_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::TeamNotFound(team_name.to_string()))?;

        let members = Self::members_of(&mut tx, team.team_id).await?;
        tx.commit().await?;

        Ok(TeamRecord {
            team_id: team.team_id,
            team_name: team.team_name,
            members,
        })
    }

    /// List active members of a team.
    ///
    /// An unknown team or a team without active members yields an empty list.
    pub async fn list_active_members(&self, team_id: i64) -> Result<Vec<MemberRow>> {
        sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT user_id, username, is_active
            FROM users
            WHERE team_id = ? AND is_active = 1
            ORDER BY user_id
            "#,
        )
        .bind(team_id)
        .fetch_all(self.pool)
        .await
        .map_err(Into::into)
    }

    async fn members_of(tx: &mut Transaction<'_, Sqlite>, team_id: i64) -> Result<Vec<MemberRow>> {
        sqlx::query_as::<_, MemberRow>(
            "SELECT user_id, username, is_active FROM users WHERE team_id = ? ORDER BY user_id",
        )
        .bind(team_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, DatabaseConfig};
    use tempfile::TempDir;

    async fn setup_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let config = DatabaseConfig::new(&db_path);
        let db = Database::connect(config).await.unwrap();
        db.migrate().await.unwrap();
        (db, temp_dir)
    }

    fn member(id: &str, active: bool) -> NewMember {
        NewMember {
            user_id: id.to_string(),
            username: format!("name-{}", id),
            is_active: active,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_team() {
        let (db, _temp) = setup_test_db().await;
        let repo = TeamRepository::new(db.pool());

        let created = repo
            .create_with_members("backend", &[member("u1", true), member("u2", false)])
            .await
            .unwrap();
        assert_eq!(created.team_name, "backend");
        assert_eq!(created.members.len(), 2);

        let fetched = repo.get_by_name("backend").await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_duplicate_team_name_is_rejected() {
        let (db, _temp) = setup_test_db().await;
        let repo = TeamRepository::new(db.pool());

        repo.create_with_members("backend", &[member("u1", true)])
            .await
            .unwrap();
        let err = repo
            .create_with_members("backend", &[member("u9", true)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::TeamExists(name) if name == "backend"));

        // The rejected request must not have created its members
        let exists: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM users WHERE user_id = 'u9'")
                .fetch_optional(db.pool())
                .await
                .unwrap();
        assert!(exists.is_none());
    }

    #[tokio::test]
    async fn test_existing_user_moves_to_new_team() {
        let (db, _temp) = setup_test_db().await;
        let repo = TeamRepository::new(db.pool());

        let first = repo
            .create_with_members("backend", &[member("u1", true), member("u2", true)])
            .await
            .unwrap();
        let second = repo
            .create_with_members("frontend", &[member("u2", false)])
            .await
            .unwrap();

        let backend = repo.get_by_name("backend").await.unwrap();
        assert_eq!(backend.members.len(), 1);
        assert_eq!(second.members[0].user_id, "u2");
        assert!(!second.members[0].is_active);
        assert_ne!(first.team_id, second.team_id);
    }

    #[tokio::test]
    async fn test_list_active_members() {
        let (db, _temp) = setup_test_db().await;
        let repo = TeamRepository::new(db.pool());

        let team = repo
            .create_with_members(
                "backend",
                &[member("u1", true), member("u2", false), member("u3", true)],
            )
            .await
            .unwrap();

        let active = repo.list_active_members(team.team_id).await.unwrap();
        let ids: Vec<_> = active.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u3"]);

        assert!(repo.list_active_members(9999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_team() {
        let (db, _temp) = setup_test_db().await;
        let repo = TeamRepository::new(db.pool());

        assert!(matches!(
            repo.get_by_name("nope").await,
            Err(DbError::TeamNotFound(_))
        ));
        assert!(repo.list_active_members(42).await.unwrap().is_empty());
    }
}
