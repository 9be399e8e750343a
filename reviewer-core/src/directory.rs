//! Team directory: users, teams and their active members

use async_trait::async_trait;

use crate::domain::{Member, Team, User};
use crate::Result;

/// Source of truth for teams and their membership
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// Look up a user; fails with `UserNotFound` if absent
    async fn get_user(&self, user_id: &str) -> Result<User>;

    /// Active members of a team.
    ///
    /// An unknown team or a team without active members yields an empty list.
    async fn get_active_members(&self, team_id: i64) -> Result<Vec<Member>>;

    /// Create a team and upsert its members atomically.
    ///
    /// Existing users are moved into the new team and take the supplied
    /// username and activity flag.
    async fn create_team(&self, team_name: &str, members: &[Member]) -> Result<Team>;

    /// Team with all of its members; fails with `TeamNotFound` if absent
    async fn get_team(&self, team_name: &str) -> Result<Team>;

    /// Toggle the activity flag of a user and return the updated user
    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User>;
}
