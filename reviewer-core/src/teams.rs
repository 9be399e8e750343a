//! Team and user administration

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::directory::TeamDirectory;
use crate::domain::{Member, PullRequestShort, Team, User};
use crate::store::PullRequestStore;
use crate::{Error, Result};

/// Operations on teams and users outside of reviewer assignment
pub struct TeamService {
    directory: Arc<dyn TeamDirectory>,
    store: Arc<dyn PullRequestStore>,
}

impl TeamService {
    pub fn new(directory: Arc<dyn TeamDirectory>, store: Arc<dyn PullRequestStore>) -> Self {
        Self { directory, store }
    }

    /// Create a team together with its members.
    ///
    /// Members that already exist are moved into the new team.
    #[instrument(skip(self, members), fields(op = "team.create", member_count = members.len()))]
    pub async fn create_team(&self, team_name: &str, members: &[Member]) -> Result<Team> {
        if team_name.trim().is_empty() {
            return Err(Error::Validation("team name must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for member in members {
            if member.id.trim().is_empty() {
                return Err(Error::Validation("member id must not be empty".to_string()));
            }
            if !seen.insert(member.id.as_str()) {
                return Err(Error::Validation(format!(
                    "member {} listed more than once",
                    member.id
                )));
            }
        }

        let team = self.directory.create_team(team_name, members).await?;
        info!(team_id = team.id, "Team created");
        Ok(team)
    }

    pub async fn get_team(&self, team_name: &str) -> Result<Team> {
        self.directory.get_team(team_name).await
    }

    #[instrument(skip(self), fields(op = "user.set_active"))]
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let user = self.directory.set_user_active(user_id, is_active).await?;
        info!(team = %user.team_name, "User activity changed");
        Ok(user)
    }

    /// Pull requests the user currently reviews
    pub async fn reviews_for_user(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        self.directory.get_user(user_id).await?;
        self.store.list_by_reviewer(user_id).await
    }
}
