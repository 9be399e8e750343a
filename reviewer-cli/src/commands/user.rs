//! User commands

use clap::{Args, Subcommand};
use reviewer_core::Config;

use super::Services;

/// User commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Mark a user active or inactive
    SetActive {
        /// User ID
        id: String,

        /// `true` or `false`
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },

    /// List pull requests the user is reviewing
    Reviews {
        /// User ID
        id: String,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let services = Services::open(config).await?;

        match &self.command {
            UserCommand::SetActive { id, active } => {
                let user = services.teams.set_user_active(id, *active).await?;
                println!(
                    "{} ({}, team {}) is now {}",
                    user.id,
                    user.username,
                    user.team_name,
                    if user.is_active { "active" } else { "inactive" }
                );
            }
            UserCommand::Reviews { id } => {
                let reviews = services.teams.reviews_for_user(id).await?;
                if reviews.is_empty() {
                    println!("{} is not reviewing any pull requests.", id);
                    return Ok(());
                }
                for pr in &reviews {
                    println!(
                        "{:<16} {:<8} {} (by {})",
                        pr.id,
                        pr.status.as_str(),
                        pr.name,
                        pr.author_id
                    );
                }
            }
        }

        Ok(())
    }
}
