//! Team management commands

use clap::{Args, Subcommand};
use reviewer_core::{Config, Member};

use super::Services;

/// Team management commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team with its members
    Add {
        /// Team name
        name: String,

        /// Member as `id:username`, or `id:username:inactive`
        #[arg(short, long = "member", value_parser = parse_member)]
        members: Vec<Member>,
    },

    /// Show a team and its members
    Show {
        /// Team name
        name: String,
    },
}

/// Parse `id:username[:inactive]`
fn parse_member(value: &str) -> Result<Member, String> {
    let mut parts = value.splitn(3, ':');
    let id = parts.next().unwrap_or_default().trim();
    let username = parts.next().unwrap_or_default().trim();

    if id.is_empty() || username.is_empty() {
        return Err(format!(
            "expected id:username[:inactive], got {:?}",
            value
        ));
    }

    let is_active = match parts.next() {
        None | Some("active") => true,
        Some("inactive") => false,
        Some(other) => return Err(format!("unknown member flag {:?}", other)),
    };

    Ok(Member::new(id, username, is_active))
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let services = Services::open(config).await?;

        match &self.command {
            TeamCommand::Add { name, members } => {
                let team = services.teams.create_team(name, members).await?;
                println!("Created team {} ({} members)", team.name, team.members.len());
            }
            TeamCommand::Show { name } => {
                let team = services.teams.get_team(name).await?;
                println!("Team: {}", team.name);
                println!();
                if team.members.is_empty() {
                    println!("  (no members)");
                }
                for member in &team.members {
                    let state = if member.is_active { "active" } else { "inactive" };
                    println!("  {:<16} {:<20} {}", member.id, member.username, state);
                }
            }
        }

        Ok(())
    }
}
