//! Pull request commands

use clap::{Args, Subcommand};
use reviewer_core::{Config, PullRequest};

use super::Services;

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Create a pull request and assign reviewers
    Create {
        /// Pull request ID
        id: String,

        /// Pull request title
        name: String,

        /// Author's user ID
        #[arg(short, long)]
        author: String,
    },

    /// Merge a pull request
    Merge {
        /// Pull request ID
        id: String,
    },

    /// Replace a reviewer with another teammate
    Reassign {
        /// Pull request ID
        id: String,

        /// Reviewer to replace
        #[arg(long = "old")]
        old_reviewer: String,
    },
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let services = Services::open(config).await?;

        match &self.command {
            PrCommand::Create { id, name, author } => {
                let pr = services.engine.create_pull_request(id, name, author).await?;
                print_pull_request(&pr);
            }
            PrCommand::Merge { id } => {
                let pr = services.engine.set_merged(id).await?;
                print_pull_request(&pr);
            }
            PrCommand::Reassign { id, old_reviewer } => {
                let outcome = services.engine.reassign_reviewer(id, old_reviewer).await?;
                println!("Replaced {} with {}", old_reviewer, outcome.replaced_by);
                println!();
                print_pull_request(&outcome.pull_request);
            }
        }

        Ok(())
    }
}

fn print_pull_request(pr: &PullRequest) {
    println!("Pull request {}: {}", pr.id, pr.name);
    println!("  author:    {}", pr.author_id);
    println!("  status:    {}", pr.status);
    if pr.reviewers.is_empty() {
        println!("  reviewers: (none)");
    } else {
        println!("  reviewers: {}", pr.reviewers.join(", "));
    }
    if pr.needs_more_reviewers {
        println!("  needs more reviewers");
    }
    println!("  created:   {}", pr.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(merged_at) = pr.merged_at {
        println!("  merged:    {}", merged_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}
