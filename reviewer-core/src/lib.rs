//! Reviewer Core - reviewer assignment for team-owned pull requests
//!
//! This crate decides which team members review a pull request, swaps
//! reviewers out on request, and drives the open to merged lifecycle.
//! Persistence sits behind the [`TeamDirectory`] and [`PullRequestStore`]
//! traits; an in-memory backend is always available and a SQLite backend is
//! enabled by the `database` feature.

pub mod admin;
pub mod config;
pub mod directory;
pub mod domain;
pub mod engine;
pub mod error;
pub mod memory;
pub mod selection;
pub mod store;
pub mod teams;

#[cfg(feature = "database")]
pub mod sqlite;

pub use admin::AdminGuard;
pub use config::{AssignmentConfig, CliOverrides, Config, LogFormat};
pub use directory::TeamDirectory;
pub use domain::{
    Lifecycle, Member, PrStatus, PullRequest, PullRequestDraft, PullRequestShort, Reassignment,
    Team, User,
};
pub use engine::AssignmentEngine;
pub use error::{Error, Result};
pub use memory::InMemoryBackend;
pub use selection::{pick_replacement, select_reviewers, ReviewerSelector};
pub use store::PullRequestStore;
pub use teams::TeamService;

#[cfg(feature = "database")]
pub use sqlite::SqliteBackend;
