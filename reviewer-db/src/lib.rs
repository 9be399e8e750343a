//! Database layer for the reviewer assignment service
//!
//! Provides SQLite persistence for teams, users, pull requests and the
//! reviewer links between them.

pub mod db;
pub mod error;
pub mod models;
pub mod repos;

pub use db::{Database, DatabaseConfig};
pub use error::{DbError, Result};
pub use models::{
    CreatePullRequest, MemberRow, NewMember, PullRequestRecord, PullRequestRow,
    PullRequestShortRow, TeamRecord, TeamRow, UserRow, STATUS_MERGED, STATUS_OPEN,
};
pub use repos::{PullRequestRepository, TeamRepository, UserRepository};
