//! CLI command implementations

pub mod pr;
pub mod serve;
pub mod team;
pub mod user;

pub use pr::PrArgs;
pub use serve::ServeArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

use std::sync::Arc;

use reviewer_core::{AssignmentEngine, Config, SqliteBackend, TeamService};
use reviewer_db::Database;

/// Engine and team service over the configured database
pub struct Services {
    pub engine: Arc<AssignmentEngine>,
    pub teams: Arc<TeamService>,
}

impl Services {
    /// Open (and migrate) the database named by the configuration
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let db_config = config.database.to_db_config();
        let path = db_config.path.clone();

        let db = Database::connect(db_config)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open database {}: {}", path.display(), e))?;
        db.migrate()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to migrate database: {}", e))?;

        let backend = Arc::new(SqliteBackend::new(db));
        let engine = AssignmentEngine::new(
            backend.clone(),
            backend.clone(),
            config.assignment.clone(),
        );

        Ok(Self {
            engine: Arc::new(engine),
            teams: Arc::new(TeamService::new(backend.clone(), backend)),
        })
    }
}
