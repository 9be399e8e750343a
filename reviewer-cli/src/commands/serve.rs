//! Serve command - run the HTTP API

use std::net::SocketAddr;

use clap::Args;
use reviewer_core::{AdminGuard, CliOverrides, Config};
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::Services;
use crate::api::{self, AppState};

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Shared secret for admin endpoints (overrides config)
    #[arg(long)]
    admin_token: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(self, config: Config) -> anyhow::Result<()> {
        let config = config.with_cli_overrides(CliOverrides {
            host: self.host,
            port: self.port,
            admin_token: self.admin_token,
            ..CliOverrides::default()
        });

        let services = Services::open(&config).await?;
        let admin = AdminGuard::new(config.admin.token.clone());
        if !admin.is_configured() {
            warn!("No admin token configured; admin endpoints will reject every request");
        }

        let app = api::router(AppState {
            engine: services.engine,
            teams: services.teams,
            admin,
        });

        let address = config.server.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", address, e))?;

        info!(
            addr = %listener.local_addr()?,
            max_reviewers = config.assignment.max_reviewers_per_pr,
            "Reviewer service ready"
        );

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        info!("Reviewer service stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
