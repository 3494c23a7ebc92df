use std::sync::Arc;

use anyhow::{Context, Result};
use lobby_config::{AppConfig, PresenceConfig};
use lobby_database::initialize_database;
use lobby_room::{ChatRoom, SweeperHandle, SystemClock};
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub room: ChatRoom,
    pub presence: PresenceConfig,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let room = ChatRoom::with_sqlite(db_pool.clone(), Arc::new(SystemClock));

        info!(url = %config.database.url, "chat room ready");

        Ok(Self {
            db_pool,
            room,
            presence: config.presence.clone(),
        })
    }

    /// Start the presence sweeper with the configured period and threshold.
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        self.room
            .sweeper(self.presence.inactivity_threshold())
            .spawn(self.presence.sweep_period())
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
