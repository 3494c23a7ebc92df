use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "lobby.toml",
    "config/lobby.toml",
    "crates/config/lobby.toml",
    "../lobby.toml",
    "../config/lobby.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub presence: PresenceConfig,
}

impl AppConfig {
    /// Reject settings the presence sweeper cannot work with and warn when a
    /// stale participant could outlive the threshold by more than twice over.
    pub fn validate(&self) -> anyhow::Result<()> {
        let presence = &self.presence;
        if presence.sweep_period_seconds == 0 {
            bail!("presence.sweep_period_seconds must be greater than zero");
        }
        if presence.inactivity_threshold_seconds == 0 {
            bail!("presence.inactivity_threshold_seconds must be greater than zero");
        }
        let period = presence.sweep_period_seconds;
        let threshold = presence.inactivity_threshold_seconds;
        if presence.sweep_period_too_long() {
            warn!(
                sweep_period_seconds = period,
                inactivity_threshold_seconds = threshold,
                "sweep period is more than twice the inactivity threshold; \
                 stale participants linger well past it"
            );
        } else if period > threshold {
            debug!(
                sweep_period_seconds = period,
                inactivity_threshold_seconds = threshold,
                "stale participants may linger for up to one sweep period"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://lobby.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Timing of the background presence sweep.
///
/// ```
/// use lobby_config::PresenceConfig;
///
/// let presence = PresenceConfig::default();
/// assert_eq!(presence.sweep_period().as_secs(), 15);
/// assert_eq!(presence.inactivity_threshold().as_secs(), 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    #[serde(default = "PresenceConfig::default_sweep_period")]
    pub sweep_period_seconds: u64,
    #[serde(default = "PresenceConfig::default_inactivity_threshold")]
    pub inactivity_threshold_seconds: u64,
}

impl PresenceConfig {
    const fn default_sweep_period() -> u64 {
        15
    }

    const fn default_inactivity_threshold() -> u64 {
        10
    }

    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.sweep_period_seconds)
    }

    pub fn inactivity_threshold(&self) -> Duration {
        Duration::from_secs(self.inactivity_threshold_seconds)
    }

    /// True when the sweep period is more than twice the inactivity threshold.
    pub fn sweep_period_too_long(&self) -> bool {
        self.sweep_period_seconds > self.inactivity_threshold_seconds.saturating_mul(2)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            sweep_period_seconds: Self::default_sweep_period(),
            inactivity_threshold_seconds: Self::default_inactivity_threshold(),
        }
    }
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use lobby_config::load;
///
/// std::env::remove_var("LOBBY_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default(
            "presence.sweep_period_seconds",
            clamp_to_i64(defaults.presence.sweep_period_seconds),
        )?
        .set_default(
            "presence.inactivity_threshold_seconds",
            clamp_to_i64(defaults.presence.inactivity_threshold_seconds),
        )?;

    let environment_overrides = config::Environment::with_prefix("LOBBY").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("LOBBY_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via LOBBY_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    config.validate().context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
