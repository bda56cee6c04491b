//! Database connection pool management
//!
//! Builds the PostgreSQL pool the services share, verifies it on startup and
//! keeps the pool gauges fresh.

pub mod env;
mod metrics;

use metrics::update_pool_metrics;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Interval between pool gauge refreshes
const METRICS_INTERVAL: Duration = Duration::from_secs(30);

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    /// Service name for metrics labeling
    pub service_name: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Budget for the startup `SELECT 1` verification
    pub connect_timeout_secs: u64,
    /// Connection acquisition timeout (get connection from pool)
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            database_url: String::new(),
            max_connections: 20,
            min_connections: 5,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl DbConfig {
    /// Load pool settings from `DATABASE_URL` and the `DB_*` overrides.
    pub fn from_env(service_name: &str) -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable not set".to_string())?;
        let defaults = Self::default();

        Ok(Self {
            service_name: service_name.to_string(),
            database_url,
            max_connections: env::env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: env::env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout_secs: env::env_or(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
            acquire_timeout_secs: env::env_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            ),
            idle_timeout_secs: env::env_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
            max_lifetime_secs: env::env_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs),
        })
    }

    /// Log pool configuration details
    pub fn log_config(&self) {
        info!(
            service = %self.service_name,
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            acquire_timeout_secs = self.acquire_timeout_secs,
            idle_timeout_secs = self.idle_timeout_secs,
            max_lifetime_secs = self.max_lifetime_secs,
            "Database pool configuration"
        );
    }
}

impl DbConfig {
    /// Pool options for this configuration. Connections are tested on
    /// checkout so a restarted database does not hand out dead sockets.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(self.max_lifetime_secs))
            .test_before_acquire(true)
    }

    fn verify_budget(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Connect, check the database answers within `connect_timeout_secs`, then
/// keep the pool gauges refreshed for as long as the pool is open.
pub async fn create_pool(config: DbConfig) -> Result<PgPool, sqlx::Error> {
    let pool = config.pool_options().connect(&config.database_url).await?;

    if let Err(e) = verify(&pool, config.verify_budget()).await {
        error!(
            service = %config.service_name,
            error = %e,
            "Database pool failed startup verification"
        );
        pool.close().await;
        return Err(e);
    }

    info!(
        service = %config.service_name,
        size = pool.size(),
        "Database pool ready"
    );
    spawn_gauge_refresh(pool.clone(), config.service_name);

    Ok(pool)
}

/// One `SELECT 1` round trip bounded by `budget`.
async fn verify(pool: &PgPool, budget: Duration) -> Result<(), sqlx::Error> {
    let round_trip = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool);
    match tokio::time::timeout(budget, round_trip).await {
        Ok(answer) => answer.map(|_| ()),
        Err(_) => Err(verification_timed_out(budget)),
    }
}

fn verification_timed_out(budget: Duration) -> sqlx::Error {
    sqlx::Error::Io(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        format!("database did not answer within {:?}", budget),
    ))
}

/// Stops on its own once the pool is closed.
fn spawn_gauge_refresh(pool: PgPool, service: String) {
    update_pool_metrics(&pool, &service);
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(METRICS_INTERVAL);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        while !pool.is_closed() {
            ticks.tick().await;
            update_pool_metrics(&pool, &service);
        }
        debug!(service = %service, "Pool closed, gauge refresh stopped");
    });
}
