use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::migrator::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
    /// Defer opening connections until first use
    pub lazy: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            lazy: true,
        }
    }
}

impl DbConfig {
    /// Single-connection settings for `sqlite::memory:`, where every pooled
    /// connection would otherwise see its own empty database.
    pub fn sqlite_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            lazy: false,
            ..Default::default()
        }
    }

    /// Builds pool settings from the application config. Returns `None`
    /// when no durable store is configured.
    pub fn from_app_config(cfg: &AppConfig) -> Option<Self> {
        cfg.database_url().map(|url| Self {
            url: url.to_string(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            lazy: cfg.db_connect_lazy,
        })
    }
}

/// Establishes a connection pool to the database with custom configuration
///
/// # Errors
/// Returns a `ServiceError` if the URL is invalid or, for eager pools, the
/// database cannot be reached
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!(
        max_connections = config.max_connections,
        lazy = config.lazy,
        "Configuring database connection"
    );

    let mut opt = ConnectOptions::new(config.url.clone());

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect_lazy(config.lazy)
        .sqlx_logging(false);

    let db_pool = Database::connect(opt).await?;

    info!(
        "Database connection pool established (max_connections={})",
        config.max_connections
    );

    Ok(db_pool)
}

/// Applies all pending migrations
pub async fn run_migrations(db: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    Migrator::up(db, None).await?;
    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnectionTrait;

    #[test]
    fn no_db_config_without_database_url() {
        assert!(DbConfig::from_app_config(&AppConfig::default()).is_none());
    }

    #[test]
    fn db_config_carries_pool_tuning() {
        let mut cfg = AppConfig::with_database_url("postgres://localhost/giftcards");
        cfg.db_max_connections = 4;
        cfg.db_connect_lazy = false;

        let db_cfg = DbConfig::from_app_config(&cfg).unwrap();
        assert_eq!(db_cfg.url, "postgres://localhost/giftcards");
        assert_eq!(db_cfg.max_connections, 4);
        assert!(!db_cfg.lazy);
    }

    #[tokio::test]
    async fn migrations_create_cart_items_table() {
        let db = establish_connection_with_config(&DbConfig::sqlite_memory())
            .await
            .unwrap();
        run_migrations(&db).await.unwrap();

        let row = db
            .query_one(sea_orm::Statement::from_string(
                db.get_database_backend(),
                "SELECT COUNT(*) AS n FROM cart_items".to_string(),
            ))
            .await
            .unwrap();
        assert!(row.is_some());
    }
}
