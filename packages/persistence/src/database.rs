use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;
use crate::seed::ensure_indexes;

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.to_owned());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(config.sqlx_logging);

    let db = Database::connect(opt).await?;
    prepare_schema(&db).await?;

    Ok(db)
}

/// Bring the tables and the live-row unique indexes up to date.
pub async fn prepare_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    sync_schema(db).await?;
    ensure_indexes(db).await
}

/// Create or update the flavor tables from the entity definitions.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("persistence::entity::*")
        .sync(db)
        .await?;

    Ok(())
}
