use std::sync::Arc;

use catalog::defaults::seed_default_flavors;
use catalog::{Catalog, CatalogConfig, CatalogError};
use sea_orm::sea_query::{
    Index, IndexCreateStatement, MysqlQueryBuilder, PostgresQueryBuilder, SqliteQueryBuilder,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr};
use tracing::{info, warn};

use crate::entity::flavor;
use crate::store::SeaOrmFlavorStore;

/// Unique over live names; soft-deleted rows carry their id in `deleted`.
pub const NAME_INDEX: &str = "uniq_flavor_name_deleted";
/// Unique over live flavor ids.
pub const FLAVORID_INDEX: &str = "uniq_flavor_flavorid_deleted";

fn build_sql(db: &DatabaseConnection, stmt: &IndexCreateStatement) -> String {
    match db.get_database_backend() {
        DbBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        _ => stmt.to_string(MysqlQueryBuilder),
    }
}

/// Create the composite unique indexes that enforce flavor uniqueness.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let unique = [
        (NAME_INDEX, flavor::Column::Name),
        (FLAVORID_INDEX, flavor::Column::Flavorid),
    ];

    for (name, column) in unique {
        let stmt = Index::create()
            .if_not_exists()
            .unique()
            .name(name)
            .table(flavor::Entity)
            .col(column)
            .col(flavor::Column::Deleted)
            .to_owned();

        db.execute_unprepared(&build_sql(db, &stmt))
            .await
            .inspect_err(|e| warn!("Failed to create index {}: {}", name, e))?;
        info!("Ensured index {} exists", name);
    }

    Ok(())
}

/// Seed the canonical flavors into the database behind `db`.
pub async fn seed_flavors(
    db: &DatabaseConnection,
    config: &CatalogConfig,
) -> Result<u32, CatalogError> {
    let catalog = Catalog::new(
        Arc::new(SeaOrmFlavorStore::new(db.clone())),
        config.clone(),
    );
    seed_default_flavors(&catalog).await
}
