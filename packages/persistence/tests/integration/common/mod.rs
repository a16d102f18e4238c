use std::sync::Arc;

use catalog::{Catalog, CatalogConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use persistence::SeaOrmFlavorStore;

/// A catalog backed by a private in-memory SQLite database.
pub struct TestCatalog {
    pub db: DatabaseConnection,
    pub catalog: Catalog,
}

/// Open a fresh database with the schema and unique indexes in place.
///
/// The pool holds a single connection, since every SQLite `:memory:`
/// connection is its own database.
pub async fn setup_with(config: CatalogConfig) -> TestCatalog {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("Failed to open in-memory database");
    persistence::database::prepare_schema(&db)
        .await
        .expect("Failed to prepare schema");

    let catalog = Catalog::new(Arc::new(SeaOrmFlavorStore::new(db.clone())), config);
    TestCatalog { db, catalog }
}

pub async fn setup() -> TestCatalog {
    setup_with(CatalogConfig::default()).await
}

/// Fresh database holding the canonical flavors.
pub async fn seeded() -> TestCatalog {
    let app = setup().await;
    let inserted = persistence::seed::seed_flavors(&app.db, app.catalog.config())
        .await
        .expect("Failed to seed flavors");
    assert_eq!(inserted, 5);
    app
}
