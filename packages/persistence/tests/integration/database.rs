use catalog::{FlavorStore, NewFlavor, StoreError, UniqueKey};
use persistence::SeaOrmFlavorStore;
use persistence::config::DatabaseConfig;
use persistence::database::{init_db, prepare_schema};

fn memory_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        sqlx_logging: false,
    }
}

fn new_flavor(name: &str, flavorid: &str) -> NewFlavor {
    NewFlavor {
        name: name.into(),
        flavorid: flavorid.into(),
        memory_mb: 64,
        vcpus: 1,
        root_gb: 120,
        ephemeral_gb: 0,
        swap: 0,
        rxtx_factor: 1.0,
        is_public: true,
    }
}

#[tokio::test]
async fn init_db_creates_unique_indexes() {
    let db = init_db(&memory_config()).await.unwrap();
    let store = SeaOrmFlavorStore::new(db);
    store.insert(new_flavor("a", "1")).await.unwrap();

    assert!(matches!(
        store.insert(new_flavor("a", "2")).await,
        Err(StoreError::UniqueViolation(UniqueKey::Name))
    ));
    assert!(matches!(
        store.insert(new_flavor("b", "1")).await,
        Err(StoreError::UniqueViolation(UniqueKey::FlavorId))
    ));
}

#[tokio::test]
async fn prepare_schema_is_repeatable() {
    let db = init_db(&memory_config()).await.unwrap();
    prepare_schema(&db).await.unwrap();

    let store = SeaOrmFlavorStore::new(db);
    store.insert(new_flavor("a", "1")).await.unwrap();
    assert!(store.insert(new_flavor("a", "2")).await.is_err());
}
