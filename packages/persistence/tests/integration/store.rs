use catalog::{FlavorKey, FlavorStore, NewFlavor, ReadDeleted, StoreError, UniqueKey};
use persistence::SeaOrmFlavorStore;

use crate::common::setup;

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
async fn unique_violations_name_the_key() {
    let app = setup().await;
    let store = SeaOrmFlavorStore::new(app.db.clone());
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
async fn read_deleted_prefers_live_row() {
    let app = setup().await;
    let store = SeaOrmFlavorStore::new(app.db.clone());

    let first = store.insert(new_flavor("a", "1")).await.unwrap();
    assert!(store.soft_delete("a").await.unwrap());
    assert!(!store.soft_delete("a").await.unwrap());
    assert!(!store.exists(FlavorKey::FlavorId("1")).await.unwrap());

    let found = store
        .find_by(FlavorKey::FlavorId("1"), ReadDeleted::Yes)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, first.id);

    let second = store.insert(new_flavor("a", "1")).await.unwrap();
    let found = store
        .find_by(FlavorKey::Name("a"), ReadDeleted::Yes)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, second.id);
    assert!(!found.deleted);

    assert_eq!(store.find_all(ReadDeleted::No).await.unwrap().len(), 1);
    assert_eq!(store.find_all(ReadDeleted::Yes).await.unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_flavor_row_is_not_found() {
    let app = setup().await;
    let store = SeaOrmFlavorStore::new(app.db.clone());

    assert!(matches!(
        store.projects(999).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.add_project(999, "p").await,
        Err(StoreError::NotFound(_))
    ));
    assert!(
        store
            .find_by(FlavorKey::Id(999), ReadDeleted::Yes)
            .await
            .unwrap()
            .is_none()
    );
}
