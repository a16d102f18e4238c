use catalog::validate::SQL_SP_FLOAT_MAX;
use catalog::{
    CatalogConfig, CatalogError, CreateFlavor, ExtraSpecs, FlavorFilters, ListOptions,
    ReadDeleted, SortDir, SortKey,
};

use crate::common::{seeded, setup, setup_with};

fn names(flavors: &[catalog::Flavor]) -> Vec<&str> {
    flavors.iter().map(|f| f.name.as_str()).collect()
}

#[tokio::test]
async fn create_and_read_back() {
    let app = setup().await;
    let created = app
        .catalog
        .create(
            CreateFlavor::new("flavor", 64, 1, 120)
                .flavorid("custom")
                .ephemeral_gb(10)
                .swap(512)
                .rxtx_factor(1.5)
                .is_public(false),
        )
        .await
        .unwrap();
    assert!(created.id > 0);
    assert!(created.created_at.is_some());

    let by_name = app.catalog.get_by_name(Some("flavor")).await.unwrap();
    let by_id = app.catalog.get_by_flavor_id("custom").await.unwrap();
    for flavor in [&by_name, &by_id] {
        assert_eq!(flavor.id, created.id);
        assert_eq!(flavor.memory_mb, 64);
        assert_eq!(flavor.vcpus, 1);
        assert_eq!(flavor.root_gb, 120);
        assert_eq!(flavor.ephemeral_gb, 10);
        assert_eq!(flavor.swap, 512);
        assert_eq!(flavor.rxtx_factor, 1.5);
        assert_eq!(flavor.vcpu_weight, None);
        assert!(!flavor.is_public);
        assert!(!flavor.deleted);
    }
}

#[tokio::test]
async fn generated_flavorid_is_stored() {
    let app = setup().await;
    let created = app
        .catalog
        .create(CreateFlavor::new("flavor1", 64, 1, 120))
        .await
        .unwrap();
    assert!(!created.flavorid.is_empty());
    let fetched = app.catalog.get_by_flavor_id(&created.flavorid).await.unwrap();
    assert_eq!(fetched.name, "flavor1");
}

#[tokio::test]
async fn duplicate_name_rejected_by_index() {
    let app = setup().await;
    app.catalog
        .create(CreateFlavor::new("flavor", 64, 1, 120).flavorid("a"))
        .await
        .unwrap();
    let err = app
        .catalog
        .create(CreateFlavor::new("flavor", 64, 1, 120).flavorid("b"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::FlavorExists(name) if name == "flavor"));
}

#[tokio::test]
async fn duplicate_flavorid_rejected_by_index() {
    let app = setup().await;
    app.catalog
        .create(CreateFlavor::new("flavor1", 64, 1, 120).flavorid("same"))
        .await
        .unwrap();
    let err = app
        .catalog
        .create(CreateFlavor::new("flavor2", 64, 1, 120).flavorid("same"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::FlavorIdExists(id) if id == "same"));
}

#[tokio::test]
async fn destroy_frees_name_and_flavorid() {
    let app = setup().await;
    let first = app
        .catalog
        .create(CreateFlavor::new("flavor", 64, 1, 120).flavorid("x"))
        .await
        .unwrap();
    app.catalog.destroy("flavor").await.unwrap();
    assert!(matches!(
        app.catalog.destroy("flavor").await,
        Err(CatalogError::FlavorNotFoundByName(_))
    ));

    let second = app
        .catalog
        .create(CreateFlavor::new("flavor", 128, 2, 10).flavorid("x"))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    // A second delete of the reused name must not collide with the first.
    app.catalog.destroy("flavor").await.unwrap();
    let all = app
        .catalog
        .list(&ListOptions::default().include_deleted())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|f| f.deleted && f.deleted_at.is_some()));
}

#[tokio::test]
async fn read_deleted_returns_soft_deleted_row() {
    let app = seeded().await;
    app.catalog.destroy("m1.tiny").await.unwrap();

    assert!(matches!(
        app.catalog.get_by_flavor_id("1").await,
        Err(CatalogError::FlavorNotFound(_))
    ));
    let deleted = app
        .catalog
        .get_by_flavor_id_with("1", ReadDeleted::Yes)
        .await
        .unwrap();
    assert_eq!(deleted.name, "m1.tiny");
    assert!(deleted.deleted);
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let app = seeded().await;
    let again = persistence::seed::seed_flavors(&app.db, app.catalog.config())
        .await
        .unwrap();
    assert_eq!(again, 0);
    persistence::seed::ensure_indexes(&app.db).await.unwrap();

    let default = app.catalog.get_default().await.unwrap();
    assert_eq!(default.name, "m1.small");
    assert_eq!(default.flavorid, "2");
}

#[tokio::test]
async fn missing_default_flavor() {
    let app = setup_with(CatalogConfig {
        default_flavor: "m1.missing".into(),
    })
    .await;
    assert!(matches!(
        app.catalog.get_by_name(None).await,
        Err(CatalogError::FlavorNotFound(name)) if name == "m1.missing"
    ));
}

#[tokio::test]
async fn list_sorts_filters_and_pages() {
    let app = seeded().await;

    let all = app.catalog.list(&ListOptions::default()).await.unwrap();
    assert_eq!(
        names(&all),
        ["m1.tiny", "m1.small", "m1.medium", "m1.large", "m1.xlarge"]
    );

    let by_memory_desc = app
        .catalog
        .list(&ListOptions::default().sort(SortKey::MemoryMb, SortDir::Desc))
        .await
        .unwrap();
    assert_eq!(by_memory_desc[0].name, "m1.xlarge");

    let filtered = app
        .catalog
        .list(&ListOptions::default().filters(FlavorFilters {
            min_memory_mb: Some(4096),
            min_root_gb: Some(80),
            ..Default::default()
        }))
        .await
        .unwrap();
    assert_eq!(names(&filtered), ["m1.large", "m1.xlarge"]);

    let page = app
        .catalog
        .list(&ListOptions::default().marker("2").limit(2))
        .await
        .unwrap();
    assert_eq!(names(&page), ["m1.medium", "m1.large"]);

    assert!(matches!(
        app.catalog.list(&ListOptions::default().marker("nope")).await,
        Err(CatalogError::MarkerNotFound(_))
    ));
}

#[tokio::test]
async fn rxtx_factor_max_round_trips() {
    let app = setup().await;
    app.catalog
        .create(CreateFlavor::new("flavor", 64, 1, 120).rxtx_factor(SQL_SP_FLOAT_MAX))
        .await
        .unwrap();
    let flavor = app.catalog.get_by_name(Some("flavor")).await.unwrap();
    assert_eq!(flavor.rxtx_factor, SQL_SP_FLOAT_MAX);
}

#[tokio::test]
async fn extra_specs_are_stored_and_overwritten() {
    let app = seeded().await;
    app.catalog
        .update_extra_specs(
            "3",
            ExtraSpecs::from([
                ("hw:numa_mem.0".to_string(), "1024".to_string()),
                ("hw:cpu_policy".to_string(), "shared".to_string()),
            ]),
        )
        .await
        .unwrap();
    let flavor = app
        .catalog
        .update_extra_specs(
            "3",
            ExtraSpecs::from([("hw:cpu_policy".to_string(), "dedicated".to_string())]),
        )
        .await
        .unwrap();
    assert_eq!(flavor.extra_specs.len(), 2);
    assert_eq!(flavor.extra_specs["hw:cpu_policy"], "dedicated");
    assert!(flavor.updated_at.is_some());

    app.catalog
        .delete_extra_spec("3", "hw:numa_mem.0")
        .await
        .unwrap();
    assert!(matches!(
        app.catalog.delete_extra_spec("3", "hw:numa_mem.0").await,
        Err(CatalogError::ExtraSpecNotFound { .. })
    ));

    let listed = app.catalog.list(&ListOptions::default()).await.unwrap();
    let medium = listed.iter().find(|f| f.flavorid == "3").unwrap();
    assert_eq!(
        medium.extra_specs,
        ExtraSpecs::from([("hw:cpu_policy".to_string(), "dedicated".to_string())])
    );
    assert!(listed.iter().filter(|f| f.flavorid != "3").all(|f| f.extra_specs.is_empty()));
}

#[tokio::test]
async fn project_access() {
    let app = seeded().await;
    app.catalog.add_access("4", "tenant-b").await.unwrap();
    app.catalog.add_access("4", "tenant-a").await.unwrap();
    assert!(matches!(
        app.catalog.add_access("4", "tenant-a").await,
        Err(CatalogError::FlavorAccessExists { .. })
    ));

    let access = app.catalog.get_access_by_flavor_id("4").await.unwrap();
    let projects: Vec<&str> = access.iter().map(|a| a.project_id.as_str()).collect();
    assert_eq!(projects, ["tenant-a", "tenant-b"]);

    app.catalog.remove_access("4", "tenant-b").await.unwrap();
    assert!(matches!(
        app.catalog.remove_access("4", "tenant-b").await,
        Err(CatalogError::FlavorAccessNotFound { .. })
    ));
    assert_eq!(app.catalog.get_access_by_flavor_id("4").await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_creates_with_same_name() {
    let app = setup().await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let catalog = app.catalog.clone();
        handles.push(tokio::spawn(async move {
            catalog
                .create(CreateFlavor::new("race", 64, 1, 120).flavorid(format!("race-{i}")))
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(CatalogError::FlavorExists(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
}
