use tracing::info;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::flavor::CreateFlavor;

/// Flavors seeded into an empty catalog: (name, memory_mb, vcpus, root_gb, flavorid).
pub const DEFAULT_FLAVORS: &[(&str, i32, i32, i32, &str)] = &[
    ("m1.tiny", 512, 1, 1, "1"),
    ("m1.small", 2048, 1, 20, "2"),
    ("m1.medium", 4096, 2, 40, "3"),
    ("m1.large", 8192, 4, 80, "4"),
    ("m1.xlarge", 16384, 8, 160, "5"),
];

/// Create any default flavor that is missing. Existing ones are left
/// untouched, so this is safe to run on every startup.
pub async fn seed_default_flavors(catalog: &Catalog) -> Result<u32, CatalogError> {
    let mut inserted = 0u32;
    for &(name, memory_mb, vcpus, root_gb, flavorid) in DEFAULT_FLAVORS {
        let req = CreateFlavor::new(name, memory_mb, vcpus, root_gb).flavorid(flavorid);
        match catalog.create(req).await {
            Ok(_) => inserted += 1,
            Err(CatalogError::FlavorExists(_) | CatalogError::FlavorIdExists(_)) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} default flavors", inserted);
    }

    Ok(inserted)
}
