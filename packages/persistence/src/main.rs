use std::sync::Arc;

use catalog::Catalog;
use catalog::defaults::seed_default_flavors;
use tracing::{Level, info};

use persistence::SeaOrmFlavorStore;
use persistence::config::AppConfig;
use persistence::database::init_db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;
    let db = init_db(&config.database).await?;

    let catalog = Catalog::new(Arc::new(SeaOrmFlavorStore::new(db)), config.catalog);
    let inserted = seed_default_flavors(&catalog).await?;
    let default = catalog.get_default().await?;
    info!(
        inserted,
        default = %default.name,
        flavorid = %default.flavorid,
        "Flavor catalog ready"
    );

    Ok(())
}
