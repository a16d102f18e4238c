pub mod catalog;
pub mod config;
pub mod defaults;
pub mod error;
pub mod flavor;
pub mod listing;
pub mod store;
pub mod sysmeta;
pub mod validate;

pub use catalog::Catalog;
pub use config::CatalogConfig;
pub use error::CatalogError;
pub use flavor::{CreateFlavor, ExtraSpecs, Flavor, FlavorAccess, NewFlavor, Param};
pub use listing::{FlavorFilters, ListOptions, SortDir, SortKey};
pub use store::{FlavorKey, FlavorStore, MemoryFlavorStore, ReadDeleted, StoreError, UniqueKey};
