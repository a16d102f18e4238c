mod error;
mod traits;

pub mod memory;

pub use error::{StoreError, UniqueKey};
pub use memory::MemoryFlavorStore;
pub use traits::{FlavorKey, FlavorStore, ReadDeleted};
