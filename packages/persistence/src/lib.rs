pub mod config;
pub mod database;
pub mod entity;
pub mod seed;
pub mod store;

pub use store::SeaOrmFlavorStore;
