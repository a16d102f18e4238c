mod common;
mod database;
mod flavors;
mod store;
