use async_trait::async_trait;

use super::error::StoreError;
use crate::flavor::{ExtraSpecs, Flavor, NewFlavor};

/// Lookup key for a single flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlavorKey<'a> {
    Id(i32),
    Name(&'a str),
    FlavorId(&'a str),
}

/// Whether soft-deleted rows are visible to a read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadDeleted {
    #[default]
    No,
    Yes,
}

/// Persistent record store for flavors.
///
/// Implementations own the uniqueness guarantee: `insert` must check and
/// insert atomically so that concurrent creators cannot both succeed.
#[async_trait]
pub trait FlavorStore: Send + Sync {
    /// Insert a flavor and return it with its assigned id and timestamps.
    ///
    /// Fails with [`StoreError::UniqueViolation`] if a non-deleted flavor
    /// already has the same name or flavor id.
    async fn insert(&self, flavor: NewFlavor) -> Result<Flavor, StoreError>;

    /// Soft-delete the non-deleted flavor named `name`.
    ///
    /// Returns `true` if a flavor was deleted, `false` if none matched.
    async fn soft_delete(&self, name: &str) -> Result<bool, StoreError>;

    /// Find one flavor. With [`ReadDeleted::Yes`] a live row is preferred,
    /// then the most recently created deleted one.
    async fn find_by(
        &self,
        key: FlavorKey<'_>,
        read_deleted: ReadDeleted,
    ) -> Result<Option<Flavor>, StoreError>;

    /// All flavors in id order.
    async fn find_all(&self, read_deleted: ReadDeleted) -> Result<Vec<Flavor>, StoreError>;

    /// Check whether a live flavor matches `key`.
    async fn exists(&self, key: FlavorKey<'_>) -> Result<bool, StoreError> {
        Ok(self.find_by(key, ReadDeleted::No).await?.is_some())
    }

    /// Insert or overwrite extra specs of flavor `id`.
    async fn upsert_extra_specs(&self, id: i32, specs: &ExtraSpecs) -> Result<(), StoreError>;

    /// Remove one extra spec. Returns `false` if the key was not set.
    async fn delete_extra_spec(&self, id: i32, key: &str) -> Result<bool, StoreError>;

    /// Grant `project_id` access to flavor `id`. Returns `false` if the
    /// grant already existed.
    async fn add_project(&self, id: i32, project_id: &str) -> Result<bool, StoreError>;

    /// Revoke a grant. Returns `false` if there was none.
    async fn remove_project(&self, id: i32, project_id: &str) -> Result<bool, StoreError>;

    /// Projects granted access to flavor `id`, sorted.
    async fn projects(&self, id: i32) -> Result<Vec<String>, StoreError>;
}
