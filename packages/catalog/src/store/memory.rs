use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::error::{StoreError, UniqueKey};
use super::traits::{FlavorKey, FlavorStore, ReadDeleted};
use crate::flavor::{ExtraSpecs, Flavor, NewFlavor};

#[derive(Debug, Default)]
struct State {
    last_id: i32,
    /// Kept in id order.
    flavors: Vec<Flavor>,
    projects: HashMap<i32, BTreeSet<String>>,
}

impl State {
    fn by_id_mut(&mut self, id: i32) -> Result<&mut Flavor, StoreError> {
        self.flavors
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("id {id}")))
    }

    fn require(&self, id: i32) -> Result<(), StoreError> {
        if self.flavors.iter().any(|f| f.id == id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("id {id}")))
        }
    }
}

/// In-process flavor store.
///
/// The whole check-and-insert runs under one lock, which gives the same
/// uniqueness guarantee a database constraint would.
#[derive(Debug, Default)]
pub struct MemoryFlavorStore {
    state: Mutex<State>,
}

impl MemoryFlavorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_key(flavor: &Flavor, key: FlavorKey<'_>) -> bool {
    match key {
        FlavorKey::Id(id) => flavor.id == id,
        FlavorKey::Name(name) => flavor.name == name,
        FlavorKey::FlavorId(flavorid) => flavor.flavorid == flavorid,
    }
}

#[async_trait]
impl FlavorStore for MemoryFlavorStore {
    async fn insert(&self, new: NewFlavor) -> Result<Flavor, StoreError> {
        let mut state = self.state.lock().await;
        let live = || state.flavors.iter().filter(|f| !f.deleted);

        if live().any(|f| f.name == new.name) {
            return Err(StoreError::UniqueViolation(UniqueKey::Name));
        }
        if live().any(|f| f.flavorid == new.flavorid) {
            return Err(StoreError::UniqueViolation(UniqueKey::FlavorId));
        }

        state.last_id += 1;
        let flavor = Flavor {
            id: state.last_id,
            flavorid: new.flavorid,
            name: new.name,
            memory_mb: new.memory_mb,
            vcpus: new.vcpus,
            root_gb: new.root_gb,
            ephemeral_gb: new.ephemeral_gb,
            swap: new.swap,
            rxtx_factor: new.rxtx_factor,
            is_public: new.is_public,
            created_at: Some(Utc::now()),
            ..Flavor::default()
        };
        state.flavors.push(flavor.clone());
        Ok(flavor)
    }

    async fn soft_delete(&self, name: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        match state
            .flavors
            .iter_mut()
            .find(|f| !f.deleted && f.name == name)
        {
            Some(flavor) => {
                flavor.deleted = true;
                flavor.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by(
        &self,
        key: FlavorKey<'_>,
        read_deleted: ReadDeleted,
    ) -> Result<Option<Flavor>, StoreError> {
        let state = self.state.lock().await;
        let live = state
            .flavors
            .iter()
            .find(|f| !f.deleted && matches_key(f, key));
        let found = match (live, read_deleted) {
            (Some(flavor), _) => Some(flavor),
            (None, ReadDeleted::No) => None,
            (None, ReadDeleted::Yes) => state.flavors.iter().rev().find(|f| matches_key(f, key)),
        };
        Ok(found.cloned())
    }

    async fn find_all(&self, read_deleted: ReadDeleted) -> Result<Vec<Flavor>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .flavors
            .iter()
            .filter(|f| read_deleted == ReadDeleted::Yes || !f.deleted)
            .cloned()
            .collect())
    }

    async fn upsert_extra_specs(&self, id: i32, specs: &ExtraSpecs) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let flavor = state.by_id_mut(id)?;
        flavor
            .extra_specs
            .extend(specs.iter().map(|(k, v)| (k.clone(), v.clone())));
        flavor.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_extra_spec(&self, id: i32, key: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let flavor = state.by_id_mut(id)?;
        let removed = flavor.extra_specs.remove(key).is_some();
        if removed {
            flavor.updated_at = Some(Utc::now());
        }
        Ok(removed)
    }

    async fn add_project(&self, id: i32, project_id: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        state.require(id)?;
        Ok(state
            .projects
            .entry(id)
            .or_default()
            .insert(project_id.to_string()))
    }

    async fn remove_project(&self, id: i32, project_id: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        state.require(id)?;
        Ok(state
            .projects
            .get_mut(&id)
            .is_some_and(|projects| projects.remove(project_id)))
    }

    async fn projects(&self, id: i32) -> Result<Vec<String>, StoreError> {
        let state = self.state.lock().await;
        state.require(id)?;
        Ok(state
            .projects
            .get(&id)
            .map(|projects| projects.iter().cloned().collect())
            .unwrap_or_default())
    }
}
