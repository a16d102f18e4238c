use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::flavor::{CreateFlavor, ExtraSpecs, Flavor, FlavorAccess};
use crate::listing::{ListOptions, paginate};
use crate::store::{FlavorKey, FlavorStore, ReadDeleted, StoreError, UniqueKey};
use crate::validate::{validate, validate_extra_specs};

/// Namespace for flavor ids generated from flavor names.
const FLAVORID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2d3e_8a4b_4c5d_9e6f_7a8b_9c0d_1e2f);

/// Derive the flavor id assigned when a creation request has none.
///
/// Names are unique among live flavors, so the derived ids are too.
pub fn generate_flavorid(name: &str) -> String {
    Uuid::new_v5(&FLAVORID_NAMESPACE, name.as_bytes()).to_string()
}

/// Flavor catalog: validation in front of a record store.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn FlavorStore>,
    config: CatalogConfig,
}

impl Catalog {
    pub fn new(store: Arc<dyn FlavorStore>, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn FlavorStore> {
        &self.store
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Validate and insert a new flavor.
    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn create(&self, req: CreateFlavor) -> Result<Flavor, CatalogError> {
        let mut new = validate(&req).inspect_err(|e| debug!("Rejected flavor: {e}"))?;
        if new.flavorid.is_empty() {
            new.flavorid = generate_flavorid(&new.name);
        }

        let name = new.name.clone();
        let flavorid = new.flavorid.clone();
        let flavor = self.store.insert(new).await.map_err(|e| match e {
            StoreError::UniqueViolation(UniqueKey::Name) => {
                debug!("Flavor name already taken");
                CatalogError::FlavorExists(name)
            }
            StoreError::UniqueViolation(UniqueKey::FlavorId) => {
                debug!(%flavorid, "Flavor id already taken");
                CatalogError::FlavorIdExists(flavorid)
            }
            other => CatalogError::Store(other),
        })?;

        info!(id = flavor.id, flavorid = %flavor.flavorid, "Created flavor");
        Ok(flavor)
    }

    /// Soft-delete the flavor called `name`.
    #[instrument(skip(self))]
    pub async fn destroy(&self, name: &str) -> Result<(), CatalogError> {
        if name.is_empty() || !self.store.soft_delete(name).await? {
            return Err(CatalogError::FlavorNotFoundByName(name.to_string()));
        }
        info!("Deleted flavor");
        Ok(())
    }

    /// Look up a flavor by name; no name means the configured default.
    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: Option<&str>) -> Result<Flavor, CatalogError> {
        match name.filter(|n| !n.is_empty()) {
            None => self.get_default().await,
            Some(name) => self
                .store
                .find_by(FlavorKey::Name(name), ReadDeleted::No)
                .await?
                .ok_or_else(|| CatalogError::FlavorNotFoundByName(name.to_string())),
        }
    }

    /// Look up a live flavor by its external id.
    pub async fn get_by_flavor_id(&self, flavorid: &str) -> Result<Flavor, CatalogError> {
        self.get_by_flavor_id_with(flavorid, ReadDeleted::No).await
    }

    /// Look up a flavor by its external id, optionally including deleted
    /// ones.
    #[instrument(skip(self))]
    pub async fn get_by_flavor_id_with(
        &self,
        flavorid: &str,
        read_deleted: ReadDeleted,
    ) -> Result<Flavor, CatalogError> {
        self.store
            .find_by(FlavorKey::FlavorId(flavorid), read_deleted)
            .await?
            .ok_or_else(|| CatalogError::FlavorNotFound(flavorid.to_string()))
    }

    /// Resolve the configured default flavor, by name first and then by
    /// flavor id.
    pub async fn get_default(&self) -> Result<Flavor, CatalogError> {
        let wanted = self.config.default_flavor.as_str();
        if let Some(flavor) = self
            .store
            .find_by(FlavorKey::Name(wanted), ReadDeleted::No)
            .await?
        {
            return Ok(flavor);
        }
        match self
            .store
            .find_by(FlavorKey::FlavorId(wanted), ReadDeleted::No)
            .await?
        {
            Some(flavor) => Ok(flavor),
            None => {
                warn!(default_flavor = wanted, "Configured default flavor does not exist");
                Err(CatalogError::FlavorNotFound(wanted.to_string()))
            }
        }
    }

    /// List flavors with filtering, sorting and marker pagination.
    #[instrument(skip(self, opts), fields(sort_key = %opts.sort_key, marker = ?opts.marker))]
    pub async fn list(&self, opts: &ListOptions) -> Result<Vec<Flavor>, CatalogError> {
        let read_deleted = if opts.include_deleted {
            ReadDeleted::Yes
        } else {
            ReadDeleted::No
        };
        let flavors = self.store.find_all(read_deleted).await?;
        paginate(flavors, opts)
    }

    /// Set extra specs on a flavor, overwriting existing keys.
    #[instrument(skip(self, specs))]
    pub async fn update_extra_specs(
        &self,
        flavorid: &str,
        specs: ExtraSpecs,
    ) -> Result<Flavor, CatalogError> {
        validate_extra_specs(&specs)?;
        let flavor = self.get_by_flavor_id(flavorid).await?;
        self.store.upsert_extra_specs(flavor.id, &specs).await?;
        debug!(count = specs.len(), "Updated extra specs");
        self.store
            .find_by(FlavorKey::Id(flavor.id), ReadDeleted::No)
            .await?
            .ok_or_else(|| CatalogError::FlavorNotFound(flavorid.to_string()))
    }

    /// Remove one extra spec from a flavor.
    #[instrument(skip(self))]
    pub async fn delete_extra_spec(&self, flavorid: &str, key: &str) -> Result<(), CatalogError> {
        let flavor = self.get_by_flavor_id(flavorid).await?;
        if !self.store.delete_extra_spec(flavor.id, key).await? {
            return Err(CatalogError::ExtraSpecNotFound {
                flavorid: flavorid.to_string(),
                key: key.to_string(),
            });
        }
        Ok(())
    }

    /// Projects granted access to a flavor.
    pub async fn get_access_by_flavor_id(
        &self,
        flavorid: &str,
    ) -> Result<Vec<FlavorAccess>, CatalogError> {
        let flavor = self.get_by_flavor_id(flavorid).await?;
        let projects = self.store.projects(flavor.id).await?;
        Ok(projects
            .into_iter()
            .map(|project_id| FlavorAccess {
                flavorid: flavor.flavorid.clone(),
                project_id,
            })
            .collect())
    }

    /// Grant a project access to a flavor.
    #[instrument(skip(self))]
    pub async fn add_access(&self, flavorid: &str, project_id: &str) -> Result<(), CatalogError> {
        if project_id.trim().is_empty() {
            return Err(CatalogError::invalid("project_id", "project id must not be empty"));
        }
        let flavor = self.get_by_flavor_id(flavorid).await?;
        if !self.store.add_project(flavor.id, project_id).await? {
            return Err(CatalogError::FlavorAccessExists {
                flavorid: flavorid.to_string(),
                project_id: project_id.to_string(),
            });
        }
        info!("Granted flavor access");
        Ok(())
    }

    /// Revoke a project's access to a flavor.
    #[instrument(skip(self))]
    pub async fn remove_access(&self, flavorid: &str, project_id: &str) -> Result<(), CatalogError> {
        let flavor = self.get_by_flavor_id(flavorid).await?;
        if !self.store.remove_project(flavor.id, project_id).await? {
            return Err(CatalogError::FlavorAccessNotFound {
                flavorid: flavorid.to_string(),
                project_id: project_id.to_string(),
            });
        }
        info!("Revoked flavor access");
        Ok(())
    }
}
