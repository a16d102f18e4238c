use std::collections::HashMap;

use async_trait::async_trait;
use catalog::store::{FlavorKey, FlavorStore, ReadDeleted, StoreError, UniqueKey};
use catalog::{ExtraSpecs, Flavor, NewFlavor};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::debug;

use crate::entity::{flavor, flavor_extra_spec, flavor_project};
use crate::seed::{FLAVORID_INDEX, NAME_INDEX};

fn backend(e: DbErr) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn to_flavor(model: flavor::Model, extra_specs: ExtraSpecs) -> Flavor {
    Flavor {
        id: model.id,
        flavorid: model.flavorid,
        name: model.name,
        memory_mb: model.memory_mb,
        vcpus: model.vcpus,
        root_gb: model.root_gb,
        ephemeral_gb: model.ephemeral_gb,
        swap: model.swap,
        rxtx_factor: model.rxtx_factor,
        vcpu_weight: model.vcpu_weight,
        is_public: model.is_public,
        disabled: model.disabled,
        extra_specs,
        created_at: Some(model.created_at),
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
        deleted: model.deleted != 0,
    }
}

async fn touch<C: ConnectionTrait>(conn: &C, id: i32) -> Result<(), StoreError> {
    let model = flavor::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(backend)?
        .ok_or_else(|| StoreError::NotFound(format!("id {id}")))?;
    let mut active: flavor::ActiveModel = model.into();
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await.map_err(backend)?;
    Ok(())
}

/// Flavor store backed by a SeaORM connection.
///
/// Uniqueness of live names and flavor ids is enforced by the indexes
/// created in [`crate::seed::ensure_indexes`].
#[derive(Clone)]
pub struct SeaOrmFlavorStore {
    db: DatabaseConnection,
}

impl SeaOrmFlavorStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn specs_for(&self, ids: &[i32]) -> Result<HashMap<i32, ExtraSpecs>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = flavor_extra_spec::Entity::find()
            .filter(flavor_extra_spec::Column::FlavorId.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(backend)?;

        let mut grouped: HashMap<i32, ExtraSpecs> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.flavor_id)
                .or_default()
                .insert(row.spec_key, row.spec_value);
        }
        Ok(grouped)
    }

    async fn hydrate(&self, model: flavor::Model) -> Result<Flavor, StoreError> {
        let id = model.id;
        let specs = self.specs_for(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(to_flavor(model, specs))
    }

    async fn require(&self, id: i32) -> Result<(), StoreError> {
        match flavor::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(backend)?
        {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(format!("id {id}"))),
        }
    }

    /// Work out which unique index a failed insert hit. Postgres and MySQL
    /// name the index, SQLite names the columns.
    async fn collided_key(&self, err: &DbErr, name: &str) -> Result<UniqueKey, StoreError> {
        if let Some(SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
            if msg.contains(NAME_INDEX) || msg.contains("flavor.name") {
                return Ok(UniqueKey::Name);
            }
            if msg.contains(FLAVORID_INDEX) || msg.contains("flavor.flavorid") {
                return Ok(UniqueKey::FlavorId);
            }
        }

        let name_taken = flavor::Entity::find()
            .filter(flavor::Column::Name.eq(name))
            .filter(flavor::Column::Deleted.eq(0))
            .one(&self.db)
            .await
            .map_err(backend)?
            .is_some();
        Ok(if name_taken {
            UniqueKey::Name
        } else {
            UniqueKey::FlavorId
        })
    }
}

#[async_trait]
impl FlavorStore for SeaOrmFlavorStore {
    async fn insert(&self, new: NewFlavor) -> Result<Flavor, StoreError> {
        let name = new.name.clone();
        let row = flavor::ActiveModel {
            flavorid: Set(new.flavorid),
            name: Set(new.name),
            memory_mb: Set(new.memory_mb),
            vcpus: Set(new.vcpus),
            root_gb: Set(new.root_gb),
            ephemeral_gb: Set(new.ephemeral_gb),
            swap: Set(new.swap),
            rxtx_factor: Set(new.rxtx_factor),
            vcpu_weight: Set(None),
            is_public: Set(new.is_public),
            disabled: Set(false),
            deleted: Set(0),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            deleted_at: Set(None),
            ..Default::default()
        };

        match row.insert(&self.db).await {
            Ok(model) => Ok(to_flavor(model, ExtraSpecs::new())),
            Err(e) if is_unique_violation(&e) => {
                let key = self.collided_key(&e, &name).await?;
                debug!(?key, "Flavor insert hit a unique index");
                Err(StoreError::UniqueViolation(key))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn soft_delete(&self, name: &str) -> Result<bool, StoreError> {
        let txn = self.db.begin().await.map_err(backend)?;
        let Some(model) = flavor::Entity::find()
            .filter(flavor::Column::Name.eq(name))
            .filter(flavor::Column::Deleted.eq(0))
            .one(&txn)
            .await
            .map_err(backend)?
        else {
            return Ok(false);
        };

        let id = model.id;
        let mut active: flavor::ActiveModel = model.into();
        active.deleted = Set(id);
        active.deleted_at = Set(Some(Utc::now()));
        active.update(&txn).await.map_err(backend)?;
        txn.commit().await.map_err(backend)?;
        Ok(true)
    }

    async fn find_by(
        &self,
        key: FlavorKey<'_>,
        read_deleted: ReadDeleted,
    ) -> Result<Option<Flavor>, StoreError> {
        let query = match key {
            FlavorKey::Id(id) => flavor::Entity::find().filter(flavor::Column::Id.eq(id)),
            FlavorKey::Name(name) => flavor::Entity::find().filter(flavor::Column::Name.eq(name)),
            FlavorKey::FlavorId(flavorid) => {
                flavor::Entity::find().filter(flavor::Column::Flavorid.eq(flavorid))
            }
        };

        let live = query
            .clone()
            .filter(flavor::Column::Deleted.eq(0))
            .one(&self.db)
            .await
            .map_err(backend)?;
        let found = match (live, read_deleted) {
            (Some(model), _) => Some(model),
            (None, ReadDeleted::No) => None,
            (None, ReadDeleted::Yes) => query
                .order_by_desc(flavor::Column::Id)
                .one(&self.db)
                .await
                .map_err(backend)?,
        };

        match found {
            Some(model) => Ok(Some(self.hydrate(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self, read_deleted: ReadDeleted) -> Result<Vec<Flavor>, StoreError> {
        let mut query = flavor::Entity::find().order_by_asc(flavor::Column::Id);
        if read_deleted == ReadDeleted::No {
            query = query.filter(flavor::Column::Deleted.eq(0));
        }
        let models = query.all(&self.db).await.map_err(backend)?;

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut specs = self.specs_for(&ids).await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let extra_specs = specs.remove(&model.id).unwrap_or_default();
                to_flavor(model, extra_specs)
            })
            .collect())
    }

    async fn upsert_extra_specs(&self, id: i32, specs: &ExtraSpecs) -> Result<(), StoreError> {
        self.require(id).await?;
        if specs.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await.map_err(backend)?;
        for (key, value) in specs {
            let row = flavor_extra_spec::ActiveModel {
                flavor_id: Set(id),
                spec_key: Set(key.clone()),
                spec_value: Set(value.clone()),
                ..Default::default()
            };
            flavor_extra_spec::Entity::insert(row)
                .on_conflict(
                    OnConflict::columns([
                        flavor_extra_spec::Column::FlavorId,
                        flavor_extra_spec::Column::SpecKey,
                    ])
                    .update_column(flavor_extra_spec::Column::SpecValue)
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(backend)?;
        }
        touch(&txn, id).await?;
        txn.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn delete_extra_spec(&self, id: i32, key: &str) -> Result<bool, StoreError> {
        self.require(id).await?;
        let result = flavor_extra_spec::Entity::delete_many()
            .filter(flavor_extra_spec::Column::FlavorId.eq(id))
            .filter(flavor_extra_spec::Column::SpecKey.eq(key))
            .exec(&self.db)
            .await
            .map_err(backend)?;

        let removed = result.rows_affected > 0;
        if removed {
            touch(&self.db, id).await?;
        }
        Ok(removed)
    }

    async fn add_project(&self, id: i32, project_id: &str) -> Result<bool, StoreError> {
        self.require(id).await?;
        let row = flavor_project::ActiveModel {
            flavor_id: Set(id),
            project_id: Set(project_id.to_string()),
            ..Default::default()
        };
        match row.insert(&self.db).await {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(backend(e)),
        }
    }

    async fn remove_project(&self, id: i32, project_id: &str) -> Result<bool, StoreError> {
        self.require(id).await?;
        let result = flavor_project::Entity::delete_many()
            .filter(flavor_project::Column::FlavorId.eq(id))
            .filter(flavor_project::Column::ProjectId.eq(project_id))
            .exec(&self.db)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected > 0)
    }

    async fn projects(&self, id: i32) -> Result<Vec<String>, StoreError> {
        self.require(id).await?;
        let rows = flavor_project::Entity::find()
            .filter(flavor_project::Column::FlavorId.eq(id))
            .order_by_asc(flavor_project::Column::ProjectId)
            .all(&self.db)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(|row| row.project_id).collect())
    }
}
