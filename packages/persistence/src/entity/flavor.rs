use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flavor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub flavorid: String,
    pub name: String,

    pub memory_mb: i32,
    pub vcpus: i32,
    pub root_gb: i32,
    pub ephemeral_gb: i32,
    pub swap: i32, // in MB
    #[sea_orm(column_type = "Double")]
    pub rxtx_factor: f64,
    pub vcpu_weight: Option<i32>,

    pub is_public: bool,
    pub disabled: bool,

    /// 0 while live, the row id once soft-deleted.
    pub deleted: i32,

    #[sea_orm(has_many)]
    pub extra_specs: HasMany<super::flavor_extra_spec::Entity>,

    #[sea_orm(has_many)]
    pub projects: HasMany<super::flavor_project::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub deleted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
