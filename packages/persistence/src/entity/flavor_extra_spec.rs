use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flavor_extra_spec")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "flavor_spec_key")]
    pub flavor_id: i32,
    #[sea_orm(unique_key = "flavor_spec_key")]
    pub spec_key: String,
    pub spec_value: String,

    #[sea_orm(belongs_to, from = "flavor_id", to = "id")]
    pub flavor: HasOne<super::flavor::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
