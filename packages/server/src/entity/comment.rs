use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub product_id: i32,
    #[sea_orm(belongs_to, from = "product_id", to = "id", on_delete = "Cascade")]
    pub product: HasOne<super::product::Entity>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Set once at insert time, never updated.
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
