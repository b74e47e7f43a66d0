use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(default_value = 0)]
    pub count: i32,

    // Size is an owned value type flattened into two columns.
    pub size_width: f64,
    pub size_height: f64,

    pub weight: f64,

    /// Relative URL of the stored image, e.g. `/uploads/<uuid>.png`.
    pub image_url: Option<String>,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
