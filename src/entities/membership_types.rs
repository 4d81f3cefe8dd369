use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// A purchasable plan offered by one gym.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "membership_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub gym_id: i64,
    pub title: String,
    pub days: i32,
    pub price: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
