use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::customers::Gender;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum GymGender {
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
    #[sea_orm(string_value = "both")]
    Both,
}

impl std::fmt::Display for GymGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GymGender::Male => write!(f, "male"),
            GymGender::Female => write!(f, "female"),
            GymGender::Both => write!(f, "both"),
        }
    }
}

impl GymGender {
    /// `both` admits everyone, otherwise the customer's gender must match.
    pub fn admits(&self, gender: &Gender) -> bool {
        matches!(
            (self, gender),
            (GymGender::Both, _)
                | (GymGender::Male, Gender::Male)
                | (GymGender::Female, Gender::Female)
        )
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum CommissionType {
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "daily")]
    Daily,
}

impl std::fmt::Display for CommissionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommissionType::Monthly => write!(f, "monthly"),
            CommissionType::Daily => write!(f, "daily"),
        }
    }
}

/// A gym stays hidden from customers until the platform flips `is_active`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "gyms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// gym_managers.id of the owner
    pub manager_id: i64,
    pub title: String,
    pub location: Option<String>,
    pub address: Option<String>,
    pub main_img: Option<String>,
    pub phone: Option<String>,
    pub headline_phone: Option<String>,
    pub gender: GymGender,
    pub commission_type: CommissionType,
    pub facilities: Option<String>,
    pub description: Option<String>,
    pub work_hours_per_day: Option<i32>,
    pub work_days_per_week: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gym_gender_admits() {
        assert!(GymGender::Both.admits(&Gender::Male));
        assert!(GymGender::Both.admits(&Gender::Female));
        assert!(GymGender::Male.admits(&Gender::Male));
        assert!(!GymGender::Male.admits(&Gender::Female));
        assert!(!GymGender::Female.admits(&Gender::Male));
    }
}
