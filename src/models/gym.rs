use crate::entities::{
    CommissionType, GymGender, gym_banner_entity, gym_entity, gym_image_entity,
    gym_manager_entity, membership_type_entity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GymResponse {
    pub id: i64,
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

impl From<gym_entity::Model> for GymResponse {
    fn from(gym: gym_entity::Model) -> Self {
        Self {
            id: gym.id,
            manager_id: gym.manager_id,
            title: gym.title,
            location: gym.location,
            address: gym.address,
            main_img: gym.main_img,
            phone: gym.phone,
            headline_phone: gym.headline_phone,
            gender: gym.gender,
            commission_type: gym.commission_type,
            facilities: gym.facilities,
            description: gym.description,
            work_hours_per_day: gym.work_hours_per_day,
            work_days_per_week: gym.work_days_per_week,
            is_active: gym.is_active,
            created_at: gym.created_at,
        }
    }
}

/// A gym as seen by a customer, with the customer's membership status there.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerGymResponse {
    #[serde(flatten)]
    pub gym: GymResponse,
    /// "active" when the customer holds a usable membership at this gym
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GymDetailResponse {
    #[serde(flatten)]
    pub gym: GymResponse,
    pub status: String,
    pub membership_types: Vec<MembershipTypeResponse>,
    pub images: Vec<GymMediaResponse>,
    pub banners: Vec<GymMediaResponse>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateGymRequest {
    #[schema(example = "Iron Paradise")]
    pub title: String,
    pub location: Option<String>,
    pub address: Option<String>,
    pub main_img: Option<String>,
    pub phone: Option<String>,
    pub headline_phone: Option<String>,
    pub gender: Option<GymGender>,
    pub commission_type: Option<CommissionType>,
    pub facilities: Option<String>,
    pub description: Option<String>,
    pub work_hours_per_day: Option<i32>,
    pub work_days_per_week: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipTypeResponse {
    pub id: i64,
    pub gym_id: i64,
    pub title: String,
    pub days: i32,
    pub price: i64,
    pub description: Option<String>,
}

impl From<membership_type_entity::Model> for MembershipTypeResponse {
    fn from(m: membership_type_entity::Model) -> Self {
        Self {
            id: m.id,
            gym_id: m.gym_id,
            title: m.title,
            days: m.days,
            price: m.price,
            description: m.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMembershipTypeRequest {
    pub gym_id: i64,
    #[schema(example = "Monthly")]
    pub title: String,
    #[schema(example = 30)]
    pub days: i32,
    #[schema(example = 1500000)]
    pub price: i64,
    pub description: Option<String>,
}

/// Images and banners share one shape.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GymMediaResponse {
    pub id: i64,
    pub gym_id: i64,
    pub image_url: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<gym_image_entity::Model> for GymMediaResponse {
    fn from(m: gym_image_entity::Model) -> Self {
        Self {
            id: m.id,
            gym_id: m.gym_id,
            image_url: m.image_url,
            title: m.title,
            created_at: m.created_at,
        }
    }
}

impl From<gym_banner_entity::Model> for GymMediaResponse {
    fn from(m: gym_banner_entity::Model) -> Self {
        Self {
            id: m.id,
            gym_id: m.gym_id,
            image_url: m.image_url,
            title: m.title,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateGymMediaRequest {
    pub gym_id: i64,
    #[schema(example = "https://cdn.example.com/gyms/1/front.jpg")]
    pub image_url: String,
    pub title: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpgradeToManagerRequest {
    pub national_code: Option<String>,
    pub city: Option<String>,
    pub invitation_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GymManagerResponse {
    pub id: i64,
    pub user_id: i64,
    pub national_code: Option<String>,
    pub city: Option<String>,
    pub invitation_code: Option<String>,
    pub balance: i64,
}

impl From<gym_manager_entity::Model> for GymManagerResponse {
    fn from(m: gym_manager_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            national_code: m.national_code,
            city: m.city,
            invitation_code: m.invitation_code,
            balance: m.balance,
        }
    }
}
