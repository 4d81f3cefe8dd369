use crate::entities::{Gender, customer_entity, user_entity};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterCustomerRequest {
    #[schema(example = "09123456789")]
    pub phone: String,
    #[schema(example = "Sara Ahmadi")]
    pub full_name: String,
    pub email: Option<String>,
    #[schema(example = "secret1")]
    pub password: String,
    pub city: Option<String>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCustomerProfileRequest {
    pub full_name: Option<String>,
    pub national_code: Option<String>,
    pub city: Option<String>,
    pub gender: Option<Gender>,
    pub profile_photo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerProfileResponse {
    pub id: i64,
    pub user_id: i64,
    pub phone: String,
    pub full_name: String,
    pub email: Option<String>,
    pub national_code: Option<String>,
    pub city: Option<String>,
    pub gender: Option<Gender>,
    pub profile_photo: Option<String>,
    pub balance: i64,
    pub is_deleted: bool,
}

impl CustomerProfileResponse {
    pub fn new(customer: customer_entity::Model, user: &user_entity::Model) -> Self {
        Self {
            id: customer.id,
            user_id: customer.user_id,
            phone: user.phone.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            national_code: customer.national_code,
            city: customer.city,
            gender: customer.gender,
            profile_photo: customer.profile_photo,
            balance: customer.balance,
            is_deleted: customer.is_deleted,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerAuthResponse {
    pub profile: CustomerProfileResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}
