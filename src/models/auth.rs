use crate::entities::user_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "09123456789")]
    pub phone: String,
    #[schema(example = "secret1")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestOtpRequest {
    #[schema(example = "09123456789")]
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestOtpResponse {
    /// seconds until the code expires
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    #[schema(example = "09123456789")]
    pub phone: String,
    #[schema(example = "12345")]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub phone: String,
    pub full_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(user: user_entity::Model) -> Self {
        Self {
            id: user.id,
            phone: user.phone,
            full_name: user.full_name,
            email: user.email,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Tokens are also set as http-only cookies by the handler.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoleStatus {
    pub is_authenticated: bool,
    pub name: Option<String>,
    pub is_customer: bool,
    pub is_gym_manager: bool,
    pub is_gym_secretary: bool,
    pub is_platform_manager: bool,
}
