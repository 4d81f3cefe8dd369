use crate::entities::{api_key_entity, block_list_entity, rate_entity};
use crate::models::{CustomerProfileResponse, InOutResponse, MembershipResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminCustomerDetailResponse {
    pub customer: CustomerProfileResponse,
    pub memberships: Vec<MembershipResponse>,
    pub in_outs: Vec<InOutResponse>,
    pub block_lists: Vec<BlockListResponse>,
    pub rates: Vec<RateResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockListResponse {
    pub id: i64,
    pub gym_id: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<block_list_entity::Model> for BlockListResponse {
    fn from(b: block_list_entity::Model) -> Self {
        Self {
            id: b.id,
            gym_id: b.gym_id,
            description: b.description,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateResponse {
    pub id: i64,
    pub gym_id: i64,
    pub rate: i16,
    pub created_at: DateTime<Utc>,
}

impl From<rate_entity::Model> for RateResponse {
    fn from(r: rate_entity::Model) -> Self {
        Self {
            id: r.id,
            gym_id: r.gym_id,
            rate: r.rate,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateApiKeyRequest {
    #[schema(example = "android-app")]
    pub client_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyResponse {
    pub id: i64,
    pub key: String,
    pub client_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<api_key_entity::Model> for ApiKeyResponse {
    fn from(k: api_key_entity::Model) -> Self {
        Self {
            id: k.id,
            key: k.key,
            client_name: k.client_name,
            is_active: k.is_active,
            created_at: k.created_at,
        }
    }
}
