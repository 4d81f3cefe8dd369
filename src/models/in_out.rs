use crate::entities::in_out_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct EnterRequest {
    pub gym_id: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ConfirmEntryRequest {
    pub closet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InOutResponse {
    pub id: i64,
    pub customer_id: i64,
    pub gym_id: i64,
    pub subscription_id: i64,
    pub closet: Option<String>,
    pub enter_time: Option<DateTime<Utc>>,
    pub out_time: Option<DateTime<Utc>>,
    pub confirm_in: bool,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
}

impl From<in_out_entity::Model> for InOutResponse {
    fn from(m: in_out_entity::Model) -> Self {
        let is_open = m.is_open();
        Self {
            id: m.id,
            customer_id: m.customer_id,
            gym_id: m.gym_id,
            subscription_id: m.subscription_id,
            closet: m.closet,
            enter_time: m.enter_time,
            out_time: m.out_time,
            confirm_in: m.confirm_in,
            is_open,
            created_at: m.created_at,
        }
    }
}
