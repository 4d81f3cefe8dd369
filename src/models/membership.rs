use crate::entities::membership_entity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";

/// Display label for the usable/unusable state.
pub fn status_label(usable: bool) -> String {
    if usable { STATUS_ACTIVE } else { STATUS_INACTIVE }.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipResponse {
    pub id: i64,
    pub customer_id: i64,
    pub gym_id: i64,
    pub type_id: i64,
    pub transaction_id: Option<i64>,
    pub start_date: NaiveDate,
    pub validity_date: Option<NaiveDate>,
    pub session_left: i32,
    pub price: i64,
    pub days: i32,
    /// payment completed
    pub is_active: bool,
    /// derived: "active" while sessions remain and the validity date holds
    pub status: String,
}

impl MembershipResponse {
    pub fn new(m: membership_entity::Model, today: NaiveDate) -> Self {
        let status = status_label(m.is_usable_on(today));
        Self {
            id: m.id,
            customer_id: m.customer_id,
            gym_id: m.gym_id,
            type_id: m.type_id,
            transaction_id: m.transaction_id,
            start_date: m.start_date,
            validity_date: m.validity_date,
            session_left: m.session_left,
            price: m.price,
            days: m.days,
            is_active: m.is_active,
            status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignUpMembershipRequest {
    pub membership_type_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResult {
    pub activated: bool,
    pub reference: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignUpMembershipResponse {
    pub membership: MembershipResponse,
    pub payment: PaymentResult,
}
