use crate::models::{CustomerProfileResponse, InOutResponse, MembershipResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A customer as seen from the gym panel. `is_active` only considers
/// memberships at gyms the caller can see.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GymPanelCustomerResponse {
    #[serde(flatten)]
    pub customer: CustomerProfileResponse,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GymPanelCustomerDetailResponse {
    #[serde(flatten)]
    pub customer: CustomerProfileResponse,
    pub is_active: bool,
    pub memberships: Vec<MembershipResponse>,
    pub in_outs: Vec<InOutResponse>,
}
