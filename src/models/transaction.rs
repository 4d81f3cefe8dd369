use crate::entities::{PaymentMethod, transaction_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i64,
    pub payer_id: Option<i64>,
    pub receiver_id: Option<i64>,
    pub payment_method: PaymentMethod,
    pub online_transaction: Option<String>,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl From<transaction_entity::Model> for TransactionResponse {
    fn from(t: transaction_entity::Model) -> Self {
        Self {
            id: t.id,
            payer_id: t.payer_id,
            receiver_id: t.receiver_id,
            payment_method: t.payment_method,
            online_transaction: t.online_transaction,
            price: t.price,
            created_at: t.created_at,
        }
    }
}
