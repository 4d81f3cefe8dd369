use crate::entities::{AnnouncementType, announcement_entity, notification_entity, ticket_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnnouncementResponse {
    pub id: i64,
    pub sender_id: Option<i64>,
    pub gym_id: Option<i64>,
    #[serde(rename = "type")]
    pub announcement_type: AnnouncementType,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<announcement_entity::Model> for AnnouncementResponse {
    fn from(a: announcement_entity::Model) -> Self {
        Self {
            id: a.id,
            sender_id: a.sender_id,
            gym_id: a.gym_id,
            announcement_type: a.announcement_type,
            message: a.message,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAnnouncementRequest {
    /// required for gym announcements, ignored for platform ones
    pub gym_id: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub message: String,
    pub is_read: bool,
    #[schema(value_type = Object)]
    pub meta: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<notification_entity::Model> for NotificationResponse {
    fn from(n: notification_entity::Model) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            action: n.action,
            message: n.message,
            is_read: n.is_read,
            meta: n.meta.and_then(|m| serde_json::from_str(&m).ok()),
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketResponse {
    pub id: i64,
    pub sender_id: Option<i64>,
    pub message: String,
    pub replied_to: Option<i64>,
    pub send_time: DateTime<Utc>,
}

impl From<ticket_entity::Model> for TicketResponse {
    fn from(t: ticket_entity::Model) -> Self {
        Self {
            id: t.id,
            sender_id: t.sender_id,
            message: t.message,
            replied_to: t.replied_to_id,
            send_time: t.send_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTicketRequest {
    pub message: String,
    pub replied_to: Option<i64>,
}
