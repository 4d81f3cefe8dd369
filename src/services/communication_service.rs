use crate::entities::{
    AnnouncementType, announcement_entity as announcements, gym_entity as gyms,
    membership_entity as memberships, notification_entity as notifications,
    ticket_entity as tickets,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{IdentityService, NotificationHub};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

#[derive(Clone)]
pub struct CommunicationService {
    pool: DatabaseConnection,
    hub: NotificationHub,
    identity_service: IdentityService,
}

impl CommunicationService {
    pub fn new(
        pool: DatabaseConnection,
        hub: NotificationHub,
        identity_service: IdentityService,
    ) -> Self {
        Self {
            pool,
            hub,
            identity_service,
        }
    }

    /// Persists a notification, then pushes it to the user's open sockets.
    pub async fn notify(
        &self,
        user_id: i64,
        action: &str,
        message: &str,
        meta: Option<serde_json::Value>,
    ) -> AppResult<NotificationResponse> {
        let row = notifications::ActiveModel {
            user_id: Set(user_id),
            action: Set(action.to_string()),
            message: Set(message.to_string()),
            is_read: Set(false),
            meta: Set(meta.map(|m| m.to_string())),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        let notification = NotificationResponse::from(row);
        let payload = serde_json::to_string(&notification)?;
        let delivered = self.hub.publish(user_id, &payload).await;
        log::debug!(
            "notification {} for user {user_id} pushed to {delivered} socket(s)",
            notification.id
        );

        Ok(notification)
    }

    pub async fn gym_announcements_for_customer(
        &self,
        user_id: i64,
    ) -> AppResult<Vec<AnnouncementResponse>> {
        let identity = self.identity_service.resolve(user_id).await?;
        let customer = identity
            .customer()
            .ok_or_else(|| AppError::NotFound("Customer profile not found".to_string()))?;

        let today = Utc::now().date_naive();
        let gym_ids = memberships::usable_gym_ids(&self.pool, customer.id, today).await?;

        let rows = announcements::Entity::find()
            .filter(announcements::Column::AnnouncementType.eq(AnnouncementType::Gym))
            .filter(announcements::Column::GymId.is_in(gym_ids))
            .order_by_desc(announcements::Column::Id)
            .all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound(
                "No gym announcements found for this customer".to_string(),
            ));
        }
        Ok(rows.into_iter().map(AnnouncementResponse::from).collect())
    }

    pub async fn platform_announcements(&self) -> AppResult<Vec<AnnouncementResponse>> {
        let rows = announcements::Entity::find()
            .filter(announcements::Column::AnnouncementType.eq(AnnouncementType::Platform))
            .order_by_desc(announcements::Column::Id)
            .all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound(
                "No platform announcements found".to_string(),
            ));
        }
        Ok(rows.into_iter().map(AnnouncementResponse::from).collect())
    }

    fn check_message(message: &str) -> AppResult<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::ValidationError(
                "Message must not be empty".to_string(),
            ));
        }
        Ok(message.to_string())
    }

    /// A manager announcing to the members of one of its own gyms.
    pub async fn create_gym_announcement(
        &self,
        user_id: i64,
        request: CreateAnnouncementRequest,
    ) -> AppResult<AnnouncementResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        let manager = identity.require_gym_manager()?;
        let message = Self::check_message(&request.message)?;
        let gym_id = request
            .gym_id
            .ok_or_else(|| AppError::ValidationError("gym_id is required".to_string()))?;

        let owned = gyms::Entity::find_by_id(gym_id)
            .filter(gyms::Column::ManagerId.eq(manager.id))
            .one(&self.pool)
            .await?;
        if owned.is_none() {
            return Err(AppError::PermissionDenied);
        }

        let row = announcements::ActiveModel {
            sender_id: Set(Some(identity.user.id)),
            gym_id: Set(Some(gym_id)),
            announcement_type: Set(AnnouncementType::Gym),
            message: Set(message),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Gym announcement {} posted for gym {gym_id}", row.id);
        Ok(AnnouncementResponse::from(row))
    }

    pub async fn create_platform_announcement(
        &self,
        user_id: i64,
        request: CreateAnnouncementRequest,
    ) -> AppResult<AnnouncementResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        identity.require_platform_admin()?;
        let message = Self::check_message(&request.message)?;

        let row = announcements::ActiveModel {
            sender_id: Set(Some(identity.user.id)),
            gym_id: Set(None),
            announcement_type: Set(AnnouncementType::Platform),
            message: Set(message),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Platform announcement {} posted", row.id);
        Ok(AnnouncementResponse::from(row))
    }

    pub async fn notifications(&self, user_id: i64) -> AppResult<Vec<NotificationResponse>> {
        let identity = self.identity_service.resolve(user_id).await?;
        let rows = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(identity.user.id))
            .order_by_desc(notifications::Column::Id)
            .all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound("No notifications found".to_string()));
        }
        Ok(rows.into_iter().map(NotificationResponse::from).collect())
    }

    pub async fn mark_notification_read(
        &self,
        user_id: i64,
        notification_id: i64,
    ) -> AppResult<NotificationResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        let row = notifications::Entity::find_by_id(notification_id)
            .filter(notifications::Column::UserId.eq(identity.user.id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if row.is_read {
            return Ok(NotificationResponse::from(row));
        }
        let mut active = row.into_active_model();
        active.is_read = Set(true);
        let row = active.update(&self.pool).await?;
        Ok(NotificationResponse::from(row))
    }

    pub async fn tickets(&self, user_id: i64) -> AppResult<Vec<TicketResponse>> {
        let identity = self.identity_service.resolve(user_id).await?;
        let rows = tickets::Entity::find()
            .filter(tickets::Column::SenderId.eq(identity.user.id))
            .order_by_desc(tickets::Column::SendTime)
            .order_by_desc(tickets::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(TicketResponse::from).collect())
    }

    pub async fn create_ticket(
        &self,
        user_id: i64,
        request: CreateTicketRequest,
    ) -> AppResult<TicketResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        let message = Self::check_message(&request.message)?;

        if let Some(parent_id) = request.replied_to {
            let parent = tickets::Entity::find_by_id(parent_id).one(&self.pool).await?;
            if parent.is_none() {
                return Err(AppError::ValidationError(
                    "The ticket being replied to does not exist".to_string(),
                ));
            }
        }

        let row = tickets::ActiveModel {
            sender_id: Set(Some(identity.user.id)),
            message: Set(message),
            replied_to_id: Set(request.replied_to),
            send_time: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(TicketResponse::from(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::GymGender;
    use crate::test_support::*;
    use chrono::Duration;

    fn service(db: &DatabaseConnection, hub: NotificationHub) -> CommunicationService {
        CommunicationService::new(db.clone(), hub, IdentityService::new(db.clone()))
    }

    #[tokio::test]
    async fn test_notify_persists_and_pushes() {
        let db = setup_db().await;
        let hub = NotificationHub::new();
        let service = service(&db, hub.clone());
        let user = seed_user(&db, "09123000001", "Lea").await;
        let mut socket = hub.subscribe(user.id).await;

        let sent = service
            .notify(user.id, "membership", "Welcome", Some(serde_json::json!({"id": 3})))
            .await
            .unwrap();

        let pushed = socket.receiver.recv().await.unwrap();
        let pushed: serde_json::Value = serde_json::from_str(&pushed).unwrap();
        assert_eq!(pushed["id"], sent.id);
        assert_eq!(pushed["meta"]["id"], 3);

        let listed = service.notifications(user.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].is_read);

        let read = service.mark_notification_read(user.id, sent.id).await.unwrap();
        assert!(read.is_read);
    }

    #[tokio::test]
    async fn test_empty_lists_are_not_found() {
        let db = setup_db().await;
        let service = service(&db, NotificationHub::new());
        let user = seed_user(&db, "09123000002", "Max").await;
        seed_customer(&db, user.id, None).await;

        assert!(matches!(
            service.notifications(user.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.platform_announcements().await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.gym_announcements_for_customer(user.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(service.tickets(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gym_announcements_follow_usable_memberships() {
        let db = setup_db().await;
        let service = service(&db, NotificationHub::new());
        let owner = seed_user(&db, "09123000003", "Owner").await;
        let manager = seed_manager(&db, owner.id).await;
        let gym_a = seed_gym(&db, manager.id, "A", true, GymGender::Both).await;
        let gym_b = seed_gym(&db, manager.id, "B", true, GymGender::Both).await;

        let member = seed_user(&db, "09123000004", "Member").await;
        let customer = seed_customer(&db, member.id, None).await;
        let type_a = seed_membership_type(&db, gym_a.id, 30, 100).await;
        let type_b = seed_membership_type(&db, gym_b.id, 30, 100).await;
        seed_membership(&db, customer.id, &type_a, 4, Some(today() + Duration::days(5))).await;
        // expired membership at B
        seed_membership(&db, customer.id, &type_b, 4, Some(today() - Duration::days(1))).await;

        for gym_id in [gym_a.id, gym_b.id] {
            service
                .create_gym_announcement(
                    owner.id,
                    CreateAnnouncementRequest {
                        gym_id: Some(gym_id),
                        message: format!("news for {gym_id}"),
                    },
                )
                .await
                .unwrap();
        }

        let visible = service.gym_announcements_for_customer(member.id).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].gym_id, Some(gym_a.id));
    }

    #[tokio::test]
    async fn test_announcement_permissions() {
        let db = setup_db().await;
        let service = service(&db, NotificationHub::new());
        let owner = seed_user(&db, "09123000005", "Owner").await;
        let manager = seed_manager(&db, owner.id).await;
        let gym = seed_gym(&db, manager.id, "A", true, GymGender::Both).await;
        let stranger = seed_user(&db, "09123000006", "Other").await;
        seed_manager(&db, stranger.id).await;

        let request = || CreateAnnouncementRequest {
            gym_id: Some(gym.id),
            message: "closed tomorrow".to_string(),
        };
        assert!(matches!(
            service.create_gym_announcement(stranger.id, request()).await,
            Err(AppError::PermissionDenied)
        ));
        assert!(matches!(
            service.create_platform_announcement(owner.id, request()).await,
            Err(AppError::PermissionDenied)
        ));

        seed_admin(&db, stranger.id).await;
        service
            .create_platform_announcement(stranger.id, request())
            .await
            .unwrap();
        let listed = service.platform_announcements().await.unwrap();
        assert_eq!(listed[0].gym_id, None);
    }

    #[tokio::test]
    async fn test_ticket_replies() {
        let db = setup_db().await;
        let service = service(&db, NotificationHub::new());
        let user = seed_user(&db, "09123000007", "Asker").await;

        let first = service
            .create_ticket(
                user.id,
                CreateTicketRequest {
                    message: "door is broken".to_string(),
                    replied_to: None,
                },
            )
            .await
            .unwrap();
        let reply = service
            .create_ticket(
                user.id,
                CreateTicketRequest {
                    message: "still broken".to_string(),
                    replied_to: Some(first.id),
                },
            )
            .await
            .unwrap();
        assert_eq!(reply.replied_to, Some(first.id));

        let dangling = service
            .create_ticket(
                user.id,
                CreateTicketRequest {
                    message: "hello".to_string(),
                    replied_to: Some(9999),
                },
            )
            .await;
        assert!(matches!(dangling, Err(AppError::ValidationError(_))));
        assert_eq!(service.tickets(user.id).await.unwrap().len(), 2);
    }
}
