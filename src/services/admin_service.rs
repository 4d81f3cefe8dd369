use crate::entities::{
    api_key_entity as api_keys, block_list_entity as block_lists, customer_entity as customers,
    gym_entity as gyms, in_out_entity as in_outs, membership_entity as memberships,
    rate_entity as rates, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::IdentityService;
use crate::utils::generate_api_key;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

/// Platform administration. Every operation requires a platform-manager profile.
#[derive(Clone)]
pub struct AdminService {
    pool: DatabaseConnection,
    identity_service: IdentityService,
}

impl AdminService {
    pub fn new(pool: DatabaseConnection, identity_service: IdentityService) -> Self {
        Self {
            pool,
            identity_service,
        }
    }

    async fn require_admin(&self, user_id: i64) -> AppResult<()> {
        let identity = self.identity_service.resolve(user_id).await?;
        identity.require_platform_admin()?;
        Ok(())
    }

    pub async fn customers(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<CustomerProfileResponse>> {
        self.require_admin(user_id).await?;

        let (page, page_size) = (params.page(), params.page_size());
        let paginator = customers::Entity::find()
            .filter(customers::Column::IsDeleted.eq(false))
            .order_by_asc(customers::Column::Id)
            .paginate(&self.pool, page_size);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        let user_ids: Vec<i64> = rows.iter().map(|c| c.user_id).collect();
        let owners: HashMap<i64, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let data = rows
            .into_iter()
            .filter_map(|c| {
                let user = owners.get(&c.user_id)?;
                Some(CustomerProfileResponse::new(c, user))
            })
            .collect();
        Ok(PaginatedResponse::new(data, page, page_size, total))
    }

    /// Deleted customers stay visible here.
    pub async fn customer_detail(
        &self,
        user_id: i64,
        customer_id: i64,
    ) -> AppResult<AdminCustomerDetailResponse> {
        self.require_admin(user_id).await?;

        let customer = customers::Entity::find_by_id(customer_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;
        let user = users::Entity::find_by_id(customer.user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;

        let today = Utc::now().date_naive();
        let mut held = memberships::Entity::find()
            .filter(memberships::Column::CustomerId.eq(customer.id))
            .all(&self.pool)
            .await?;
        memberships::sort_for_display(&mut held, today);

        let mut visits = in_outs::Entity::find()
            .filter(in_outs::Column::CustomerId.eq(customer.id))
            .all(&self.pool)
            .await?;
        in_outs::sort_newest_entry_first(&mut visits);

        let blocked = block_lists::Entity::find()
            .filter(block_lists::Column::CustomerId.eq(customer.id))
            .order_by_desc(block_lists::Column::Id)
            .all(&self.pool)
            .await?;
        let given_rates = rates::Entity::find()
            .filter(rates::Column::CustomerId.eq(customer.id))
            .order_by_desc(rates::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(AdminCustomerDetailResponse {
            customer: CustomerProfileResponse::new(customer, &user),
            memberships: held
                .into_iter()
                .map(|m| MembershipResponse::new(m, today))
                .collect(),
            in_outs: visits.into_iter().map(InOutResponse::from).collect(),
            block_lists: blocked.into_iter().map(BlockListResponse::from).collect(),
            rates: given_rates.into_iter().map(RateResponse::from).collect(),
        })
    }

    /// Soft delete: the row is flagged, never removed.
    pub async fn delete_customer(
        &self,
        user_id: i64,
        customer_id: i64,
    ) -> AppResult<CustomerProfileResponse> {
        self.require_admin(user_id).await?;

        let customer = customers::Entity::find_by_id(customer_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;
        let user = users::Entity::find_by_id(customer.user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;

        let customer = if customer.is_deleted {
            customer
        } else {
            let mut active = customer.into_active_model();
            active.is_deleted = Set(true);
            let customer = active.update(&self.pool).await?;
            log::info!("Customer {} soft-deleted by user {user_id}", customer.id);
            customer
        };

        Ok(CustomerProfileResponse::new(customer, &user))
    }

    pub async fn create_api_key(
        &self,
        user_id: i64,
        request: CreateApiKeyRequest,
    ) -> AppResult<ApiKeyResponse> {
        self.require_admin(user_id).await?;

        let client_name = request.client_name.trim().to_string();
        if client_name.is_empty() {
            return Err(AppError::ValidationError(
                "client_name is required".to_string(),
            ));
        }

        let row = api_keys::ActiveModel {
            key: Set(generate_api_key()),
            client_name: Set(client_name),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("API key {} issued for {}", row.id, row.client_name);
        Ok(ApiKeyResponse::from(row))
    }

    /// Approves a gym so it appears in the customer catalog.
    pub async fn activate_gym(&self, user_id: i64, gym_id: i64) -> AppResult<GymResponse> {
        self.require_admin(user_id).await?;

        let gym = gyms::Entity::find_by_id(gym_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gym not found".to_string()))?;
        if gym.is_active {
            return Ok(GymResponse::from(gym));
        }

        let mut active = gym.into_active_model();
        active.is_active = Set(true);
        let gym = active.update(&self.pool).await?;
        log::info!("Gym {} activated", gym.id);
        Ok(GymResponse::from(gym))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Gender, GymGender};
    use crate::test_support::*;

    async fn admin_and_service(db: &DatabaseConnection) -> (i64, AdminService) {
        let admin = seed_user(db, "09121300001", "Admin").await;
        seed_admin(db, admin.id).await;
        (
            admin.id,
            AdminService::new(db.clone(), IdentityService::new(db.clone())),
        )
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_record_queryable() {
        let db = setup_db().await;
        let (admin, service) = admin_and_service(&db).await;
        let user = seed_user(&db, "09121300002", "Leaving").await;
        let customer = seed_customer(&db, user.id, Some(Gender::Male)).await;

        let deleted = service.delete_customer(admin, customer.id).await.unwrap();
        assert!(deleted.is_deleted);

        let row = customers::Entity::find_by_id(customer.id)
            .one(&db)
            .await
            .unwrap()
            .expect("row must still exist");
        assert!(row.is_deleted);

        let detail = service.customer_detail(admin, customer.id).await.unwrap();
        assert!(detail.customer.is_deleted);

        let listed = service
            .customers(admin, &PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(listed.total, 0);

        // repeating the delete is harmless
        assert!(service.delete_customer(admin, customer.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_customer_list_paginates() {
        let db = setup_db().await;
        let (admin, service) = admin_and_service(&db).await;
        for i in 0..3 {
            let user = seed_user(&db, &format!("0912130010{i}"), "Member").await;
            seed_customer(&db, user.id, None).await;
        }

        let params = PaginationParams {
            page: Some(2),
            page_size: Some(2),
        };
        let page = service.customers(admin, &params).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_customer_detail_collects_history() {
        let db = setup_db().await;
        let (admin, service) = admin_and_service(&db).await;
        let owner = seed_user(&db, "09121300003", "Owner").await;
        let manager = seed_manager(&db, owner.id).await;
        let gym = seed_gym(&db, manager.id, "G", true, GymGender::Both).await;
        let plan = seed_membership_type(&db, gym.id, 10, 10).await;
        let user = seed_user(&db, "09121300004", "Member").await;
        let customer = seed_customer(&db, user.id, None).await;
        seed_membership(&db, customer.id, &plan, 10, None).await;
        block_lists::ActiveModel {
            customer_id: Set(customer.id),
            gym_id: Set(gym.id),
            description: Set(Some("unpaid locker".to_string())),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        rates::ActiveModel {
            customer_id: Set(customer.id),
            gym_id: Set(gym.id),
            rate: Set(4),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let detail = service.customer_detail(admin, customer.id).await.unwrap();
        assert_eq!(detail.memberships.len(), 1);
        assert_eq!(detail.block_lists.len(), 1);
        assert_eq!(detail.rates[0].rate, 4);
        assert!(detail.in_outs.is_empty());
    }

    #[tokio::test]
    async fn test_api_keys_and_gym_activation() {
        let db = setup_db().await;
        let (admin, service) = admin_and_service(&db).await;
        let owner = seed_user(&db, "09121300005", "Owner").await;
        let manager = seed_manager(&db, owner.id).await;
        let gym = seed_gym(&db, manager.id, "Pending", false, GymGender::Both).await;

        assert!(matches!(
            service.activate_gym(owner.id, gym.id).await,
            Err(AppError::PermissionDenied)
        ));
        assert!(service.activate_gym(admin, gym.id).await.unwrap().is_active);

        let key = service
            .create_api_key(
                admin,
                CreateApiKeyRequest {
                    client_name: "android-app".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(key.key.len(), 70);
        assert!(key.is_active);
    }
}
