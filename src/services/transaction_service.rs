use crate::entities::{
    gym_entity as gyms, gym_manager_entity as managers, membership_entity as memberships,
    transaction_entity as transactions,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{GymScope, IdentityService};
use sea_orm::sea_query::{Query, SelectStatement};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

#[derive(Clone)]
pub struct TransactionService {
    pool: DatabaseConnection,
    identity_service: IdentityService,
}

impl TransactionService {
    pub fn new(pool: DatabaseConnection, identity_service: IdentityService) -> Self {
        Self {
            pool,
            identity_service,
        }
    }

    fn to_responses(rows: Vec<transactions::Model>) -> Vec<TransactionResponse> {
        rows.into_iter().map(TransactionResponse::from).collect()
    }

    /// Payments made by the current user, newest first.
    pub async fn customer_transactions(&self, user_id: i64) -> AppResult<Vec<TransactionResponse>> {
        let identity = self.identity_service.resolve(user_id).await?;
        let rows = transactions::Entity::find()
            .filter(transactions::Column::PayerId.eq(identity.user.id))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound("No transactions found".to_string()));
        }
        Ok(Self::to_responses(rows))
    }

    /// Ids of membership-linked transactions, optionally limited to the scoped gyms.
    fn membership_transaction_ids(scope: Option<&GymScope>) -> SelectStatement {
        let mut query = Query::select();
        query
            .column(memberships::Column::TransactionId)
            .from(memberships::Entity)
            .and_where(memberships::Column::TransactionId.is_not_null());
        if let Some(scope) = scope {
            query.and_where(memberships::Column::GymId.is_in(scope.gym_ids()));
        }
        query.to_owned()
    }

    /// Membership payments at gyms in scope.
    pub async fn deposits(&self, user_id: i64) -> AppResult<Vec<TransactionResponse>> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        let rows = transactions::Entity::find()
            .filter(
                transactions::Column::Id
                    .in_subquery(Self::membership_transaction_ids(Some(&scope))),
            )
            .order_by_desc(transactions::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(Self::to_responses(rows))
    }

    /// Payouts to the managers behind the gyms in scope: received by a manager
    /// user and not tied to any membership.
    pub async fn withdrawals(&self, user_id: i64) -> AppResult<Vec<TransactionResponse>> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        if scope.is_empty() {
            return Ok(Vec::new());
        }

        let manager_ids: Vec<i64> = gyms::Entity::find()
            .select_only()
            .column(gyms::Column::ManagerId)
            .distinct()
            .filter(gyms::Column::Id.is_in(scope.gym_ids()))
            .into_tuple()
            .all(&self.pool)
            .await?;
        let receiver_ids: Vec<i64> = managers::Entity::find()
            .select_only()
            .column(managers::Column::UserId)
            .filter(managers::Column::Id.is_in(manager_ids))
            .into_tuple()
            .all(&self.pool)
            .await?;
        let rows = transactions::Entity::find()
            .filter(transactions::Column::ReceiverId.is_in(receiver_ids))
            .filter(
                transactions::Column::Id.not_in_subquery(Self::membership_transaction_ids(None)),
            )
            .order_by_desc(transactions::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(Self::to_responses(rows))
    }

    pub async fn all_transactions(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<TransactionResponse>> {
        let identity = self.identity_service.resolve(user_id).await?;
        identity.require_platform_admin()?;

        let (page, page_size) = (params.page(), params.page_size());
        let paginator = transactions::Entity::find()
            .order_by_desc(transactions::Column::Id)
            .paginate(&self.pool, page_size);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        Ok(PaginatedResponse::new(
            Self::to_responses(rows),
            page,
            page_size,
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{GymGender, PaymentMethod};
    use crate::test_support::*;
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};

    async fn seed_transaction(
        db: &DatabaseConnection,
        payer: Option<i64>,
        receiver: Option<i64>,
        price: i64,
    ) -> transactions::Model {
        transactions::ActiveModel {
            payer_id: Set(payer),
            receiver_id: Set(receiver),
            payment_method: Set(PaymentMethod::Cash),
            online_transaction: Set(None),
            price: Set(price),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    async fn link(db: &DatabaseConnection, membership: memberships::Model, transaction_id: i64) {
        let mut active = membership.into_active_model();
        active.transaction_id = Set(Some(transaction_id));
        active.update(db).await.unwrap();
    }

    #[tokio::test]
    async fn test_deposits_and_withdrawals_are_split() {
        let db = setup_db().await;
        let owner = seed_user(&db, "09121200001", "Owner").await;
        let manager = seed_manager(&db, owner.id).await;
        let gym_a = seed_gym(&db, manager.id, "A", true, GymGender::Both).await;
        let gym_b = seed_gym(&db, manager.id, "B", true, GymGender::Both).await;
        let secretary = seed_user(&db, "09121200002", "Secretary").await;
        seed_secretary(&db, secretary.id, gym_b.id).await;

        let member = seed_user(&db, "09121200003", "Member").await;
        let customer = seed_customer(&db, member.id, None).await;
        let plan_a = seed_membership_type(&db, gym_a.id, 10, 100).await;
        let plan_b = seed_membership_type(&db, gym_b.id, 10, 200).await;
        let m_a = seed_membership(&db, customer.id, &plan_a, 10, None).await;
        let m_b = seed_membership(&db, customer.id, &plan_b, 10, None).await;

        let pay_a = seed_transaction(&db, Some(member.id), Some(owner.id), 100).await;
        let pay_b = seed_transaction(&db, Some(member.id), Some(owner.id), 200).await;
        link(&db, m_a, pay_a.id).await;
        link(&db, m_b, pay_b.id).await;
        // an unpaid membership has no transaction and must not hide payouts
        seed_membership(&db, customer.id, &plan_a, 10, None).await;
        let payout = seed_transaction(&db, None, Some(owner.id), 5_000).await;
        seed_transaction(&db, None, Some(member.id), 1).await;

        let service = TransactionService::new(db.clone(), IdentityService::new(db.clone()));

        let deposits = service.deposits(owner.id).await.unwrap();
        assert_eq!(deposits.len(), 2);
        let deposits = service.deposits(secretary.id).await.unwrap();
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits[0].id, pay_b.id);

        let withdrawals = service.withdrawals(owner.id).await.unwrap();
        assert_eq!(withdrawals.len(), 1);
        assert_eq!(withdrawals[0].id, payout.id);

        let mine = service.customer_transactions(member.id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(matches!(
            service.customer_transactions(owner.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_all_transactions_is_admin_only() {
        let db = setup_db().await;
        let admin = seed_user(&db, "09121200004", "Admin").await;
        let member = seed_user(&db, "09121200005", "Member").await;
        for price in 1..=3 {
            seed_transaction(&db, Some(member.id), None, price).await;
        }
        let service = TransactionService::new(db.clone(), IdentityService::new(db.clone()));
        let params = PaginationParams {
            page: Some(1),
            page_size: Some(2),
        };

        assert!(matches!(
            service.all_transactions(admin.id, &params).await,
            Err(AppError::PermissionDenied)
        ));
        seed_admin(&db, admin.id).await;
        let page = service.all_transactions(admin.id, &params).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 2);
    }
}
