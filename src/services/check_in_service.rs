use crate::entities::{
    customer_entity as customers, gym_entity as gyms, in_out_entity as in_outs,
    membership_entity as memberships,
};
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::*;
use crate::services::{CommunicationService, GymScope, IdentityService};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::json;

pub const OPEN_REQUEST_EXISTS: &str = "An active entry request already exists for this gym";

/// Entry requests from customers and their confirmation from the gym panel.
#[derive(Clone)]
pub struct CheckInService {
    pool: DatabaseConnection,
    identity_service: IdentityService,
    communication_service: CommunicationService,
}

impl CheckInService {
    pub fn new(
        pool: DatabaseConnection,
        identity_service: IdentityService,
        communication_service: CommunicationService,
    ) -> Self {
        Self {
            pool,
            identity_service,
            communication_service,
        }
    }

    /// Opens an entry request backed by the usable membership that expires first.
    ///
    /// Two concurrent requests may both pass the open-request check; the
    /// partial unique index on open rows rejects the second insert.
    pub async fn enter_request(&self, user_id: i64, request: EnterRequest) -> AppResult<InOutResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        let customer = identity.customer().ok_or_else(|| {
            AppError::ValidationError("Only customers can request entry".to_string())
        })?;
        let gym_id = request
            .gym_id
            .ok_or_else(|| AppError::ValidationError("gym_id is required".to_string()))?;

        let gym = gyms::Entity::find_by_id(gym_id).one(&self.pool).await?;
        if gym.is_none() {
            return Err(AppError::ValidationError("Gym not found".to_string()));
        }

        let open = in_outs::Entity::find()
            .filter(in_outs::Column::CustomerId.eq(customer.id))
            .filter(in_outs::Column::GymId.eq(gym_id))
            .filter(in_outs::open_condition())
            .count(&self.pool)
            .await?;
        if open > 0 {
            return Err(AppError::ValidationError(OPEN_REQUEST_EXISTS.to_string()));
        }

        let today = Utc::now().date_naive();
        let mut usable = memberships::Entity::find()
            .filter(memberships::Column::CustomerId.eq(customer.id))
            .filter(memberships::Column::GymId.eq(gym_id))
            .filter(memberships::usable_condition(today))
            .all(&self.pool)
            .await?;
        usable.sort_by_key(|m| (m.validity_date.is_none(), m.validity_date, m.id));
        let Some(membership) = usable.into_iter().next() else {
            return Err(AppError::ValidationError(
                "You have no usable membership at this gym".to_string(),
            ));
        };

        let row = in_outs::ActiveModel {
            customer_id: Set(customer.id),
            gym_id: Set(gym_id),
            subscription_id: Set(membership.id),
            closet: Set(None),
            enter_time: Set(None),
            out_time: Set(None),
            confirm_in: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::ValidationError(OPEN_REQUEST_EXISTS.to_string())
            } else {
                AppError::from(e)
            }
        })?;

        log::info!(
            "Entry request {} opened for customer {} at gym {gym_id} using membership {}",
            row.id,
            customer.id,
            membership.id
        );
        Ok(InOutResponse::from(row))
    }

    /// In-outs at the caller's gyms, newest first.
    pub async fn list_for_panel(&self, user_id: i64) -> AppResult<Vec<InOutResponse>> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        if scope.is_empty() {
            return Ok(Vec::new());
        }

        let rows = in_outs::Entity::find()
            .filter(in_outs::Column::GymId.is_in(scope.gym_ids()))
            .order_by_desc(in_outs::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(InOutResponse::from).collect())
    }

    async fn scoped_in_out(&self, scope: &GymScope, in_out_id: i64) -> AppResult<in_outs::Model> {
        in_outs::Entity::find_by_id(in_out_id)
            .one(&self.pool)
            .await?
            .filter(|row| scope.contains(row.gym_id))
            .ok_or_else(|| AppError::NotFound("Entry request not found".to_string()))
    }

    /// Admits the customer and consumes one session of the backing membership.
    pub async fn confirm_entry(
        &self,
        user_id: i64,
        in_out_id: i64,
        request: ConfirmEntryRequest,
    ) -> AppResult<InOutResponse> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        let row = self.scoped_in_out(&scope, in_out_id).await?;
        if row.confirm_in {
            return Err(AppError::ValidationError(
                "This entry request is already confirmed".to_string(),
            ));
        }

        let membership = memberships::Entity::find_by_id(row.subscription_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;
        let today = Utc::now().date_naive();
        if !membership.is_usable_on(today) {
            return Err(AppError::ValidationError(
                "The membership behind this request is no longer usable".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        let consumed = memberships::Entity::update_many()
            .col_expr(
                memberships::Column::SessionLeft,
                Expr::col(memberships::Column::SessionLeft).sub(1),
            )
            .filter(memberships::Column::Id.eq(membership.id))
            .filter(memberships::Column::SessionLeft.gt(0))
            .exec(&txn)
            .await?;
        if consumed.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::ValidationError(
                "The membership behind this request has no sessions left".to_string(),
            ));
        }

        let closet = request
            .closet
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let mut active = row.into_active_model();
        active.confirm_in = Set(true);
        active.enter_time = Set(Some(Utc::now()));
        active.closet = Set(closet);
        let row = active.update(&txn).await?;
        txn.commit().await?;

        log::info!("Entry {} confirmed, membership {} consumed a session", row.id, membership.id);

        // the entry is committed; a failed notification must not report it as failed
        if let Err(e) = self.notify_confirmed(&row).await {
            log::error!("Failed to notify customer about entry {}: {e}", row.id);
        }

        Ok(InOutResponse::from(row))
    }

    async fn notify_confirmed(&self, row: &in_outs::Model) -> AppResult<()> {
        let Some(customer) = customers::Entity::find_by_id(row.customer_id)
            .one(&self.pool)
            .await?
        else {
            return Ok(());
        };
        let message = match &row.closet {
            Some(closet) => format!("Your entry is confirmed, closet {closet}"),
            None => "Your entry is confirmed".to_string(),
        };
        self.communication_service
            .notify(
                customer.user_id,
                "entry_confirmed",
                &message,
                Some(json!({ "in_out_id": row.id, "gym_id": row.gym_id })),
            )
            .await?;
        Ok(())
    }

    /// Closes a confirmed entry so the customer may request again.
    pub async fn register_exit(&self, user_id: i64, in_out_id: i64) -> AppResult<InOutResponse> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        let row = self.scoped_in_out(&scope, in_out_id).await?;

        if !row.confirm_in || row.enter_time.is_none() {
            return Err(AppError::ValidationError(
                "This entry has not been confirmed yet".to_string(),
            ));
        }
        if row.out_time.is_some() {
            return Err(AppError::ValidationError(
                "Exit is already registered for this entry".to_string(),
            ));
        }

        let mut active = row.into_active_model();
        active.out_time = Set(Some(Utc::now()));
        let row = active.update(&self.pool).await?;

        log::info!("Exit registered for entry {}", row.id);
        Ok(InOutResponse::from(row))
    }
}
