use crate::entities::{
    PaymentMethod, gym_entity as gyms, gym_manager_entity as managers,
    membership_entity as memberships, membership_type_entity as membership_types,
    transaction_entity as transactions,
};
use crate::error::{AppError, AppResult};
use crate::external::{PaymentGateway, PaymentOutcome};
use crate::models::*;
use crate::services::{CommunicationService, IdentityService};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct MembershipService {
    pool: DatabaseConnection,
    identity_service: IdentityService,
    payment_gateway: Arc<dyn PaymentGateway>,
    communication_service: CommunicationService,
}

impl MembershipService {
    pub fn new(
        pool: DatabaseConnection,
        identity_service: IdentityService,
        payment_gateway: Arc<dyn PaymentGateway>,
        communication_service: CommunicationService,
    ) -> Self {
        Self {
            pool,
            identity_service,
            payment_gateway,
            communication_service,
        }
    }

    /// Creates an unpaid membership from a snapshot of the plan, then asks the
    /// gateway to complete payment. Only a completed payment activates it.
    pub async fn sign_up(
        &self,
        user_id: i64,
        request: SignUpMembershipRequest,
    ) -> AppResult<SignUpMembershipResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        let customer = identity.require_customer()?.clone();

        let plan = membership_types::Entity::find_by_id(request.membership_type_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership type not found".to_string()))?;
        let gym = gyms::Entity::find_by_id(plan.gym_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gym not found".to_string()))?;

        if !gym.is_active {
            return Err(AppError::ValidationError(
                "This gym is not accepting memberships yet".to_string(),
            ));
        }
        if let Some(gender) = &customer.gender {
            if !gym.gender.admits(gender) {
                return Err(AppError::ValidationError(
                    "This gym does not admit your gender".to_string(),
                ));
            }
        }

        let today = Utc::now().date_naive();
        // sessions are seeded from the plan's day count
        let membership = memberships::ActiveModel {
            customer_id: Set(customer.id),
            gym_id: Set(gym.id),
            type_id: Set(plan.id),
            transaction_id: Set(None),
            start_date: Set(today),
            validity_date: Set(Some(today + Duration::days(i64::from(plan.days)))),
            session_left: Set(plan.days),
            price: Set(plan.price),
            days: Set(plan.days),
            is_active: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Membership {} created for customer {} at gym {}",
            membership.id,
            customer.id,
            gym.id
        );

        let outcome = match self.payment_gateway.complete_payment(&membership).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Payment for membership {} failed: {e}", membership.id);
                PaymentOutcome::Failed("Payment could not be completed".to_string())
            }
        };

        match outcome {
            PaymentOutcome::Activated(reference) => {
                let manager = managers::Entity::find_by_id(gym.manager_id)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::InternalError("Gym has no manager".to_string()))?;

                let txn = self.pool.begin().await?;
                let transaction = transactions::ActiveModel {
                    payer_id: Set(Some(identity.user.id)),
                    receiver_id: Set(Some(manager.user_id)),
                    payment_method: Set(PaymentMethod::Online),
                    online_transaction: Set(Some(reference.clone())),
                    price: Set(membership.price),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;

                let mut active = membership.into_active_model();
                active.transaction_id = Set(Some(transaction.id));
                active.is_active = Set(true);
                let membership = active.update(&txn).await?;
                txn.commit().await?;

                log::info!(
                    "Membership {} activated by payment {reference}",
                    membership.id
                );

                // payment is already recorded; the notification is best-effort
                if let Err(e) = self
                    .communication_service
                    .notify(
                        identity.user.id,
                        "membership_activated",
                        &format!("Your membership at {} is now active", gym.title),
                        Some(json!({ "membership_id": membership.id, "gym_id": gym.id })),
                    )
                    .await
                {
                    log::error!(
                        "Failed to notify user {} about membership {}: {e}",
                        identity.user.id,
                        membership.id
                    );
                }

                Ok(SignUpMembershipResponse {
                    membership: MembershipResponse::new(membership, today),
                    payment: PaymentResult {
                        activated: true,
                        reference: Some(reference),
                        message: None,
                    },
                })
            }
            PaymentOutcome::Failed(reason) => {
                log::warn!(
                    "Membership {} left inactive: {reason}",
                    membership.id
                );
                Ok(SignUpMembershipResponse {
                    membership: MembershipResponse::new(membership, today),
                    payment: PaymentResult {
                        activated: false,
                        reference: None,
                        message: Some(reason),
                    },
                })
            }
        }
    }

    async fn customer_memberships(
        &self,
        user_id: i64,
    ) -> AppResult<(Vec<memberships::Model>, NaiveDate)> {
        let identity = self.identity_service.resolve(user_id).await?;
        let customer = identity.require_customer()?;

        let rows = memberships::Entity::find()
            .filter(memberships::Column::CustomerId.eq(customer.id))
            .all(&self.pool)
            .await?;
        Ok((rows, Utc::now().date_naive()))
    }

    /// Usable memberships first, each group by validity date ascending.
    pub async fn list(&self, user_id: i64) -> AppResult<Vec<MembershipResponse>> {
        let (mut rows, today) = self.customer_memberships(user_id).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound("No memberships found".to_string()));
        }

        memberships::sort_for_display(&mut rows, today);
        Ok(rows
            .into_iter()
            .map(|m| MembershipResponse::new(m, today))
            .collect())
    }

    pub async fn get(&self, user_id: i64, membership_id: i64) -> AppResult<MembershipResponse> {
        let (rows, today) = self.customer_memberships(user_id).await?;
        rows.into_iter()
            .find(|m| m.id == membership_id)
            .map(|m| MembershipResponse::new(m, today))
            .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))
    }
}
