use crate::entities::membership_entity;
use crate::error::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Carries the gateway's payment reference.
    Activated(String),
    Failed(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn complete_payment(
        &self,
        membership: &membership_entity::Model,
    ) -> AppResult<PaymentOutcome>;
}

/// Stand-in used until a real gateway is wired up.
#[derive(Clone)]
pub struct SandboxPaymentGateway {
    auto_approve: bool,
}

impl SandboxPaymentGateway {
    pub fn new(auto_approve: bool) -> Self {
        Self { auto_approve }
    }
}

#[async_trait]
impl PaymentGateway for SandboxPaymentGateway {
    async fn complete_payment(
        &self,
        membership: &membership_entity::Model,
    ) -> AppResult<PaymentOutcome> {
        if self.auto_approve {
            let reference = format!("SANDBOX-{}", Uuid::new_v4().simple());
            log::info!(
                "Sandbox payment approved for membership {}: {reference}",
                membership.id
            );
            Ok(PaymentOutcome::Activated(reference))
        } else {
            Ok(PaymentOutcome::Failed(
                "Online payment is not available yet".to_string(),
            ))
        }
    }
}
