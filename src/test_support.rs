//! Fixtures shared by service tests: an in-memory SQLite database migrated
//! with the real migrator, row seeders and fakes for external collaborators.

use crate::config::Config;
use crate::entities::*;
use crate::error::{AppError, AppResult};
use crate::external::{OtpSender, PaymentGateway, PaymentOutcome};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use std::sync::{Arc, Mutex};

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn test_config() -> Config {
    let mut config = Config::with_database_url("sqlite::memory:".to_string());
    config.jwt.secret = "test-secret".to_string();
    config
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub async fn seed_user(db: &DatabaseConnection, phone: &str, full_name: &str) -> user_entity::Model {
    let now = Utc::now();
    user_entity::ActiveModel {
        phone: Set(phone.to_string()),
        full_name: Set(full_name.to_string()),
        email: Set(None),
        password_hash: Set(None),
        is_active: Set(true),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_customer(
    db: &DatabaseConnection,
    user_id: i64,
    gender: Option<Gender>,
) -> customer_entity::Model {
    customer_entity::ActiveModel {
        user_id: Set(user_id),
        national_code: Set(None),
        city: Set(None),
        gender: Set(gender),
        profile_photo: Set(None),
        balance: Set(0),
        is_deleted: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_manager(db: &DatabaseConnection, user_id: i64) -> gym_manager_entity::Model {
    gym_manager_entity::ActiveModel {
        user_id: Set(user_id),
        national_code: Set(None),
        verification_code: Set(None),
        city: Set(None),
        invitation_code: Set(None),
        balance: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_secretary(
    db: &DatabaseConnection,
    user_id: i64,
    gym_id: i64,
) -> gym_secretary_entity::Model {
    gym_secretary_entity::ActiveModel {
        user_id: Set(user_id),
        gym_id: Set(gym_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_admin(db: &DatabaseConnection, user_id: i64) -> platform_manager_entity::Model {
    platform_manager_entity::ActiveModel {
        user_id: Set(user_id),
        access_code: Set("root".to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_gym(
    db: &DatabaseConnection,
    manager_id: i64,
    title: &str,
    is_active: bool,
    gender: GymGender,
) -> gym_entity::Model {
    gym_entity::ActiveModel {
        manager_id: Set(manager_id),
        title: Set(title.to_string()),
        location: Set(None),
        address: Set(None),
        main_img: Set(None),
        phone: Set(None),
        headline_phone: Set(None),
        gender: Set(gender),
        commission_type: Set(CommissionType::Monthly),
        facilities: Set(None),
        description: Set(None),
        work_hours_per_day: Set(None),
        work_days_per_week: Set(None),
        is_active: Set(is_active),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_membership_type(
    db: &DatabaseConnection,
    gym_id: i64,
    days: i32,
    price: i64,
) -> membership_type_entity::Model {
    membership_type_entity::ActiveModel {
        gym_id: Set(gym_id),
        title: Set(format!("{days} days")),
        days: Set(days),
        price: Set(price),
        description: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_membership(
    db: &DatabaseConnection,
    customer_id: i64,
    membership_type: &membership_type_entity::Model,
    session_left: i32,
    validity_date: Option<NaiveDate>,
) -> membership_entity::Model {
    membership_entity::ActiveModel {
        customer_id: Set(customer_id),
        gym_id: Set(membership_type.gym_id),
        type_id: Set(membership_type.id),
        transaction_id: Set(None),
        start_date: Set(today()),
        validity_date: Set(validity_date),
        session_left: Set(session_left),
        price: Set(membership_type.price),
        days: Set(membership_type.days),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// Records every OTP it is asked to send; fails on demand.
#[derive(Clone, Default)]
pub struct FakeOtpSender {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: bool,
}

impl FakeOtpSender {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn last_code(&self, phone: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == phone)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl OtpSender for FakeOtpSender {
    async fn send_otp(&self, phone: &str, code: &str) -> AppResult<()> {
        if self.fail {
            return Err(AppError::ExternalApiError("gateway down".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((phone.to_string(), code.to_string()));
        Ok(())
    }
}

pub struct FakePaymentGateway {
    pub outcome: PaymentOutcome,
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn complete_payment(
        &self,
        _membership: &membership_entity::Model,
    ) -> AppResult<PaymentOutcome> {
        Ok(self.outcome.clone())
    }
}
