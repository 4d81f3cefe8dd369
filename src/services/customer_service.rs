use crate::entities::{customer_entity as customers, user_entity as users};
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::*;
use crate::services::IdentityService;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};

#[derive(Clone)]
pub struct CustomerService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    identity_service: IdentityService,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_national_code(code: &str) -> AppResult<()> {
    if code.len() != 10 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::ValidationError(
            "National code must be 10 digits".to_string(),
        ));
    }
    Ok(())
}

impl CustomerService {
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        identity_service: IdentityService,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            identity_service,
        }
    }

    /// Creates the user and its customer profile. Only anonymous callers may register.
    pub async fn register(
        &self,
        caller_id: i64,
        request: RegisterCustomerRequest,
    ) -> AppResult<CustomerAuthResponse> {
        if self.identity_service.resolve_optional(caller_id).await?.is_some() {
            return Err(AppError::ValidationError(
                "You are already signed in".to_string(),
            ));
        }

        let phone = normalize_phone(&request.phone);
        validate_phone(&phone)?;
        validate_password(&request.password)?;
        let full_name = request.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(AppError::ValidationError(
                "Full name is required".to_string(),
            ));
        }
        let email = non_empty(request.email).map(|e| e.to_lowercase());

        let existing = users::Entity::find()
            .filter(users::Column::Phone.eq(phone.as_str()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "A user with this phone number already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();

        let txn = self.pool.begin().await?;
        let user = users::ActiveModel {
            phone: Set(phone),
            full_name: Set(full_name),
            email: Set(email),
            password_hash: Set(Some(password_hash)),
            is_active: Set(true),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::ValidationError(
                    "A user with this phone number or email already exists".to_string(),
                )
            } else {
                AppError::from(e)
            }
        })?;

        let customer = customers::ActiveModel {
            user_id: Set(user.id),
            national_code: Set(None),
            city: Set(non_empty(request.city)),
            gender: Set(request.gender),
            profile_photo: Set(None),
            balance: Set(0),
            is_deleted: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Customer {} registered for user {}", customer.id, user.id);

        let tokens = self.jwt_service.generate_pair(user.id)?;
        Ok(CustomerAuthResponse {
            profile: CustomerProfileResponse::new(customer, &user),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<CustomerProfileResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        let customer = identity.require_customer()?.clone();
        Ok(CustomerProfileResponse::new(customer, &identity.user))
    }

    /// Phone and email are not editable here.
    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateCustomerProfileRequest,
    ) -> AppResult<CustomerProfileResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        let customer = identity.require_customer()?.clone();
        let mut user = identity.user;

        if let Some(full_name) = request.full_name {
            let full_name = full_name.trim().to_string();
            if full_name.is_empty() {
                return Err(AppError::ValidationError(
                    "Full name must not be empty".to_string(),
                ));
            }
            let mut active = user.into_active_model();
            active.full_name = Set(full_name);
            active.updated_at = Set(Utc::now());
            user = active.update(&self.pool).await?;
        }

        let mut active = customer.clone().into_active_model();
        if let Some(code) = request.national_code {
            let code = code.trim().to_string();
            validate_national_code(&code)?;
            active.national_code = Set(Some(code));
        }
        if let Some(city) = request.city {
            active.city = Set(non_empty(Some(city)));
        }
        if let Some(gender) = request.gender {
            active.gender = Set(Some(gender));
        }
        if let Some(photo) = request.profile_photo {
            active.profile_photo = Set(non_empty(Some(photo)));
        }
        let customer = if active.is_changed() {
            active.update(&self.pool).await?
        } else {
            customer
        };

        Ok(CustomerProfileResponse::new(customer, &user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Gender;
    use crate::test_support::*;

    fn service(db: &DatabaseConnection) -> CustomerService {
        let config = test_config();
        CustomerService::new(
            db.clone(),
            JwtService::new(&config.jwt.secret, 300, 600),
            IdentityService::new(db.clone()),
        )
    }

    fn request(phone: &str, password: &str) -> RegisterCustomerRequest {
        RegisterCustomerRequest {
            phone: phone.to_string(),
            full_name: "Sara Ahmadi".to_string(),
            email: Some("Sara@Example.com".to_string()),
            password: password.to_string(),
            city: Some("Tehran".to_string()),
            gender: Some(Gender::Female),
        }
    }

    #[tokio::test]
    async fn test_register_creates_user_and_customer() {
        let db = setup_db().await;
        let service = service(&db);

        let response = service.register(0, request("09124000001", "secret1")).await.unwrap();
        assert_eq!(response.profile.phone, "09124000001");
        assert_eq!(response.profile.email.as_deref(), Some("sara@example.com"));
        assert_eq!(response.profile.gender, Some(Gender::Female));
        assert!(!response.refresh_token.is_empty());

        let profile = service.get_profile(response.profile.user_id).await.unwrap();
        assert_eq!(profile.id, response.profile.id);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let db = setup_db().await;
        let service = service(&db);

        assert!(matches!(
            service.register(0, request("09124000002", "12345")).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            service.register(0, request("12345", "secret1")).await,
            Err(AppError::ValidationError(_))
        ));

        service.register(0, request("09124000002", "secret1")).await.unwrap();
        assert!(matches!(
            service.register(0, request("09124000002", "secret1")).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_register_requires_anonymous_caller() {
        let db = setup_db().await;
        let service = service(&db);
        let user = seed_user(&db, "09124000003", "Signed In").await;

        let result = service.register(user.id, request("09124000004", "secret1")).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let db = setup_db().await;
        let service = service(&db);
        let user = seed_user(&db, "09124000005", "Old Name").await;
        seed_customer(&db, user.id, None).await;

        let updated = service
            .update_profile(
                user.id,
                UpdateCustomerProfileRequest {
                    full_name: Some("New Name".to_string()),
                    national_code: Some("0012345678".to_string()),
                    gender: Some(Gender::Male),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.full_name, "New Name");
        assert_eq!(updated.national_code.as_deref(), Some("0012345678"));
        assert_eq!(updated.phone, "09124000005");

        let bad = service
            .update_profile(
                user.id,
                UpdateCustomerProfileRequest {
                    national_code: Some("12ab".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(bad, Err(AppError::ValidationError(_))));

        // no changes is a plain read
        let same = service
            .update_profile(user.id, UpdateCustomerProfileRequest::default())
            .await
            .unwrap();
        assert_eq!(same.full_name, "New Name");
    }

    #[tokio::test]
    async fn test_profile_requires_customer() {
        let db = setup_db().await;
        let service = service(&db);
        let user = seed_user(&db, "09124000006", "Manager Only").await;
        seed_manager(&db, user.id).await;

        assert!(matches!(
            service.get_profile(user.id).await,
            Err(AppError::PermissionDenied)
        ));
    }
}
