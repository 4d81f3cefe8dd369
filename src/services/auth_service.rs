use crate::config::OtpConfig;
use crate::entities::{
    api_key_entity as api_keys, blacklisted_token_entity as blacklisted, otp_entity as otps,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::external::OtpSender;
use crate::models::*;
use crate::services::IdentityService;
use crate::utils::*;
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    otp_sender: Arc<dyn OtpSender>,
    otp_config: OtpConfig,
    identity_service: IdentityService,
}

impl AuthService {
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        otp_sender: Arc<dyn OtpSender>,
        otp_config: OtpConfig,
        identity_service: IdentityService,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            otp_sender,
            otp_config,
            identity_service,
        }
    }

    fn clean_phone(phone: &str) -> AppResult<String> {
        let phone = normalize_phone(phone);
        validate_phone(&phone)?;
        Ok(phone)
    }

    async fn find_user_by_phone(&self, phone: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Phone.eq(phone))
            .filter(users::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?)
    }

    fn auth_response(&self, user: users::Model) -> AppResult<AuthResponse> {
        let tokens = self.jwt_service.generate_pair(user.id)?;
        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    /// Password login, reserved for active customers.
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let phone = Self::clean_phone(&request.phone)?;
        let invalid = || AppError::AuthError("Invalid phone number or password".to_string());

        let user = self.find_user_by_phone(&phone).await?.ok_or_else(invalid)?;
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(invalid());
        };
        if !verify_password(&request.password, hash)? {
            return Err(invalid());
        }
        if !user.is_active {
            return Err(AppError::AuthError("This account is inactive".to_string()));
        }

        let identity = self.identity_service.resolve(user.id).await?;
        if !identity.is_customer() {
            return Err(AppError::AuthError(
                "Only customers can sign in with a password".to_string(),
            ));
        }

        log::info!("User {} logged in with password", user.id);
        self.auth_response(identity.user)
    }

    /// Issues a fresh code for a registered phone, replacing any earlier one.
    pub async fn request_otp(&self, phone: &str) -> AppResult<RequestOtpResponse> {
        let phone = Self::clean_phone(phone)?;

        if self.find_user_by_phone(&phone).await?.is_none() {
            return Err(AppError::NotFound(
                "No account is registered with this phone number".to_string(),
            ));
        }

        let code = generate_numeric_code(self.otp_config.code_length);
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.otp_config.ttl_seconds);

        // the unique phone column keeps this to one row per phone
        otps::Entity::insert(otps::ActiveModel {
            phone: Set(phone.clone()),
            code: Set(code.clone()),
            expires_at: Set(expires_at),
            created_at: Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(otps::Column::Phone)
                .update_columns([
                    otps::Column::Code,
                    otps::Column::ExpiresAt,
                    otps::Column::CreatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&self.pool)
        .await?;

        if let Err(e) = self.otp_sender.send_otp(&phone, &code).await {
            otps::Entity::delete_many()
                .filter(otps::Column::Phone.eq(phone.as_str()))
                .filter(otps::Column::Code.eq(code.as_str()))
                .exec(&self.pool)
                .await?;
            return Err(match e {
                AppError::ExternalApiError(msg) => AppError::ExternalApiError(msg),
                other => AppError::ExternalApiError(other.to_string()),
            });
        }

        log::info!("OTP issued for {phone}");
        Ok(RequestOtpResponse {
            expires_in: self.otp_config.ttl_seconds,
        })
    }

    async fn check_api_key(&self, api_key: Option<&str>) -> AppResult<()> {
        let key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::Forbidden("API key is missing".to_string()))?;

        let found = api_keys::Entity::find()
            .filter(api_keys::Column::Key.eq(key))
            .filter(api_keys::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(AppError::Forbidden("Invalid API key".to_string())),
        }
    }

    /// Consumes a code and signs the user in, activating the account on first use.
    pub async fn verify_otp(
        &self,
        api_key: Option<&str>,
        request: VerifyOtpRequest,
    ) -> AppResult<AuthResponse> {
        self.check_api_key(api_key).await?;

        let phone = Self::clean_phone(&request.phone)?;
        let user = self
            .find_user_by_phone(&phone)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let no_code =
            || AppError::ValidationError("No verification code was requested".to_string());

        let otp = otps::Entity::find()
            .filter(otps::Column::Phone.eq(phone.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(no_code)?;

        if otp.is_expired(Utc::now()) {
            otps::Entity::delete_by_id(otp.id).exec(&self.pool).await?;
            return Err(AppError::ValidationError(
                "Verification code has expired".to_string(),
            ));
        }
        if otp.code != request.code.trim() {
            return Err(AppError::ValidationError(
                "Verification code is incorrect".to_string(),
            ));
        }

        // a concurrent verify may have consumed it first
        let deleted = otps::Entity::delete_by_id(otp.id).exec(&self.pool).await?;
        if deleted.rows_affected == 0 {
            return Err(no_code());
        }

        let user = if user.is_active {
            user
        } else {
            let mut active = user.into_active_model();
            active.is_active = Set(true);
            active.updated_at = Set(Utc::now());
            let user = active.update(&self.pool).await?;
            log::info!("User {} activated by OTP", user.id);
            user
        };

        self.auth_response(user)
    }

    /// Issues a new access token from a refresh token that has not been revoked.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> AppResult<RefreshResponse> {
        let token = refresh_token
            .ok_or_else(|| AppError::Unauthorized("Refresh token not found.".to_string()))?;
        let claims = self.jwt_service.verify_refresh_token(token)?;

        let revoked = blacklisted::Entity::find()
            .filter(blacklisted::Column::Jti.eq(claims.jti.as_str()))
            .one(&self.pool)
            .await?;
        if revoked.is_some() {
            return Err(AppError::Unauthorized(
                "Refresh token has been revoked".to_string(),
            ));
        }

        let user_id = claims.user_id()?;
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .filter(|u| !u.is_deleted && u.is_active)
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        Ok(RefreshResponse {
            access_token: self.jwt_service.generate_access_token(user.id)?,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    /// Revokes the refresh token. The handler clears both cookies.
    pub async fn logout(&self, refresh_token: Option<&str>) -> AppResult<()> {
        let token = refresh_token
            .ok_or_else(|| AppError::ValidationError("Refresh token not found.".to_string()))?;
        let claims = self
            .jwt_service
            .verify_refresh_token(token)
            .map_err(|_| AppError::ValidationError("Invalid or expired token.".to_string()))?;
        let user_id = claims
            .user_id()
            .map_err(|_| AppError::ValidationError("Invalid or expired token.".to_string()))?;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);

        blacklisted::Entity::insert(blacklisted::ActiveModel {
            jti: Set(claims.jti.clone()),
            user_id: Set(user_id),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(blacklisted::Column::Jti)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.pool)
        .await?;

        log::info!("User {user_id} logged out");
        Ok(())
    }

    /// Drops expired OTP codes and blacklist entries whose tokens have expired anyway.
    pub async fn purge_expired(&self) -> AppResult<(u64, u64)> {
        let now = Utc::now();
        let codes = otps::Entity::delete_many()
            .filter(otps::Column::ExpiresAt.lt(now))
            .exec(&self.pool)
            .await?
            .rows_affected;
        let tokens = blacklisted::Entity::delete_many()
            .filter(blacklisted::Column::ExpiresAt.lt(now))
            .exec(&self.pool)
            .await?
            .rows_affected;
        Ok((codes, tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Gender;
    use crate::test_support::*;
    use sea_orm::PaginatorTrait;

    const API_KEY: &str = "test-client-key";

    async fn service_with(db: &DatabaseConnection, sender: FakeOtpSender) -> AuthService {
        let config = test_config();
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expires_in,
            config.jwt.refresh_token_expires_in,
        );
        api_keys::ActiveModel {
            key: Set(API_KEY.to_string()),
            client_name: Set("tests".to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        AuthService::new(
            db.clone(),
            jwt,
            Arc::new(sender),
            config.otp,
            IdentityService::new(db.clone()),
        )
    }

    async fn otp_count(db: &DatabaseConnection) -> u64 {
        otps::Entity::find().count(db).await.unwrap()
    }

    #[tokio::test]
    async fn test_request_otp_for_unregistered_phone() {
        let db = setup_db().await;
        let service = service_with(&db, FakeOtpSender::default()).await;

        let result = service.request_otp("09129999999").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(otp_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_request_otp_twice_keeps_latest_only() {
        let db = setup_db().await;
        let sender = FakeOtpSender::default();
        let service = service_with(&db, sender.clone()).await;
        seed_user(&db, "09121111111", "Ali").await;

        service.request_otp("09121111111").await.unwrap();
        service.request_otp("09121111111").await.unwrap();

        let rows = otps::Entity::find().all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(Some(rows[0].code.clone()), sender.last_code("09121111111"));
        assert_eq!(rows[0].code.len(), 5);
    }

    #[tokio::test]
    async fn test_failed_dispatch_leaves_no_code() {
        let db = setup_db().await;
        let service = service_with(&db, FakeOtpSender::failing()).await;
        seed_user(&db, "09121111112", "Ali").await;

        let result = service.request_otp("09121111112").await;
        assert!(matches!(result, Err(AppError::ExternalApiError(_))));
        assert_eq!(otp_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_verify_otp_requires_valid_api_key() {
        let db = setup_db().await;
        let service = service_with(&db, FakeOtpSender::default()).await;
        let request = || VerifyOtpRequest {
            phone: "09121111113".to_string(),
            code: "12345".to_string(),
        };

        assert!(matches!(
            service.verify_otp(None, request()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.verify_otp(Some("wrong"), request()).await,
            Err(AppError::Forbidden(_))
        ));
        // key accepted, then the unknown user is reported
        assert!(matches!(
            service.verify_otp(Some(API_KEY), request()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_otp_is_single_use_and_activates_once() {
        let db = setup_db().await;
        let sender = FakeOtpSender::default();
        let service = service_with(&db, sender.clone()).await;
        let user = seed_user(&db, "09121111114", "Mina").await;
        let mut inactive = user.into_active_model();
        inactive.is_active = Set(false);
        let user = inactive.update(&db).await.unwrap();

        service.request_otp(&user.phone).await.unwrap();
        let code = sender.last_code(&user.phone).unwrap();

        let wrong = VerifyOtpRequest {
            phone: user.phone.clone(),
            code: "00000".to_string(),
        };
        assert!(matches!(
            service.verify_otp(Some(API_KEY), wrong).await,
            Err(AppError::ValidationError(_))
        ));

        let ok = VerifyOtpRequest {
            phone: user.phone.clone(),
            code: code.clone(),
        };
        let response = service.verify_otp(Some(API_KEY), ok).await.unwrap();
        assert!(response.user.is_active);
        assert!(!response.access_token.is_empty());
        assert_eq!(otp_count(&db).await, 0);

        let again = VerifyOtpRequest {
            phone: user.phone.clone(),
            code,
        };
        assert!(matches!(
            service.verify_otp(Some(API_KEY), again).await,
            Err(AppError::ValidationError(_))
        ));

        let reloaded = users::Entity::find_by_id(user.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(reloaded.is_active);
    }

    #[tokio::test]
    async fn test_verify_otp_rejects_expired_code() {
        let db = setup_db().await;
        let service = service_with(&db, FakeOtpSender::default()).await;
        let user = seed_user(&db, "09121111115", "Reza").await;
        otps::ActiveModel {
            phone: Set(user.phone.clone()),
            code: Set("54321".to_string()),
            expires_at: Set(Utc::now() - Duration::minutes(5)),
            created_at: Set(Utc::now() - Duration::minutes(7)),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let request = VerifyOtpRequest {
            phone: user.phone.clone(),
            code: "54321".to_string(),
        };
        let err = service.verify_otp(Some(API_KEY), request).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg.contains("expired")));
        assert_eq!(otp_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_login_requires_customer_profile() {
        let db = setup_db().await;
        let service = service_with(&db, FakeOtpSender::default()).await;
        let user = seed_user(&db, "09121111116", "Sara").await;
        let mut with_password = user.into_active_model();
        with_password.password_hash = Set(Some(hash_password("secret1").unwrap()));
        let user = with_password.update(&db).await.unwrap();

        let login = |password: &str| LoginRequest {
            phone: user.phone.clone(),
            password: password.to_string(),
        };

        assert!(matches!(
            service.login(login("secret1")).await,
            Err(AppError::AuthError(_))
        ));

        seed_customer(&db, user.id, Some(Gender::Female)).await;
        assert!(matches!(
            service.login(login("wrong-pass")).await,
            Err(AppError::AuthError(_))
        ));
        let response = service.login(login("secret1")).await.unwrap();
        assert_eq!(response.user.id, user.id);
    }

    #[tokio::test]
    async fn test_logout_revokes_refresh_token() {
        let db = setup_db().await;
        let service = service_with(&db, FakeOtpSender::default()).await;
        let user = seed_user(&db, "09121111117", "Omid").await;
        let tokens = service.jwt_service.generate_pair(user.id).unwrap();

        assert!(service.refresh(Some(&tokens.refresh_token)).await.is_ok());

        assert!(matches!(
            service.logout(None).await,
            Err(AppError::ValidationError(_))
        ));
        let err = service.logout(Some("garbage")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg == "Invalid or expired token."));

        service.logout(Some(&tokens.refresh_token)).await.unwrap();
        // logging out twice is harmless
        service.logout(Some(&tokens.refresh_token)).await.unwrap();
        assert!(matches!(
            service.refresh(Some(&tokens.refresh_token)).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let db = setup_db().await;
        let service = service_with(&db, FakeOtpSender::default()).await;
        let user = seed_user(&db, "09121111118", "Nima").await;
        let tokens = service.jwt_service.generate_pair(user.id).unwrap();

        assert!(service.refresh(Some(&tokens.access_token)).await.is_err());
        assert!(service.refresh(None).await.is_err());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let db = setup_db().await;
        let service = service_with(&db, FakeOtpSender::default()).await;
        let stale = Utc::now() - Duration::hours(3);
        otps::ActiveModel {
            phone: Set("09121111119".to_string()),
            code: Set("11111".to_string()),
            expires_at: Set(stale),
            created_at: Set(stale),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let (codes, _) = service.purge_expired().await.unwrap();
        assert_eq!(codes, 1);
        assert_eq!(otp_count(&db).await, 0);
    }
}
