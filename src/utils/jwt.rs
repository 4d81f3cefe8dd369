use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access" or "refresh"
}

impl Claims {
    pub fn user_id(&self) -> AppResult<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_expires_in: i64, refresh_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
            refresh_token_expires_in: refresh_expires_in,
        }
    }

    fn generate(&self, user_id: i64, token_type: &str, lifetime: i64) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime);

        let claims = Claims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn generate_access_token(&self, user_id: i64) -> AppResult<String> {
        self.generate(user_id, ACCESS_TOKEN_TYPE, self.access_token_expires_in)
    }

    pub fn generate_refresh_token(&self, user_id: i64) -> AppResult<String> {
        self.generate(user_id, REFRESH_TOKEN_TYPE, self.refresh_token_expires_in)
    }

    pub fn generate_pair(&self, user_id: i64) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.generate_access_token(user_id)?,
            refresh_token: self.generate_refresh_token(user_id)?,
        })
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(AppError::Unauthorized("Invalid access token type".to_string()));
        }

        Ok(claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(AppError::Unauthorized("Invalid refresh token type".to_string()));
        }

        Ok(claims)
    }

    pub fn get_access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }

    pub fn get_refresh_token_expires_in(&self) -> i64 {
        self.refresh_token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_and_refresh_are_not_interchangeable() {
        let jwt = JwtService::new("test-secret", 300, 86_400);
        let pair = jwt.generate_pair(42).unwrap();

        let access = jwt.verify_access_token(&pair.access_token).unwrap();
        assert_eq!(access.user_id().unwrap(), 42);
        assert!(jwt.verify_refresh_token(&pair.access_token).is_err());

        let refresh = jwt.verify_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.token_type, REFRESH_TOKEN_TYPE);
        assert!(jwt.verify_access_token(&pair.refresh_token).is_err());
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let ours = JwtService::new("secret-a", 300, 600);
        let theirs = JwtService::new("secret-b", 300, 600);
        let token = theirs.generate_access_token(1).unwrap();
        assert!(matches!(
            ours.verify_access_token(&token),
            Err(AppError::JwtError(_))
        ));
    }

    #[test]
    fn test_rejects_expired_token() {
        // well past the default 60s leeway
        let jwt = JwtService::new("secret", -3600, -3600);
        let token = jwt.generate_access_token(1).unwrap();
        assert!(jwt.verify_access_token(&token).is_err());
    }
}
