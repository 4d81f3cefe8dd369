use crate::error::{AppError, AppResult};
use bcrypt::{DEFAULT_COST, hash, verify};

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 6 || password.len() > 128 {
        return Err(AppError::ValidationError(
            "Password must be between 6 and 128 characters".to_string(),
        ));
    }

    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Failed to verify password: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hashed = hash_password("secret1").unwrap();

        assert!(verify_password("secret1", &hashed).unwrap());
        assert!(!verify_password("secret2", &hashed).unwrap());
    }
}
