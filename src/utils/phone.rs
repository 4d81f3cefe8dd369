use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn mobile_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^09\d{9}$").expect("static regex"))
}

/// Iranian mobile numbers, `09` followed by nine digits.
pub fn validate_phone(phone: &str) -> AppResult<()> {
    if !mobile_regex().is_match(phone) {
        return Err(AppError::ValidationError(
            "Phone number must look like 09xxxxxxxxx".to_string(),
        ));
    }

    Ok(())
}

/// Accepts `+989...`, `989...` and `9...` spellings and returns the `09...` form.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 12 && digits.starts_with("98") {
        format!("0{}", &digits[2..])
    } else if digits.len() == 10 && digits.starts_with('9') {
        format!("0{digits}")
    } else if digits.len() == 11 {
        digits
    } else {
        phone.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("09123456789").is_ok());
        assert!(validate_phone("0912345678").is_err());
        assert!(validate_phone("19123456789").is_err());
        assert!(validate_phone("+989123456789").is_err());
        assert!(validate_phone("0912345678a").is_err());
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+989123456789"), "09123456789");
        assert_eq!(normalize_phone("989123456789"), "09123456789");
        assert_eq!(normalize_phone("9123456789"), "09123456789");
        assert_eq!(normalize_phone("0912 345 6789"), "09123456789");
    }
}
