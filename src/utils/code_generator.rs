use rand::Rng;
use rand::distributions::Alphanumeric;

/// Numeric code of exactly `len` digits, leading digit non-zero.
pub fn generate_numeric_code(len: usize) -> String {
    let len = len.max(1);
    let mut rng = rand::thread_rng();
    let mut code = String::with_capacity(len);
    code.push(char::from(b'0' + rng.gen_range(1..=9u8)));
    for _ in 1..len {
        code.push(char::from(b'0' + rng.gen_range(0..=9u8)));
    }
    code
}

pub fn generate_api_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(70)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_numeric_code() {
        for _ in 0..50 {
            let code = generate_numeric_code(5);
            assert_eq!(code.len(), 5);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(!code.starts_with('0'));
        }
    }

    #[test]
    fn test_generate_api_key() {
        let key = generate_api_key();
        assert_eq!(key.len(), 70);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(key, generate_api_key());
    }
}
