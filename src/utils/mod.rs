pub mod code_generator;
pub mod cookies;
pub mod jwt;
pub mod password;
pub mod phone;
pub mod rate_limiter;

pub use code_generator::{generate_api_key, generate_numeric_code};
pub use cookies::SessionCookies;
pub use jwt::*;
pub use password::*;
pub use phone::*;
pub use rate_limiter::RateLimiter;
