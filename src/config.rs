use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
    #[serde(default)]
    pub otp: OtpConfig,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    pub access_cookie_name: String,
    pub refresh_cookie_name: String,
    pub secure: bool,
    /// "Strict", "Lax" or "None"
    pub same_site: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_cookie_name: "access_token".to_string(),
            refresh_cookie_name: "refresh_token".to_string(),
            secure: false,
            same_site: "Lax".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    pub code_length: usize,
    pub ttl_seconds: i64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: 5,
            ttl_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    pub base_url: String,
    pub api_key: String,
    pub sender: String,
    /// `{code}` is replaced by the OTP
    pub template: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000/sms/send".to_string(),
            api_key: String::new(),
            sender: "Fitno".to_string(),
            template: "Your Fitno verification code: {code}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
    /// key on `X-Forwarded-For` instead of the peer address; only behind a trusted proxy
    #[serde(default)]
    pub trust_forwarded: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_seconds: 60,
            trust_forwarded: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaymentConfig {
    /// sandbox gateway approves every payment when set
    pub auto_approve: bool,
}

fn parse_into<T: FromStr>(target: &mut T, value: Option<String>) {
    if let Some(parsed) = value.and_then(|v| v.parse::<T>().ok()) {
        *target = parsed;
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // the database url is the one value without a default
                let database_url = env::var("DATABASE_URL").map_err(|_| {
                    format!("DATABASE_URL is not set and {config_path} was not found")
                })?;
                Config::with_database_url(database_url)
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        // environment always wins over the file
        config.apply_env_overrides(|name| env::var(name).ok());

        Ok(config)
    }

    pub fn with_database_url(url: String) -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url,
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "change-me-in-production".to_string(),
                access_token_expires_in: 300,
                refresh_token_expires_in: 86_400,
            },
            cookie: CookieConfig::default(),
            otp: OtpConfig::default(),
            sms: SmsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            payment: PaymentConfig::default(),
        }
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SERVER_HOST") {
            self.server.host = v;
        }
        parse_into(&mut self.server.port, lookup("SERVER_PORT"));
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        parse_into(&mut self.database.max_connections, lookup("DB_MAX_CONNECTIONS"));

        if let Some(v) = lookup("JWT_SECRET") {
            self.jwt.secret = v;
        }
        parse_into(
            &mut self.jwt.access_token_expires_in,
            lookup("JWT_ACCESS_EXPIRES_IN"),
        );
        parse_into(
            &mut self.jwt.refresh_token_expires_in,
            lookup("JWT_REFRESH_EXPIRES_IN"),
        );

        if let Some(v) = lookup("ACCESS_COOKIE_NAME") {
            self.cookie.access_cookie_name = v;
        }
        if let Some(v) = lookup("REFRESH_COOKIE_NAME") {
            self.cookie.refresh_cookie_name = v;
        }
        parse_into(&mut self.cookie.secure, lookup("COOKIE_SECURE"));
        if let Some(v) = lookup("COOKIE_SAME_SITE") {
            self.cookie.same_site = v;
        }

        parse_into(&mut self.otp.code_length, lookup("OTP_CODE_LENGTH"));
        parse_into(&mut self.otp.ttl_seconds, lookup("OTP_TTL_SECONDS"));

        if let Some(v) = lookup("SMS_BASE_URL") {
            self.sms.base_url = v;
        }
        if let Some(v) = lookup("SMS_API_KEY") {
            self.sms.api_key = v;
        }
        if let Some(v) = lookup("SMS_SENDER") {
            self.sms.sender = v;
        }
        if let Some(v) = lookup("SMS_TEMPLATE") {
            self.sms.template = v;
        }

        parse_into(&mut self.rate_limit.max_requests, lookup("RATE_LIMIT_MAX_REQUESTS"));
        parse_into(
            &mut self.rate_limit.window_seconds,
            lookup("RATE_LIMIT_WINDOW_SECONDS"),
        );
        parse_into(
            &mut self.rate_limit.trust_forwarded,
            lookup("RATE_LIMIT_TRUST_FORWARDED"),
        );

        parse_into(&mut self.payment.auto_approve, lookup("PAYMENT_AUTO_APPROVE"));
    }
}
