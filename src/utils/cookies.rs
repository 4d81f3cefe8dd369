use crate::config::CookieConfig;
use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite, time::Duration};

/// Builds the http-only session cookies carrying the access and refresh tokens.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    config: CookieConfig,
    access_max_age: i64,
    refresh_max_age: i64,
}

impl SessionCookies {
    pub fn new(config: CookieConfig, access_max_age: i64, refresh_max_age: i64) -> Self {
        Self {
            config,
            access_max_age,
            refresh_max_age,
        }
    }

    pub fn access_name(&self) -> &str {
        &self.config.access_cookie_name
    }

    pub fn refresh_name(&self) -> &str {
        &self.config.refresh_cookie_name
    }

    fn same_site(&self) -> SameSite {
        match self.config.same_site.to_ascii_lowercase().as_str() {
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            _ => SameSite::Lax,
        }
    }

    fn build(&self, name: &str, value: String, max_age: i64) -> Cookie<'static> {
        Cookie::build(name.to_string(), value)
            .path("/")
            .http_only(true)
            .secure(self.config.secure)
            .same_site(self.same_site())
            .max_age(Duration::seconds(max_age))
            .finish()
    }

    fn removal(&self, name: &str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new(), 0);
        cookie.make_removal();
        cookie
    }

    pub fn access(&self, token: &str) -> Cookie<'static> {
        self.build(self.access_name(), token.to_string(), self.access_max_age)
    }

    pub fn refresh(&self, token: &str) -> Cookie<'static> {
        self.build(self.refresh_name(), token.to_string(), self.refresh_max_age)
    }

    pub fn clear_access(&self) -> Cookie<'static> {
        self.removal(self.access_name())
    }

    pub fn clear_refresh(&self) -> Cookie<'static> {
        self.removal(self.refresh_name())
    }

    /// Value of the refresh cookie, if the client sent a non-empty one.
    pub fn refresh_token(&self, req: &HttpRequest) -> Option<String> {
        req.cookie(self.refresh_name())
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}
