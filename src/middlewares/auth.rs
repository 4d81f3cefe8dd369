use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;

struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/swagger-ui",
                "/api-docs/openapi.json",
                "/api/v1/login",
                "/api/v1/request-otp",
                "/api/v1/verify-otp",
                "/api/v1/refresh",
                "/api/v1/logout",
                "/api/v1/status",
                "/api/v1/customer/register",
            ],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/"],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        self.exact_paths.contains(&path)
            || self
                .prefix_paths
                .iter()
                .any(|&prefix| path.starts_with(prefix))
    }
}

/// Resolves the access token from the access cookie or a `Bearer` header
/// and stores the user id (`i64`) in the request extensions.
///
/// Public paths pass through without a token; a valid one is still
/// attached so handlers such as `/status` can see the caller.
pub struct AuthMiddleware {
    jwt_service: JwtService,
    access_cookie_name: Rc<str>,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService, access_cookie_name: &str) -> Self {
        Self {
            jwt_service,
            access_cookie_name: Rc::from(access_cookie_name),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            access_cookie_name: self.access_cookie_name.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    access_cookie_name: Rc<str>,
    public_paths: PublicPaths,
}

impl<S> AuthMiddlewareService<S> {
    fn extract_token(&self, req: &ServiceRequest) -> Option<String> {
        if let Some(cookie) = req.cookie(&self.access_cookie_name) {
            if !cookie.value().is_empty() {
                return Some(cookie.value().to_string());
            }
        }

        req.headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        let token = self.extract_token(&req);
        let user_id = token.as_deref().map(|token| {
            self.jwt_service
                .verify_access_token(token)
                .and_then(|claims| claims.user_id())
        });

        if self.public_paths.is_public_path(req.path()) {
            if let Some(Ok(user_id)) = user_id {
                req.extensions_mut().insert(user_id);
            }
            return Box::pin(self.service.call(req));
        }

        match user_id {
            Some(Ok(user_id)) => {
                req.extensions_mut().insert(user_id);
                Box::pin(self.service.call(req))
            }
            Some(Err(_)) => {
                let error = AppError::Unauthorized("Invalid or expired token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
            None => {
                let error = AppError::Unauthorized(
                    "Authentication credentials were not provided".to_string(),
                );
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpRequest, HttpResponse, test, web};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        let user_id = req.extensions().get::<i64>().copied().unwrap_or(0);
        HttpResponse::Ok().body(user_id.to_string())
    }

    fn jwt() -> JwtService {
        JwtService::new("middleware-secret", 300, 600)
    }

    #[actix_web::test]
    async fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path("/api/v1/login"));
        assert!(paths.is_public_path("/api/v1/status/"));
        assert!(paths.is_public_path("/swagger-ui/index.html"));
        assert!(!paths.is_public_path("/api/v1/customer/profile"));
        assert!(!paths.is_public_path("/api/v1/loginx"));
    }

    #[actix_web::test]
    async fn test_protected_route_requires_token() {
        let jwt = jwt();
        let token = jwt.generate_access_token(42).unwrap();
        let refresh = jwt.generate_refresh_token(42).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt, "access_token"))
                .route("/api/v1/customer/profile", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/customer/profile").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);

        // refresh tokens are not accepted as access tokens
        let req = test::TestRequest::get()
            .uri("/api/v1/customer/profile")
            .insert_header(("Authorization", format!("Bearer {refresh}")))
            .to_request();
        assert!(test::try_call_service(&app, req).await.is_err());

        let req = test::TestRequest::get()
            .uri("/api/v1/customer/profile")
            .cookie(Cookie::new("access_token", token.clone()))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "42");

        let req = test::TestRequest::get()
            .uri("/api/v1/customer/profile")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "42");
    }

    #[actix_web::test]
    async fn test_public_route_attaches_optional_user() {
        let jwt = jwt();
        let token = jwt.generate_access_token(7).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt, "access_token"))
                .route("/api/v1/status", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/status").to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "0");

        let req = test::TestRequest::get()
            .uri("/api/v1/status")
            .cookie(Cookie::new("access_token", "garbage"))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "0");

        let req = test::TestRequest::get()
            .uri("/api/v1/status")
            .cookie(Cookie::new("access_token", token))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "7");
    }
}
