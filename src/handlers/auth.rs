use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::{get_user_id_from_request, respond};
use crate::models::*;
use crate::services::{AuthService, IdentityService};
use crate::utils::{RateLimiter, SessionCookies};

async fn check_rate_limit(limiter: &RateLimiter, req: &HttpRequest) -> crate::AppResult<()> {
    limiter.check(&limiter.client_key(req)).await
}

#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookies set", body = AuthResponse),
        (status = 400, description = "Invalid credentials")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    cookies: web::Data<SessionCookies>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok()
            .cookie(cookies.access(&response.access_token))
            .cookie(cookies.refresh(&response.refresh_token))
            .json(json!({
                "success": true,
                "data": response
            }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/request-otp",
    tag = "auth",
    request_body = RequestOtpRequest,
    responses(
        (status = 200, description = "Code sent", body = RequestOtpResponse),
        (status = 404, description = "Phone not registered"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn request_otp(
    req: HttpRequest,
    auth_service: web::Data<AuthService>,
    limiter: web::Data<RateLimiter>,
    request: web::Json<RequestOtpRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = check_rate_limit(&limiter, &req).await {
        return Ok(e.error_response());
    }
    Ok(respond(auth_service.request_otp(&request.phone).await))
}

#[utoipa::path(
    post,
    path = "/api/v1/verify-otp",
    tag = "auth",
    request_body = VerifyOtpRequest,
    params(
        ("X-API-Key" = String, Header, description = "Client API key")
    ),
    responses(
        (status = 200, description = "Verified, session cookies set", body = AuthResponse),
        (status = 400, description = "Missing, expired or incorrect code"),
        (status = 403, description = "Missing or invalid API key"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn verify_otp(
    req: HttpRequest,
    auth_service: web::Data<AuthService>,
    cookies: web::Data<SessionCookies>,
    limiter: web::Data<RateLimiter>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = check_rate_limit(&limiter, &req).await {
        return Ok(e.error_response());
    }

    let api_key = req
        .headers()
        .get("X-API-Key")
        .and_then(|value| value.to_str().ok());

    match auth_service.verify_otp(api_key, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok()
            .cookie(cookies.access(&response.access_token))
            .cookie(cookies.refresh(&response.refresh_token))
            .json(json!({
                "success": true,
                "data": response
            }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/refresh",
    tag = "auth",
    responses(
        (status = 200, description = "New access token issued", body = RefreshResponse),
        (status = 401, description = "Refresh token missing, invalid or revoked")
    )
)]
pub async fn refresh(
    req: HttpRequest,
    auth_service: web::Data<AuthService>,
    cookies: web::Data<SessionCookies>,
) -> Result<HttpResponse> {
    let token = cookies.refresh_token(&req);
    match auth_service.refresh(token.as_deref()).await {
        Ok(response) => Ok(HttpResponse::Ok()
            .cookie(cookies.access(&response.access_token))
            .json(json!({
                "success": true,
                "data": response
            }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Refresh token revoked, cookies cleared"),
        (status = 400, description = "Refresh token missing or invalid")
    )
)]
pub async fn logout(
    req: HttpRequest,
    auth_service: web::Data<AuthService>,
    cookies: web::Data<SessionCookies>,
) -> Result<HttpResponse> {
    let token = cookies.refresh_token(&req);
    match auth_service.logout(token.as_deref()).await {
        Ok(()) => Ok(HttpResponse::Ok()
            .cookie(cookies.clear_access())
            .cookie(cookies.clear_refresh())
            .json(json!({
                "success": true,
                "message": "Logged out"
            }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "auth",
    responses(
        (status = 200, description = "Roles held by the caller", body = RoleStatus)
    )
)]
pub async fn status(
    req: HttpRequest,
    identity_service: web::Data<IdentityService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(identity_service.role_status(user_id).await))
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login))
        .route("/request-otp", web::post().to(request_otp))
        .route("/verify-otp", web::post().to(verify_otp))
        .route("/refresh", web::post().to(refresh))
        .route("/logout", web::post().to(logout))
        .route("/status", web::get().to(status));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::utils::JwtService;
    use actix_web::cookie::Cookie;
    use actix_web::cookie::time::Duration;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use std::sync::Arc;

    fn jwt() -> JwtService {
        let config = test_config();
        JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expires_in,
            config.jwt.refresh_token_expires_in,
        )
    }

    fn cookies() -> SessionCookies {
        let config = test_config();
        SessionCookies::new(
            config.cookie,
            config.jwt.access_token_expires_in,
            config.jwt.refresh_token_expires_in,
        )
    }

    macro_rules! auth_app {
        ($db:expr) => {{
            let db = $db;
            let auth_service = AuthService::new(
                db.clone(),
                jwt(),
                Arc::new(FakeOtpSender::default()),
                test_config().otp,
                IdentityService::new(db.clone()),
            );
            test::init_service(
                App::new()
                    .app_data(web::Data::new(auth_service))
                    .app_data(web::Data::new(cookies()))
                    .app_data(web::Data::new(RateLimiter::new(5, 60)))
                    .service(web::scope("/api/v1").configure(auth_config)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_refresh_reissues_only_access_cookie() {
        let db = setup_db().await;
        let user = seed_user(&db, "09120000001", "Sara Ahmadi").await;
        let refresh = jwt().generate_refresh_token(user.id).unwrap();
        let app = auth_app!(&db);

        let req = test::TestRequest::post()
            .uri("/api/v1/refresh")
            .cookie(Cookie::new("refresh_token", refresh))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let set: Vec<Cookie<'static>> = resp.response().cookies().map(|c| c.into_owned()).collect();
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].name(), "access_token");
        assert!(!set[0].value().is_empty());
        assert_eq!(set[0].http_only(), Some(true));

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert!(body["data"]["access_token"].is_string());
    }

    #[actix_web::test]
    async fn test_refresh_without_cookie_is_unauthorized() {
        let db = setup_db().await;
        let app = auth_app!(&db);

        let req = test::TestRequest::post().uri("/api/v1/refresh").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.response().cookies().count(), 0);
    }

    #[actix_web::test]
    async fn test_logout_clears_both_cookies() {
        let db = setup_db().await;
        let user = seed_user(&db, "09120000002", "Reza Karimi").await;
        let refresh = jwt().generate_refresh_token(user.id).unwrap();
        let app = auth_app!(&db);

        let req = test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(Cookie::new("refresh_token", refresh.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let mut names = Vec::new();
        for cookie in resp.response().cookies() {
            assert!(cookie.value().is_empty());
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            names.push(cookie.name().to_string());
        }
        names.sort();
        assert_eq!(names, vec!["access_token", "refresh_token"]);

        // the revoked token can no longer mint access tokens
        let req = test::TestRequest::post()
            .uri("/api/v1/refresh")
            .cookie(Cookie::new("refresh_token", refresh))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
