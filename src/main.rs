use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::sync::Arc;

use fitno_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{OtpSender, PaymentGateway, SandboxPaymentGateway, SmsService},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::{JwtService, RateLimiter, SessionCookies},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml()
        .map_err(|e| std::io::Error::other(format!("Failed to load configuration: {e}")))?;

    let pool = create_pool(&config.database)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to database: {e}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to run database migrations: {e}")))?;

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );
    let cookies = SessionCookies::new(
        config.cookie.clone(),
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );
    let rate_limiter = RateLimiter::new(
        config.rate_limit.max_requests,
        config.rate_limit.window_seconds,
    )
    .trust_forwarded(config.rate_limit.trust_forwarded);

    let otp_sender: Arc<dyn OtpSender> = Arc::new(SmsService::new(config.sms.clone()));
    let payment_gateway: Arc<dyn PaymentGateway> =
        Arc::new(SandboxPaymentGateway::new(config.payment.auto_approve));
    if !config.payment.auto_approve {
        log::warn!("Sandbox payment gateway declines every payment; set payment.auto_approve to activate memberships");
    }

    let hub = NotificationHub::new();
    let identity_service = IdentityService::new(pool.clone());
    let communication_service =
        CommunicationService::new(pool.clone(), hub.clone(), identity_service.clone());

    let auth_service = AuthService::new(
        pool.clone(),
        jwt_service.clone(),
        otp_sender,
        config.otp.clone(),
        identity_service.clone(),
    );
    let customer_service =
        CustomerService::new(pool.clone(), jwt_service.clone(), identity_service.clone());
    let gym_manager_service = GymManagerService::new(pool.clone(), identity_service.clone());
    let catalog_service = GymCatalogService::new(pool.clone(), identity_service.clone());
    let membership_service = MembershipService::new(
        pool.clone(),
        identity_service.clone(),
        payment_gateway,
        communication_service.clone(),
    );
    let check_in_service = CheckInService::new(
        pool.clone(),
        identity_service.clone(),
        communication_service.clone(),
    );
    let panel_service = GymPanelService::new(pool.clone(), identity_service.clone());
    let transaction_service = TransactionService::new(pool.clone(), identity_service.clone());
    let admin_service = AdminService::new(pool.clone(), identity_service.clone());

    tasks::spawn_all(auth_service.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let access_cookie_name = config.cookie.access_cookie_name.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone(), &access_cookie_name))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::Data::new(cookies.clone()))
            .app_data(web::Data::new(rate_limiter.clone()))
            .app_data(web::Data::new(hub.clone()))
            .app_data(web::Data::new(identity_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(communication_service.clone()))
            .app_data(web::Data::new(customer_service.clone()))
            .app_data(web::Data::new(gym_manager_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(membership_service.clone()))
            .app_data(web::Data::new(check_in_service.clone()))
            .app_data(web::Data::new(panel_service.clone()))
            .app_data(web::Data::new(transaction_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .configure(swagger_config)
            .configure(handlers::ws_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::customer_config)
                    .configure(handlers::gym_manager_config)
                    .configure(handlers::gym_panel_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
