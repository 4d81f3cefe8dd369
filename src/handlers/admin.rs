use actix_web::{HttpRequest, HttpResponse, Result, web};

use crate::handlers::{get_user_id_from_request, respond};
use crate::models::*;
use crate::services::{AdminService, CommunicationService, TransactionService};

#[utoipa::path(
    get,
    path = "/api/v1/admin-panel/customers",
    tag = "admin-panel",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Customers, deleted ones excluded"),
        (status = 403, description = "Caller is not a platform manager")
    )
)]
pub async fn list_customers(
    req: HttpRequest,
    admin_service: web::Data<AdminService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(admin_service.customers(user_id, &query).await))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin-panel/customers/{id}",
    tag = "admin-panel",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer with full history", body = AdminCustomerDetailResponse),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn get_customer(
    req: HttpRequest,
    admin_service: web::Data<AdminService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        admin_service
            .customer_detail(user_id, path.into_inner())
            .await,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin-panel/customers/{id}",
    tag = "admin-panel",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer flagged as deleted", body = CustomerProfileResponse),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn delete_customer(
    req: HttpRequest,
    admin_service: web::Data<AdminService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        admin_service
            .delete_customer(user_id, path.into_inner())
            .await,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin-panel/announcements",
    tag = "admin-panel",
    security(("bearer_auth" = [])),
    request_body = CreateAnnouncementRequest,
    responses(
        (status = 200, description = "Platform announcement posted", body = AnnouncementResponse)
    )
)]
pub async fn create_announcement(
    req: HttpRequest,
    communication_service: web::Data<CommunicationService>,
    request: web::Json<CreateAnnouncementRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        communication_service
            .create_platform_announcement(user_id, request.into_inner())
            .await,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin-panel/api-keys",
    tag = "admin-panel",
    security(("bearer_auth" = [])),
    request_body = CreateApiKeyRequest,
    responses(
        (status = 200, description = "API key issued", body = ApiKeyResponse)
    )
)]
pub async fn create_api_key(
    req: HttpRequest,
    admin_service: web::Data<AdminService>,
    request: web::Json<CreateApiKeyRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        admin_service
            .create_api_key(user_id, request.into_inner())
            .await,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin-panel/gyms/{id}/activate",
    tag = "admin-panel",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Gym id")),
    responses(
        (status = 200, description = "Gym is listed in the catalog", body = GymResponse),
        (status = 404, description = "Gym not found")
    )
)]
pub async fn activate_gym(
    req: HttpRequest,
    admin_service: web::Data<AdminService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        admin_service.activate_gym(user_id, path.into_inner()).await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin-panel/transactions",
    tag = "admin-panel",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "All transactions, newest first")
    )
)]
pub async fn list_transactions(
    req: HttpRequest,
    transaction_service: web::Data<TransactionService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        transaction_service.all_transactions(user_id, &query).await,
    ))
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin-panel")
            .route("/customers", web::get().to(list_customers))
            .route("/customers/{id}", web::get().to(get_customer))
            .route("/customers/{id}", web::delete().to(delete_customer))
            .route("/announcements", web::post().to(create_announcement))
            .route("/api-keys", web::post().to(create_api_key))
            .route("/gyms/{id}/activate", web::post().to(activate_gym))
            .route("/transactions", web::get().to(list_transactions)),
    );
}
