use actix_web::{HttpRequest, HttpResponse, Result, web};

use crate::handlers::{get_user_id_from_request, respond};
use crate::models::*;
use crate::services::{
    CheckInService, CommunicationService, GymManagerService, GymPanelService, TransactionService,
};

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/gyms",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Gyms in the caller's scope", body = [GymResponse]),
        (status = 403, description = "Caller is neither manager nor secretary")
    )
)]
pub async fn list_gyms(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(panel_service.gyms(user_id).await))
}

#[utoipa::path(
    post,
    path = "/api/v1/gym-panel/gyms",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    request_body = CreateGymRequest,
    responses(
        (status = 200, description = "Gym created, pending activation", body = GymResponse),
        (status = 403, description = "Caller is not a gym manager")
    )
)]
pub async fn create_gym(
    req: HttpRequest,
    manager_service: web::Data<GymManagerService>,
    request: web::Json<CreateGymRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        manager_service.add_gym(user_id, request.into_inner()).await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/gyms/{id}",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Gym id")),
    responses(
        (status = 200, description = "Gym", body = GymResponse),
        (status = 404, description = "Gym not in scope")
    )
)]
pub async fn get_gym(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(panel_service.gym(user_id, path.into_inner()).await))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/membership-types",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Membership types of scoped gyms", body = [MembershipTypeResponse])
    )
)]
pub async fn list_membership_types(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(panel_service.membership_types(user_id).await))
}

#[utoipa::path(
    post,
    path = "/api/v1/gym-panel/membership-types",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    request_body = CreateMembershipTypeRequest,
    responses(
        (status = 200, description = "Membership type created", body = MembershipTypeResponse),
        (status = 400, description = "Invalid days or price"),
        (status = 403, description = "Gym not owned by the caller")
    )
)]
pub async fn create_membership_type(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
    request: web::Json<CreateMembershipTypeRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        panel_service
            .create_membership_type(user_id, request.into_inner())
            .await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/membership-types/{id}",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Membership type id")),
    responses(
        (status = 200, description = "Membership type", body = MembershipTypeResponse),
        (status = 404, description = "Not in scope")
    )
)]
pub async fn get_membership_type(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        panel_service
            .membership_type(user_id, path.into_inner())
            .await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/banners",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Banners of scoped gyms", body = [GymMediaResponse])
    )
)]
pub async fn list_banners(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(panel_service.banners(user_id).await))
}

#[utoipa::path(
    post,
    path = "/api/v1/gym-panel/banners",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    request_body = CreateGymMediaRequest,
    responses(
        (status = 200, description = "Banner added", body = GymMediaResponse),
        (status = 403, description = "Gym not owned by the caller")
    )
)]
pub async fn create_banner(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
    request: web::Json<CreateGymMediaRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        panel_service
            .create_banner(user_id, request.into_inner())
            .await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/banners/{id}",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Banner id")),
    responses(
        (status = 200, description = "Banner", body = GymMediaResponse),
        (status = 404, description = "Not in scope")
    )
)]
pub async fn get_banner(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        panel_service.banner(user_id, path.into_inner()).await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/images",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Images of scoped gyms", body = [GymMediaResponse])
    )
)]
pub async fn list_images(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(panel_service.images(user_id).await))
}

#[utoipa::path(
    post,
    path = "/api/v1/gym-panel/images",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    request_body = CreateGymMediaRequest,
    responses(
        (status = 200, description = "Image added", body = GymMediaResponse),
        (status = 403, description = "Gym not owned by the caller")
    )
)]
pub async fn create_image(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
    request: web::Json<CreateGymMediaRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        panel_service
            .create_image(user_id, request.into_inner())
            .await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/images/{id}",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image", body = GymMediaResponse),
        (status = 404, description = "Not in scope")
    )
)]
pub async fn get_image(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(panel_service.image(user_id, path.into_inner()).await))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/customers",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Customers holding a membership at a scoped gym", body = [GymPanelCustomerResponse])
    )
)]
pub async fn list_customers(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(panel_service.customers(user_id).await))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/customers/{id}",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer with scoped memberships and visits", body = GymPanelCustomerDetailResponse),
        (status = 404, description = "Customer has no membership in scope")
    )
)]
pub async fn get_customer(
    req: HttpRequest,
    panel_service: web::Data<GymPanelService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        panel_service
            .customer_detail(user_id, path.into_inner())
            .await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/transactions/deposits",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Membership payments at scoped gyms", body = [TransactionResponse])
    )
)]
pub async fn list_deposits(
    req: HttpRequest,
    transaction_service: web::Data<TransactionService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(transaction_service.deposits(user_id).await))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/transactions/withdrawals",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payouts to the managers of scoped gyms", body = [TransactionResponse])
    )
)]
pub async fn list_withdrawals(
    req: HttpRequest,
    transaction_service: web::Data<TransactionService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(transaction_service.withdrawals(user_id).await))
}

#[utoipa::path(
    get,
    path = "/api/v1/gym-panel/in-outs",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Entry records of scoped gyms", body = [InOutResponse])
    )
)]
pub async fn list_in_outs(
    req: HttpRequest,
    check_in_service: web::Data<CheckInService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(check_in_service.list_for_panel(user_id).await))
}

#[utoipa::path(
    post,
    path = "/api/v1/gym-panel/in-outs/{id}/confirm",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Entry record id")),
    request_body = ConfirmEntryRequest,
    responses(
        (status = 200, description = "Entry confirmed, one session consumed", body = InOutResponse),
        (status = 400, description = "Already confirmed or no session left"),
        (status = 404, description = "Not in scope")
    )
)]
pub async fn confirm_entry(
    req: HttpRequest,
    check_in_service: web::Data<CheckInService>,
    path: web::Path<i64>,
    request: web::Json<ConfirmEntryRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        check_in_service
            .confirm_entry(user_id, path.into_inner(), request.into_inner())
            .await,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/gym-panel/in-outs/{id}/exit",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Entry record id")),
    responses(
        (status = 200, description = "Exit registered", body = InOutResponse),
        (status = 400, description = "Entry not confirmed or already closed"),
        (status = 404, description = "Not in scope")
    )
)]
pub async fn register_exit(
    req: HttpRequest,
    check_in_service: web::Data<CheckInService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        check_in_service
            .register_exit(user_id, path.into_inner())
            .await,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/gym-panel/announcements",
    tag = "gym-panel",
    security(("bearer_auth" = [])),
    request_body = CreateAnnouncementRequest,
    responses(
        (status = 200, description = "Gym announcement posted", body = AnnouncementResponse),
        (status = 403, description = "Gym not owned by the caller")
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
            .create_gym_announcement(user_id, request.into_inner())
            .await,
    ))
}

pub fn gym_panel_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/gym-panel")
            .route("/gyms", web::get().to(list_gyms))
            .route("/gyms", web::post().to(create_gym))
            .route("/gyms/{id}", web::get().to(get_gym))
            .route("/membership-types", web::get().to(list_membership_types))
            .route("/membership-types", web::post().to(create_membership_type))
            .route("/membership-types/{id}", web::get().to(get_membership_type))
            .route("/banners", web::get().to(list_banners))
            .route("/banners", web::post().to(create_banner))
            .route("/banners/{id}", web::get().to(get_banner))
            .route("/images", web::get().to(list_images))
            .route("/images", web::post().to(create_image))
            .route("/images/{id}", web::get().to(get_image))
            .route("/customers", web::get().to(list_customers))
            .route("/customers/{id}", web::get().to(get_customer))
            .route("/transactions/deposits", web::get().to(list_deposits))
            .route("/transactions/withdrawals", web::get().to(list_withdrawals))
            .route("/in-outs", web::get().to(list_in_outs))
            .route("/in-outs/{id}/confirm", web::post().to(confirm_entry))
            .route("/in-outs/{id}/exit", web::post().to(register_exit))
            .route("/announcements", web::post().to(create_announcement)),
    );
}
