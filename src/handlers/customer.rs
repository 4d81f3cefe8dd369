use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::{get_user_id_from_request, respond};
use crate::models::*;
use crate::services::{
    CheckInService, CommunicationService, CustomerService, GymCatalogService, MembershipService,
    TransactionService,
};
use crate::utils::SessionCookies;

#[utoipa::path(
    post,
    path = "/api/v1/customer/register",
    tag = "customer",
    request_body = RegisterCustomerRequest,
    responses(
        (status = 200, description = "Account created, session cookies set", body = CustomerAuthResponse),
        (status = 400, description = "Invalid input, duplicate phone or already signed in")
    )
)]
pub async fn register(
    req: HttpRequest,
    customer_service: web::Data<CustomerService>,
    cookies: web::Data<SessionCookies>,
    request: web::Json<RegisterCustomerRequest>,
) -> Result<HttpResponse> {
    let caller_id = get_user_id_from_request(&req);
    match customer_service
        .register(caller_id, request.into_inner())
        .await
    {
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
    get,
    path = "/api/v1/customer/profile",
    tag = "customer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Customer profile", body = CustomerProfileResponse),
        (status = 403, description = "Caller is not a customer")
    )
)]
pub async fn get_profile(
    req: HttpRequest,
    customer_service: web::Data<CustomerService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(customer_service.get_profile(user_id).await))
}

#[utoipa::path(
    patch,
    path = "/api/v1/customer/profile",
    tag = "customer",
    security(("bearer_auth" = [])),
    request_body = UpdateCustomerProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = CustomerProfileResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn update_profile(
    req: HttpRequest,
    customer_service: web::Data<CustomerService>,
    request: web::Json<UpdateCustomerProfileRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        customer_service
            .update_profile(user_id, request.into_inner())
            .await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/gyms",
    tag = "customer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active gyms open to the customer", body = [CustomerGymResponse])
    )
)]
pub async fn list_gyms(
    req: HttpRequest,
    catalog_service: web::Data<GymCatalogService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(catalog_service.browse(user_id).await))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/gyms/{id}",
    tag = "customer",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Gym id")),
    responses(
        (status = 200, description = "Gym with plans and media", body = GymDetailResponse),
        (status = 404, description = "Gym not found or inactive")
    )
)]
pub async fn get_gym(
    req: HttpRequest,
    catalog_service: web::Data<GymCatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        catalog_service.gym_detail(user_id, path.into_inner()).await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/gyms/signed",
    tag = "customer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Gyms where the customer holds a membership", body = [CustomerGymResponse]),
        (status = 404, description = "No memberships yet")
    )
)]
pub async fn list_signed_gyms(
    req: HttpRequest,
    catalog_service: web::Data<GymCatalogService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(catalog_service.signed_gyms(user_id).await))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/gyms/signed/{id}",
    tag = "customer",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Gym id")),
    responses(
        (status = 200, description = "Signed gym detail", body = GymDetailResponse),
        (status = 404, description = "No membership at this gym")
    )
)]
pub async fn get_signed_gym(
    req: HttpRequest,
    catalog_service: web::Data<GymCatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        catalog_service
            .signed_gym_detail(user_id, path.into_inner())
            .await,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/customer/gyms/enter-request",
    tag = "customer",
    security(("bearer_auth" = [])),
    request_body = EnterRequest,
    responses(
        (status = 200, description = "Entry request opened", body = InOutResponse),
        (status = 400, description = "No usable membership or a request is already open")
    )
)]
pub async fn enter_request(
    req: HttpRequest,
    check_in_service: web::Data<CheckInService>,
    request: web::Json<EnterRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        check_in_service
            .enter_request(user_id, request.into_inner())
            .await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/memberships",
    tag = "customer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Memberships, usable ones first", body = [MembershipResponse]),
        (status = 404, description = "No memberships")
    )
)]
pub async fn list_memberships(
    req: HttpRequest,
    membership_service: web::Data<MembershipService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(membership_service.list(user_id).await))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/memberships/{id}",
    tag = "customer",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Membership id")),
    responses(
        (status = 200, description = "Membership", body = MembershipResponse),
        (status = 404, description = "Membership not found")
    )
)]
pub async fn get_membership(
    req: HttpRequest,
    membership_service: web::Data<MembershipService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        membership_service.get(user_id, path.into_inner()).await,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/customer/memberships/sign-up",
    tag = "customer",
    security(("bearer_auth" = [])),
    request_body = SignUpMembershipRequest,
    responses(
        (status = 200, description = "Membership created; payment outcome attached", body = SignUpMembershipResponse),
        (status = 400, description = "Gym inactive or not open to the customer"),
        (status = 404, description = "Membership type not found")
    )
)]
pub async fn sign_up_membership(
    req: HttpRequest,
    membership_service: web::Data<MembershipService>,
    request: web::Json<SignUpMembershipRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        membership_service
            .sign_up(user_id, request.into_inner())
            .await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/transactions",
    tag = "customer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payments made by the caller", body = [TransactionResponse]),
        (status = 404, description = "No transactions")
    )
)]
pub async fn list_transactions(
    req: HttpRequest,
    transaction_service: web::Data<TransactionService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        transaction_service.customer_transactions(user_id).await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/announcements/gym",
    tag = "customer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Announcements of gyms with a usable membership", body = [AnnouncementResponse]),
        (status = 404, description = "No announcements")
    )
)]
pub async fn gym_announcements(
    req: HttpRequest,
    communication_service: web::Data<CommunicationService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        communication_service
            .gym_announcements_for_customer(user_id)
            .await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/announcements/platform",
    tag = "customer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Platform announcements", body = [AnnouncementResponse]),
        (status = 404, description = "No announcements")
    )
)]
pub async fn platform_announcements(
    communication_service: web::Data<CommunicationService>,
) -> Result<HttpResponse> {
    Ok(respond(communication_service.platform_announcements().await))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/notifications",
    tag = "customer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notifications, newest first", body = [NotificationResponse]),
        (status = 404, description = "No notifications")
    )
)]
pub async fn list_notifications(
    req: HttpRequest,
    communication_service: web::Data<CommunicationService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(communication_service.notifications(user_id).await))
}

#[utoipa::path(
    post,
    path = "/api/v1/customer/notifications/{id}/read",
    tag = "customer",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked as read", body = NotificationResponse),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn read_notification(
    req: HttpRequest,
    communication_service: web::Data<CommunicationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        communication_service
            .mark_notification_read(user_id, path.into_inner())
            .await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/tickets",
    tag = "customer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tickets sent by the caller", body = [TicketResponse])
    )
)]
pub async fn list_tickets(
    req: HttpRequest,
    communication_service: web::Data<CommunicationService>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(communication_service.tickets(user_id).await))
}

#[utoipa::path(
    post,
    path = "/api/v1/customer/tickets",
    tag = "customer",
    security(("bearer_auth" = [])),
    request_body = CreateTicketRequest,
    responses(
        (status = 200, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Invalid ticket")
    )
)]
pub async fn create_ticket(
    req: HttpRequest,
    communication_service: web::Data<CommunicationService>,
    request: web::Json<CreateTicketRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        communication_service
            .create_ticket(user_id, request.into_inner())
            .await,
    ))
}

pub fn customer_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customer")
            .route("/register", web::post().to(register))
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::patch().to(update_profile))
            .route("/gyms", web::get().to(list_gyms))
            .route("/gyms/signed", web::get().to(list_signed_gyms))
            .route("/gyms/signed/{id}", web::get().to(get_signed_gym))
            .route("/gyms/enter-request", web::post().to(enter_request))
            .route("/gyms/{id}", web::get().to(get_gym))
            .route("/memberships", web::get().to(list_memberships))
            .route("/memberships/sign-up", web::post().to(sign_up_membership))
            .route("/memberships/{id}", web::get().to(get_membership))
            .route("/transactions", web::get().to(list_transactions))
            .route("/announcements/gym", web::get().to(gym_announcements))
            .route(
                "/announcements/platform",
                web::get().to(platform_announcements),
            )
            .route("/notifications", web::get().to(list_notifications))
            .route(
                "/notifications/{id}/read",
                web::post().to(read_notification),
            )
            .route("/tickets", web::get().to(list_tickets))
            .route("/tickets", web::post().to(create_ticket)),
    );
}
