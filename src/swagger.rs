use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{AnnouncementType, CommissionType, Gender, GymGender, PaymentMethod};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::request_otp,
        handlers::auth::verify_otp,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::status,
        handlers::customer::register,
        handlers::customer::get_profile,
        handlers::customer::update_profile,
        handlers::customer::list_gyms,
        handlers::customer::get_gym,
        handlers::customer::list_signed_gyms,
        handlers::customer::get_signed_gym,
        handlers::customer::enter_request,
        handlers::customer::list_memberships,
        handlers::customer::get_membership,
        handlers::customer::sign_up_membership,
        handlers::customer::list_transactions,
        handlers::customer::gym_announcements,
        handlers::customer::platform_announcements,
        handlers::customer::list_notifications,
        handlers::customer::read_notification,
        handlers::customer::list_tickets,
        handlers::customer::create_ticket,
        handlers::gym_manager::upgrade,
        handlers::gym_manager::add_gym,
        handlers::gym_panel::list_gyms,
        handlers::gym_panel::create_gym,
        handlers::gym_panel::get_gym,
        handlers::gym_panel::list_membership_types,
        handlers::gym_panel::create_membership_type,
        handlers::gym_panel::get_membership_type,
        handlers::gym_panel::list_banners,
        handlers::gym_panel::create_banner,
        handlers::gym_panel::get_banner,
        handlers::gym_panel::list_images,
        handlers::gym_panel::create_image,
        handlers::gym_panel::get_image,
        handlers::gym_panel::list_customers,
        handlers::gym_panel::get_customer,
        handlers::gym_panel::list_deposits,
        handlers::gym_panel::list_withdrawals,
        handlers::gym_panel::list_in_outs,
        handlers::gym_panel::confirm_entry,
        handlers::gym_panel::register_exit,
        handlers::gym_panel::create_announcement,
        handlers::admin::list_customers,
        handlers::admin::get_customer,
        handlers::admin::delete_customer,
        handlers::admin::create_announcement,
        handlers::admin::create_api_key,
        handlers::admin::activate_gym,
        handlers::admin::list_transactions,
    ),
    components(
        schemas(
            AnnouncementType,
            CommissionType,
            Gender,
            GymGender,
            PaymentMethod,
            LoginRequest,
            RequestOtpRequest,
            RequestOtpResponse,
            VerifyOtpRequest,
            UserResponse,
            AuthResponse,
            RefreshResponse,
            RoleStatus,
            RegisterCustomerRequest,
            UpdateCustomerProfileRequest,
            CustomerProfileResponse,
            CustomerAuthResponse,
            GymResponse,
            CustomerGymResponse,
            GymDetailResponse,
            CreateGymRequest,
            MembershipTypeResponse,
            CreateMembershipTypeRequest,
            GymMediaResponse,
            CreateGymMediaRequest,
            UpgradeToManagerRequest,
            GymManagerResponse,
            MembershipResponse,
            SignUpMembershipRequest,
            PaymentResult,
            SignUpMembershipResponse,
            EnterRequest,
            ConfirmEntryRequest,
            InOutResponse,
            GymPanelCustomerResponse,
            GymPanelCustomerDetailResponse,
            TransactionResponse,
            AnnouncementResponse,
            CreateAnnouncementRequest,
            NotificationResponse,
            TicketResponse,
            CreateTicketRequest,
            AdminCustomerDetailResponse,
            BlockListResponse,
            RateResponse,
            CreateApiKeyRequest,
            ApiKeyResponse,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login, OTP and session tokens"),
        (name = "customer", description = "Customer panel"),
        (name = "gym-manager", description = "Gym manager onboarding"),
        (name = "gym-panel", description = "Gym manager and secretary panel"),
        (name = "admin-panel", description = "Platform administration"),
    ),
    info(
        title = "Fitno Backend API",
        version = "1.0.0",
        description = "Fitno gym membership REST API documentation"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_panel_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/login"));
        assert!(paths.contains_key("/api/v1/customer/gyms/enter-request"));
        assert!(paths.contains_key("/api/v1/gym-panel/in-outs/{id}/confirm"));
        assert!(paths.contains_key("/api/v1/admin-panel/customers/{id}"));
    }
}
