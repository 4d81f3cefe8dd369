use actix_web::{HttpRequest, HttpResponse, Result, web};

use crate::handlers::{get_user_id_from_request, respond};
use crate::models::*;
use crate::services::GymManagerService;

#[utoipa::path(
    post,
    path = "/api/v1/gym-manager/upgrade",
    tag = "gym-manager",
    security(("bearer_auth" = [])),
    request_body = UpgradeToManagerRequest,
    responses(
        (status = 200, description = "Manager profile attached", body = GymManagerResponse),
        (status = 400, description = "Caller is already a gym manager")
    )
)]
pub async fn upgrade(
    req: HttpRequest,
    manager_service: web::Data<GymManagerService>,
    request: web::Json<UpgradeToManagerRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        manager_service.upgrade(user_id, request.into_inner()).await,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/gym-manager/add-gym",
    tag = "gym-manager",
    security(("bearer_auth" = [])),
    request_body = CreateGymRequest,
    responses(
        (status = 200, description = "Gym created, pending activation", body = GymResponse),
        (status = 403, description = "Caller is not a gym manager")
    )
)]
pub async fn add_gym(
    req: HttpRequest,
    manager_service: web::Data<GymManagerService>,
    request: web::Json<CreateGymRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    Ok(respond(
        manager_service.add_gym(user_id, request.into_inner()).await,
    ))
}

pub fn gym_manager_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/gym-manager")
            .route("/upgrade", web::post().to(upgrade))
            .route("/add-gym", web::post().to(add_gym)),
    );
}
