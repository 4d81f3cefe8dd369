pub mod admin;
pub mod auth;
pub mod customer;
pub mod gym_manager;
pub mod gym_panel;
pub mod ws;

pub use admin::admin_config;
pub use auth::auth_config;
pub use customer::customer_config;
pub use gym_manager::gym_manager_config;
pub use gym_panel::gym_panel_config;
pub use ws::ws_config;

use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;

use crate::error::AppResult;

/// User id attached by the auth middleware, or 0 for anonymous callers.
pub fn get_user_id_from_request(req: &HttpRequest) -> i64 {
    req.extensions().get::<i64>().copied().unwrap_or(0)
}

pub(crate) fn respond<T: Serialize>(result: AppResult<T>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        })),
        Err(e) => e.error_response(),
    }
}
