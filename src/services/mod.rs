pub mod admin_service;
pub mod auth_service;
pub mod check_in_service;
pub mod communication_service;
pub mod customer_service;
pub mod gym_catalog_service;
pub mod gym_manager_service;
pub mod gym_panel_service;
pub mod identity_service;
pub mod membership_service;
pub mod notification_hub;
pub mod transaction_service;

pub use admin_service::*;
pub use auth_service::*;
pub use check_in_service::*;
pub use communication_service::*;
pub use customer_service::*;
pub use gym_catalog_service::*;
pub use gym_manager_service::*;
pub use gym_panel_service::*;
pub use identity_service::*;
pub use membership_service::*;
pub use notification_hub::*;
pub use transaction_service::*;
