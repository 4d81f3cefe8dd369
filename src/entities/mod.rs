pub mod announcements;
pub mod api_keys;
pub mod blacklisted_tokens;
pub mod block_lists;
pub mod customers;
pub mod gym_banners;
pub mod gym_images;
pub mod gym_managers;
pub mod gym_secretaries;
pub mod gyms;
pub mod in_outs;
pub mod membership_types;
pub mod memberships;
pub mod notifications;
pub mod otps;
pub mod platform_managers;
pub mod rates;
pub mod tickets;
pub mod transactions;
pub mod users;

pub use announcements::AnnouncementType;
pub use customers::Gender;
pub use gyms::{CommissionType, GymGender};
pub use transactions::PaymentMethod;

pub use announcements as announcement_entity;
pub use api_keys as api_key_entity;
pub use blacklisted_tokens as blacklisted_token_entity;
pub use block_lists as block_list_entity;
pub use customers as customer_entity;
pub use gym_banners as gym_banner_entity;
pub use gym_images as gym_image_entity;
pub use gym_managers as gym_manager_entity;
pub use gym_secretaries as gym_secretary_entity;
pub use gyms as gym_entity;
pub use in_outs as in_out_entity;
pub use membership_types as membership_type_entity;
pub use memberships as membership_entity;
pub use notifications as notification_entity;
pub use otps as otp_entity;
pub use platform_managers as platform_manager_entity;
pub use rates as rate_entity;
pub use tickets as ticket_entity;
pub use transactions as transaction_entity;
pub use users as user_entity;
