pub mod admin;
pub mod auth;
pub mod communication;
pub mod customer;
pub mod gym;
pub mod gym_panel;
pub mod in_out;
pub mod membership;
pub mod pagination;
pub mod transaction;

pub use admin::*;
pub use auth::*;
pub use communication::*;
pub use customer::*;
pub use gym::*;
pub use gym_panel::*;
pub use in_out::*;
pub use membership::*;
pub use pagination::*;
pub use transaction::*;
