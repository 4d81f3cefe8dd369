pub mod payment;
pub mod sms;

pub use payment::*;
pub use sms::*;
