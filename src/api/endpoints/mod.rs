pub mod admin;
pub mod health;
pub mod schemes;
pub mod uploads;
pub mod verifications;
