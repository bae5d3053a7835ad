pub mod asset;
pub mod auth;
pub mod category;
pub mod dashboard;
pub mod leave;
pub mod password;
pub mod rack;
pub mod shift_change;
pub mod task;
pub mod term;
pub mod views;
