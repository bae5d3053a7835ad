pub mod asset_service;
pub mod auth;
pub mod category_service;
pub mod dashboard_service;
pub mod document_service;
pub mod leave_service;
pub mod password_service;
pub mod rack_service;
pub mod shift_service;
pub mod task_service;
pub mod user_service;
