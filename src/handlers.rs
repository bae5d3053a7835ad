pub mod assets;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod leave_requests;
pub mod passwords;
pub mod racks;
pub mod shift_changes;
pub mod tasks;
pub mod terms;
pub mod users;
