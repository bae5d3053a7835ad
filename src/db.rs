pub mod user_repo;
pub use user_repo::UserRepository;
pub mod rack_repo;
pub use rack_repo::RackRepository;
pub mod view_repo;
pub use view_repo::ViewRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod shift_repo;
pub use shift_repo::ShiftChangeRepository;
pub mod leave_repo;
pub use leave_repo::LeaveRepository;
pub mod category_repo;
pub use category_repo::CategoryRepository;
pub mod asset_repo;
pub use asset_repo::AssetRepository;
pub mod password_repo;
pub use password_repo::PasswordRepository;
pub mod term_repo;
pub use term_repo::TermRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
