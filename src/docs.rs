// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health / Dashboard ---
        handlers::dashboard::health,
        handlers::dashboard::get_summary,

        // --- Auth ---
        handlers::auth::login,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::auth::get_me,
        handlers::auth::change_password,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_role,
        handlers::users::delete_user,
        handlers::users::reset_user_password,
        handlers::users::upload_avatar,

        // --- Racks ---
        handlers::racks::list_racks,
        handlers::racks::create_rack,
        handlers::racks::get_rack,
        handlers::racks::delete_rack,
        handlers::racks::add_levels,
        handlers::racks::remove_levels,
        handlers::racks::add_positions,
        handlers::racks::remove_positions,
        handlers::racks::update_address,
        handlers::racks::search_items,

        // --- Tasks ---
        handlers::tasks::get_board,
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::get_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,
        handlers::tasks::change_status,
        handlers::tasks::record_view,
        handlers::tasks::auto_archive,
        handlers::tasks::list_comments,
        handlers::tasks::add_comment,
        handlers::tasks::update_comment,
        handlers::tasks::delete_comment,

        // --- Shift changes ---
        handlers::shift_changes::list_shift_changes,
        handlers::shift_changes::create_shift_change,
        handlers::shift_changes::get_shift_change,
        handlers::shift_changes::update_shift_change,
        handlers::shift_changes::set_archived,
        handlers::shift_changes::delete_shift_change,
        handlers::shift_changes::record_view,

        // --- Leave requests ---
        handlers::leave_requests::list_requests,
        handlers::leave_requests::create_request,
        handlers::leave_requests::get_request,
        handlers::leave_requests::update_request,
        handlers::leave_requests::delete_request,
        handlers::leave_requests::transition_request,
        handlers::leave_requests::record_view,

        // --- Assets ---
        handlers::assets::list_assets,
        handlers::assets::create_asset,
        handlers::assets::get_asset,
        handlers::assets::get_by_serial,
        handlers::assets::update_asset,
        handlers::assets::delete_asset,
        handlers::assets::change_status,
        handlers::assets::send_to_maintenance,
        handlers::assets::finish_maintenance,
        handlers::assets::decommission,

        // --- Categories ---
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::categories::get_category,
        handlers::categories::update_category,
        handlers::categories::delete_category,

        // --- Passwords ---
        handlers::passwords::list_passwords,
        handlers::passwords::create_password,
        handlers::passwords::update_password,
        handlers::passwords::delete_password,

        // --- Terms ---
        handlers::terms::list_templates,
        handlers::terms::list_issued,
        handlers::terms::render_term,
        handlers::terms::term_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateRolePayload,
            models::auth::ChangePasswordPayload,
            models::auth::ForgotPasswordPayload,
            models::auth::ResetPasswordPayload,
            models::auth::AuthResponse,
            models::auth::ResetLinkResponse,

            // --- Views ---
            models::views::RecordViewPayload,
            models::views::ViewRecord,

            // --- Racks ---
            models::rack::Rack,
            models::rack::AddressItem,
            models::rack::Address,
            models::rack::LevelLayout,
            models::rack::RackLayout,
            models::rack::ItemLocation,
            handlers::racks::CreateRackPayload,
            handlers::racks::AddLevelsPayload,
            handlers::racks::AddPositionsPayload,
            handlers::racks::RemoveLevelsPayload,
            handlers::racks::RemovePositionsPayload,
            handlers::racks::UpdateAddressPayload,

            // --- Tasks ---
            models::task::TaskPriority,
            models::task::TaskStatus,
            models::task::Task,
            models::task::TaskComment,
            models::task::TaskFields,
            models::task::TaskCard,
            models::task::BoardColumn,
            models::task::TaskBoard,
            models::task::AutoArchiveReport,
            handlers::tasks::ChangeTaskStatusPayload,
            handlers::tasks::CommentPayload,

            // --- Shift changes ---
            models::shift_change::ShiftChangeStatus,
            models::shift_change::ShiftChange,
            models::shift_change::ShiftChangeEntry,
            models::shift_change::ShiftChangeFields,
            handlers::shift_changes::ArchivePayload,

            // --- Leave requests ---
            models::leave::LeaveKind,
            models::leave::RequestStatus,
            models::leave::LeaveRequest,
            models::leave::LeaveRequestEntry,
            models::leave::LeaveRequestFields,
            models::leave::LeaveTransitionPayload,

            // --- Assets ---
            models::asset::AssetStatus,
            models::asset::Asset,
            models::asset::MaintenanceRecord,
            models::asset::AssetDetail,
            models::asset::AssetFields,
            models::asset::AssetStatusPayload,
            models::asset::MaintenancePayload,
            models::asset::FinishMaintenancePayload,
            models::asset::DecommissionPayload,

            // --- Categories ---
            models::category::FieldType,
            models::category::Category,
            models::category::FieldDefinition,
            models::category::FieldDefinitionInput,
            models::category::CategoryPayload,
            models::category::CategorySchema,

            // --- Passwords ---
            models::password::PasswordEntry,
            models::password::PasswordFields,

            // --- Terms ---
            models::term::TermTemplate,
            models::term::IssuedTerm,
            models::term::RenderedTerm,
            models::term::RenderTermPayload,

            // --- Dashboard ---
            models::dashboard::StatusCount,
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Health", description = "Verificação de disponibilidade"),
        (name = "Auth", description = "Login e recuperação de senha"),
        (name = "Users", description = "Usuários, perfis e avatar"),
        (name = "Racks", description = "Mapa de racks, níveis e posições"),
        (name = "Tasks", description = "Quadro de pendências e comentários"),
        (name = "Shift Changes", description = "Passagem de turno"),
        (name = "Leave Requests", description = "Férias, folgas e abonos"),
        (name = "Assets", description = "Inventário de ativos e manutenção"),
        (name = "Categories", description = "Categorias e campos personalizados"),
        (name = "Passwords", description = "Cofre de senhas da equipe"),
        (name = "Terms", description = "Termos de responsabilidade"),
        (name = "Dashboard", description = "Indicadores da página inicial")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
