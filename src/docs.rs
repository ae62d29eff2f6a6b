// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Despachos ---
        handlers::dispatches::handle_dispatches,
        handlers::documents::dispatch_sheet_pdf,

        // --- Catálogo ---
        handlers::products::handle_products,
        handlers::routes::handle_routes,
        handlers::drivers::handle_drivers,

        // --- Usuarios ---
        handlers::users::handle_users,

        // --- Reportes ---
        handlers::reports::handle_reports,
    ),
    components(
        schemas(
            // --- Comandos ---
            handlers::dispatches::DispatchCommand,
            handlers::products::ProductCommand,
            handlers::routes::RouteCommand,
            handlers::drivers::DriverCommand,
            handlers::users::UserCommand,
            handlers::reports::ReportCommand,

            // --- Despachos ---
            models::dispatch::DispatchState,
            models::dispatch::DispatchRequest,
            models::dispatch::ProductQuantities,
            models::dispatch::DispatchSummary,
            models::dispatch::DispatchHeader,
            models::dispatch::DispatchDetail,
            models::dispatch::DispatchWithDetails,

            // --- Catálogo ---
            models::product::Category,
            models::product::CategoryPayload,
            models::product::Product,
            models::product::ProductPayload,
            models::route::RouteType,
            models::route::Route,
            models::route::RouteDetail,
            models::route::RoutePayload,
            models::route::AvailabilityQuery,
            models::route::Availability,
            models::driver::LicenseType,
            models::driver::Driver,
            models::driver::DriverPayload,

            // --- Usuarios ---
            models::user::Role,
            models::user::User,
            models::user::LoginPayload,
            models::user::CreateUserPayload,
            models::user::UpdateUserPayload,

            // --- Reportes ---
            models::report::ReportFilters,
            models::report::ReportDispatchRow,
            models::report::ProductSummary,
            models::report::RouteSummary,
            models::report::UserSummary,
            models::report::GeneralReport,
            models::report::RouteHeader,
            models::report::RouteReport,
            models::report::UserHeader,
            models::report::UserReport,
        )
    ),
    tags(
        (name = "Despachos", description = "Ciclo diário de saída, recarga e retorno"),
        (name = "Productos", description = "Catálogo de produtos e categorias"),
        (name = "Rutas", description = "Rotas, placas e atribuição de motoristas"),
        (name = "Motoristas", description = "Cadastro de motoristas"),
        (name = "Usuarios", description = "Login e gestão de usuários"),
        (name = "Reportes", description = "Vendas agregadas por produto, rota e usuário")
    )
)]
pub struct ApiDoc;
