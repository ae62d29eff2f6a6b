// src/handlers/reports.rs

use axum::extract::State;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::{
        command::{ActionCommand, ActionSet},
        error::AppError,
        response::ApiResponse,
    },
    config::AppState,
    models::report::ReportFilters,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "action")]
pub enum ReportCommand {
    #[serde(rename = "general")]
    General {
        #[serde(flatten)]
        filtros: ReportFilters,
    },

    #[serde(rename = "porRuta")]
    ByRoute {
        #[serde(flatten)]
        filtros: ReportFilters,
    },

    #[serde(rename = "porUsuario")]
    ByUser {
        #[serde(flatten)]
        filtros: ReportFilters,
    },
}

impl ActionSet for ReportCommand {
    const ACTIONS: &'static [&'static str] = &["general", "porRuta", "porUsuario"];
}

// POST /api/reportes
#[utoipa::path(
    post,
    path = "/api/reportes",
    tag = "Reportes",
    request_body = ReportCommand,
    responses(
        (status = 200, description = "`{ success, mensaje?, reporte }`")
    )
)]
pub async fn handle_reports(
    State(app_state): State<AppState>,
    ActionCommand(command): ActionCommand<ReportCommand>,
) -> Result<ApiResponse, AppError> {
    let service = &app_state.report_service;

    match command {
        ReportCommand::General { filtros } => ApiResponse::ok().data("reporte", service.general(filtros).await?),
        ReportCommand::ByRoute { filtros } => ApiResponse::ok().data("reporte", service.by_route(filtros).await?),
        ReportCommand::ByUser { filtros } => ApiResponse::ok().data("reporte", service.by_user(filtros).await?),
    }
}
