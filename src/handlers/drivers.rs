// src/handlers/drivers.rs

use axum::extract::State;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::{
        command::{ActionCommand, ActionSet},
        error::AppError,
        lenient,
        response::ApiResponse,
    },
    config::AppState,
    models::driver::DriverPayload,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "action")]
pub enum DriverCommand {
    #[serde(rename = "listar")]
    List {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        id: Option<i32>,
    },

    #[serde(rename = "crear")]
    Create {
        #[serde(flatten)]
        motorista: DriverPayload,
    },

    #[serde(rename = "actualizar")]
    Update {
        #[serde(deserialize_with = "lenient::id")]
        id: i32,
        #[serde(flatten)]
        motorista: DriverPayload,
    },

    #[serde(rename = "eliminar")]
    Delete {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        id: Option<i32>,
    },
}

impl ActionSet for DriverCommand {
    const ACTIONS: &'static [&'static str] = &["listar", "crear", "actualizar", "eliminar"];
}

// POST /api/motoristas
#[utoipa::path(
    post,
    path = "/api/motoristas",
    tag = "Motoristas",
    request_body = DriverCommand,
    responses(
        (status = 200, description = "`{ success, mensaje?, motoristas | motorista | id }`")
    )
)]
pub async fn handle_drivers(
    State(app_state): State<AppState>,
    ActionCommand(command): ActionCommand<DriverCommand>,
) -> Result<ApiResponse, AppError> {
    let service = &app_state.driver_service;

    match command {
        DriverCommand::List { id: Some(id) } => ApiResponse::ok().data("motorista", service.get(id).await?),
        DriverCommand::List { id: None } => ApiResponse::ok().data("motoristas", service.list().await?),

        DriverCommand::Create { motorista } => {
            let id = service.create(motorista).await?;
            Ok(ApiResponse::created(id, "Motorista creado correctamente"))
        }

        DriverCommand::Update { id, motorista } => {
            service.update(id, motorista).await?;
            Ok(ApiResponse::ok().message("Motorista actualizado correctamente"))
        }

        DriverCommand::Delete { id } => {
            service.delete(id.unwrap_or_default()).await?;
            Ok(ApiResponse::ok().message("Motorista eliminado correctamente"))
        }
    }
}
