// src/handlers/dispatches.rs

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
    models::dispatch::DispatchRequest,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "action")]
pub enum DispatchCommand {
    #[serde(rename = "listar")]
    List,

    #[serde(rename = "listarPorUsuario")]
    ListByUser {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        usuario_id: Option<i32>,
    },

    #[serde(rename = "obtener")]
    Get {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        id: Option<i32>,
    },

    /// Cria o despacho do dia ou registra o próximo checkpoint.
    #[serde(rename = "crear")]
    Record {
        #[serde(default)]
        despacho: Option<DispatchRequest>,
    },

    #[serde(rename = "actualizar")]
    Update,

    #[serde(rename = "eliminar")]
    Delete,
}

impl ActionSet for DispatchCommand {
    const ACTIONS: &'static [&'static str] =
        &["listar", "listarPorUsuario", "obtener", "crear", "actualizar", "eliminar"];
}

// POST /api/despachos
#[utoipa::path(
    post,
    path = "/api/despachos",
    tag = "Despachos",
    request_body = DispatchCommand,
    responses(
        (status = 200, description = "`{ success, mensaje?, despachos | despacho | id }`")
    )
)]
pub async fn handle_dispatches(
    State(app_state): State<AppState>,
    ActionCommand(command): ActionCommand<DispatchCommand>,
) -> Result<ApiResponse, AppError> {
    let service = &app_state.dispatch_service;

    match command {
        DispatchCommand::List => ApiResponse::ok().data("despachos", service.list().await?),

        DispatchCommand::ListByUser { usuario_id } => {
            let despachos = service.list_by_user(usuario_id.unwrap_or_default()).await?;
            ApiResponse::ok().data("despachos", despachos)
        }

        DispatchCommand::Get { id } => {
            ApiResponse::ok().data("despacho", service.get(id.unwrap_or_default()).await?)
        }

        DispatchCommand::Record { despacho } => {
            let request =
                despacho.ok_or_else(|| AppError::invalid("Datos de despacho no proporcionados"))?;
            let outcome = service.record(&request).await?;

            let mensaje = if outcome.created {
                "Despacho creado correctamente"
            } else {
                "Despacho actualizado correctamente"
            };
            Ok(ApiResponse::created(outcome.id, mensaje))
        }

        DispatchCommand::Update => Err(AppError::business(
            "Los despachos se actualizan registrando el siguiente estado con la acción crear",
        )),

        DispatchCommand::Delete => Err(AppError::business(
            "No se permite eliminar despachos por integridad de los datos",
        )),
    }
}
