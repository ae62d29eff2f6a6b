// src/handlers/routes.rs

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
    models::route::{AvailabilityCheck, AvailabilityQuery, RoutePayload, RouteType},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "action")]
pub enum RouteCommand {
    #[serde(rename = "listar")]
    List {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        id: Option<i32>,
    },

    /// `tipo` chega como texto livre; valores fora dos três grupos são rejeitados no handler.
    #[serde(rename = "listarPorTipo")]
    ListByType {
        #[serde(default)]
        tipo: String,
    },

    #[serde(rename = "crear")]
    Create {
        #[serde(flatten)]
        ruta: RoutePayload,
    },

    #[serde(rename = "actualizar")]
    Update {
        #[serde(deserialize_with = "lenient::id")]
        id: i32,
        #[serde(flatten)]
        ruta: RoutePayload,
    },

    #[serde(rename = "eliminar")]
    Delete {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        id: Option<i32>,
    },

    #[serde(rename = "verificarDisponibilidad")]
    CheckAvailability {
        #[serde(flatten)]
        consulta: AvailabilityQuery,
    },
}

impl ActionSet for RouteCommand {
    const ACTIONS: &'static [&'static str] = &[
        "listar",
        "listarPorTipo",
        "crear",
        "actualizar",
        "eliminar",
        "verificarDisponibilidad",
    ];
}

// POST /api/rutas
#[utoipa::path(
    post,
    path = "/api/rutas",
    tag = "Rutas",
    request_body = RouteCommand,
    responses(
        (status = 200, description = "`{ success, mensaje?, rutas | ruta | id | disponibilidad }`")
    )
)]
pub async fn handle_routes(
    State(app_state): State<AppState>,
    ActionCommand(command): ActionCommand<RouteCommand>,
) -> Result<ApiResponse, AppError> {
    let service = &app_state.route_service;

    match command {
        RouteCommand::List { id: Some(id) } => ApiResponse::ok().data("ruta", service.get(id).await?),
        RouteCommand::List { id: None } => ApiResponse::ok().data("rutas", service.list().await?),

        RouteCommand::ListByType { tipo } => {
            let tipo = RouteType::parse(&tipo).ok_or_else(|| AppError::invalid("Tipo de ruta inválido"))?;
            ApiResponse::ok().data("rutas", service.list_by_type(tipo).await?)
        }

        RouteCommand::Create { ruta } => {
            let id = service.create(ruta).await?;
            Ok(ApiResponse::created(id, "Ruta creada correctamente"))
        }

        RouteCommand::Update { id, ruta } => {
            service.update(id, ruta).await?;
            Ok(ApiResponse::ok().message("Ruta actualizada correctamente"))
        }

        RouteCommand::Delete { id } => {
            service.delete(id.unwrap_or_default()).await?;
            Ok(ApiResponse::ok().message("Ruta eliminada correctamente"))
        }

        RouteCommand::CheckAvailability { consulta } => {
            availability_response(service.availability(consulta).await?)
        }
    }
}

/// `disponibilidad` sempre; o nome da rota em conflito só quando existe.
fn availability_response(check: AvailabilityCheck) -> Result<ApiResponse, AppError> {
    let mut response = ApiResponse::ok().data("disponibilidad", check.flags())?;
    if let Some(nombre) = check.driver_route {
        response = response.data("rutaMotorista", nombre)?;
    }
    if let Some(nombre) = check.plate_route {
        response = response.data("rutaPlaca", nombre)?;
    }
    Ok(response)
}
