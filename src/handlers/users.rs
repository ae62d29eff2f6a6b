// src/handlers/users.rs

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
    models::user::{CreateUserPayload, LoginPayload, UpdateUserPayload},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "action")]
pub enum UserCommand {
    #[serde(rename = "login")]
    Login {
        #[serde(flatten)]
        credenciales: LoginPayload,
    },

    /// Lista só usuários comuns; o administrador não aparece.
    #[serde(rename = "listar")]
    List {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        id: Option<i32>,
    },

    #[serde(rename = "crear")]
    Create {
        #[serde(flatten)]
        usuario: CreateUserPayload,
    },

    #[serde(rename = "actualizar")]
    Update {
        #[serde(flatten)]
        usuario: UpdateUserPayload,
    },

    #[serde(rename = "eliminar")]
    Delete {
        #[serde(default, deserialize_with = "lenient::opt_id")]
        id: Option<i32>,
    },
}

impl ActionSet for UserCommand {
    const ACTIONS: &'static [&'static str] = &["login", "listar", "crear", "actualizar", "eliminar"];
}

// POST /api/usuarios
#[utoipa::path(
    post,
    path = "/api/usuarios",
    tag = "Usuarios",
    request_body = UserCommand,
    responses(
        (status = 200, description = "`{ success, mensaje?, usuarios | usuario | id }`")
    )
)]
pub async fn handle_users(
    State(app_state): State<AppState>,
    ActionCommand(command): ActionCommand<UserCommand>,
) -> Result<ApiResponse, AppError> {
    match command {
        UserCommand::Login { credenciales } => {
            let usuario = app_state.auth_service.login(credenciales).await?;
            ApiResponse::ok().data("usuario", usuario)
        }

        UserCommand::List { id: Some(id) } => {
            ApiResponse::ok().data("usuario", app_state.user_service.get(id).await?)
        }
        UserCommand::List { id: None } => {
            ApiResponse::ok().data("usuarios", app_state.user_service.list().await?)
        }

        UserCommand::Create { usuario } => {
            let id = app_state.user_service.create(usuario).await?;
            Ok(ApiResponse::created(id, "Usuario creado correctamente"))
        }

        UserCommand::Update { usuario } => {
            app_state.user_service.update(usuario).await?;
            Ok(ApiResponse::ok().message("Usuario actualizado correctamente"))
        }

        UserCommand::Delete { id } => {
            app_state.user_service.delete(id.unwrap_or_default()).await?;
            Ok(ApiResponse::ok().message("Usuario eliminado correctamente"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::parse_command;
    use serde_json::json;

    #[test]
    fn login_reads_credentials_from_the_body() {
        let command: UserCommand =
            parse_command(json!({ "action": "login", "dui": "01234567-8", "password": "secreta" })).unwrap();

        let UserCommand::Login { credenciales } = command else {
            panic!("esperava login");
        };
        assert_eq!(credenciales.dui, "01234567-8");
        assert_eq!(credenciales.password, "secreta");
    }

    #[test]
    fn update_with_blank_password_keeps_the_current_one() {
        let command: UserCommand = parse_command(json!({
            "action": "actualizar",
            "id": "9",
            "nombre": "Ana López",
            "telefono": "7777-0000",
            "correo": "",
            "direccion": "San Salvador",
            "password": "",
            "foto": ""
        }))
        .unwrap();

        let UserCommand::Update { usuario } = command else {
            panic!("esperava actualizar");
        };
        assert_eq!(usuario.id, 9);
        assert_eq!(usuario.password, None);
        assert_eq!(usuario.correo, None);
    }
}
