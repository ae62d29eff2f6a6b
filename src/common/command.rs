// src/common/command.rs

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::common::error::AppError;

/// Conjunto de ações aceitas por um recurso (o campo `action` do corpo).
pub trait ActionSet: DeserializeOwned {
    const ACTIONS: &'static [&'static str];
}

/// Extrator que lê `{ "action": ..., ...params }` e devolve o comando tipado.
///
/// Ação desconhecida vira `AppError::InvalidAction`; parâmetros malformados
/// viram `AppError::InvalidInput`. Nunca rejeita com o texto puro do axum.
pub struct ActionCommand<T>(pub T);

impl<S, T> FromRequest<S> for ActionCommand<T>
where
    S: Send + Sync,
    T: ActionSet,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::invalid(format!("Solicitud inválida: {}", rejection.body_text()))
            })?;

        parse_command(value).map(ActionCommand)
    }
}

pub(crate) fn parse_command<T: ActionSet>(value: Value) -> Result<T, AppError> {
    let action = value.get("action").and_then(Value::as_str).unwrap_or_default();

    if !T::ACTIONS.contains(&action) {
        return Err(AppError::InvalidAction);
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::invalid(format!("Datos incompletos o inválidos: {}", e)))
}
