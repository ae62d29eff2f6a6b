use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::common::error::AppError;

/// Envelope de sucesso: `{ "success": true, "mensaje"?: ..., <chave>: ... }`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    body: Map<String, Value>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(true));
        Self { body }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.body.insert("mensaje".to_string(), Value::String(message.into()));
        self
    }

    pub fn data<T: Serialize>(mut self, key: &str, value: T) -> Result<Self, AppError> {
        let value = serde_json::to_value(value).map_err(anyhow::Error::from)?;
        self.body.insert(key.to_string(), value);
        Ok(self)
    }

    /// Resposta padrão de criação: id gerado + mensagem.
    pub fn created(id: i32, message: impl Into<String>) -> Self {
        let mut response = Self::ok().message(message);
        response.body.insert("id".to_string(), Value::from(id));
        response
    }

    #[cfg(test)]
    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        Json(Value::Object(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn created_carries_id_and_message() {
        let value = ApiResponse::created(7, "Ruta creada correctamente").into_value();
        assert_eq!(
            value,
            json!({ "success": true, "mensaje": "Ruta creada correctamente", "id": 7 })
        );
    }

    #[test]
    fn data_is_nested_under_key() {
        let value = ApiResponse::ok()
            .data("categorias", vec!["GRUPO AJE"])
            .unwrap()
            .into_value();
        assert_eq!(value["success"], true);
        assert_eq!(value["categorias"][0], "GRUPO AJE");
        assert!(value.get("mensaje").is_none());
    }
}
