use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// O front-end só olha para `success` e `mensaje`, então todo erro sai com 200.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Acción no válida")]
    InvalidAction,

    #[error("{0}")]
    NotFound(String),

    // Regressão de estado, duplicados, exclusão de registro referenciado
    #[error("{0}")]
    BusinessRule(String),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro ao gerar PDF: {0}")]
    PdfError(String),
}

impl AppError {
    pub fn business(message: impl Into<String>) -> Self {
        AppError::BusinessRule(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    /// Mensagem exibida ao usuário. Falhas internas não vazam detalhes.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(errors) => {
                let mut messages: Vec<String> = errors
                    .field_errors()
                    .into_iter()
                    .flat_map(|(field, field_errors)| {
                        field_errors.iter().map(move |e| match &e.message {
                            Some(m) => m.to_string(),
                            None => format!("Campo '{}' inválido", field),
                        })
                    })
                    .collect();
                messages.sort();
                messages.join(". ")
            }
            AppError::DatabaseError(_) | AppError::InternalServerError(_) | AppError::BcryptError(_) => {
                "Error en la operación, intente nuevamente".to_string()
            }
            AppError::PdfError(_) => "No se pudo generar el documento".to_string(),
            other => other.to_string(),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(_)
                | AppError::InternalServerError(_)
                | AppError::BcryptError(_)
                | AppError::PdfError(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        } else {
            tracing::warn!(mensaje = %self.public_message(), "requisição rejeitada");
        }

        let body = match &self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "success": false,
                    "mensaje": self.public_message(),
                    "errores": details,
                })
            }
            _ => json!({ "success": false, "mensaje": self.public_message() }),
        };

        (StatusCode::OK, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;
    use validator::{ValidationError, ValidationErrors};

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn business_rule_renders_success_false_with_message() {
        let (status, body) = body_of(AppError::business("No se puede cambiar el estado")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["mensaje"], "No se puede cambiar el estado");
    }

    #[tokio::test]
    async fn database_errors_are_not_leaked() {
        let (_, body) = body_of(AppError::DatabaseError(sqlx::Error::RowNotFound)).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["mensaje"], "Error en la operación, intente nuevamente");
    }

    #[tokio::test]
    async fn validation_errors_list_every_field() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("regex");
        err.message = Some("Formato de DUI inválido".into());
        errors.add("dui", err);

        let (_, body) = body_of(AppError::ValidationError(errors)).await;
        assert_eq!(body["mensaje"], "Formato de DUI inválido");
        assert_eq!(body["errores"]["dui"][0], "Formato de DUI inválido");
    }

    #[tokio::test]
    async fn invalid_action_has_fixed_message() {
        let (_, body) = body_of(AppError::InvalidAction).await;
        assert_eq!(body["mensaje"], "Acción no válida");
    }
}
