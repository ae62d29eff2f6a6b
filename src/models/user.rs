// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

// Usuário como está no banco (com o hash). Nunca sai pela API.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub nombre: String,
    pub dui: String,
    pub telefono: String,
    pub correo: String,
    pub direccion: String,
    pub foto: String,
    pub rol: String,
    pub password: String,
}

impl UserRecord {
    pub fn into_public(self) -> User {
        User {
            id: self.id,
            nombre: self.nombre,
            dui: self.dui,
            telefono: self.telefono,
            correo: self.correo,
            direccion: self.direccion,
            foto: self.foto,
            rol: self.rol,
        }
    }
}

/// Usuário público (sem senha).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub nombre: String,
    pub dui: String,
    pub telefono: String,
    pub correo: String,
    pub direccion: String,
    /// Data URI em base64, ou vazio.
    pub foto: String,
    pub rol: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "El DUI es obligatorio"))]
    pub dui: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(length(min = 1, max = 150, message = "El nombre es obligatorio"))]
    pub nombre: String,

    /// Aceita `012345678` ou `01234567-8`.
    #[schema(example = "01234567-8")]
    pub dui: String,

    #[serde(default)]
    pub telefono: String,

    #[serde(default, deserialize_with = "lenient::opt_text")]
    #[validate(email(message = "El correo no es válido"))]
    pub correo: Option<String>,

    #[serde(default)]
    pub direccion: String,

    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,

    #[serde(default)]
    pub foto: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i32,

    #[validate(length(min = 1, max = 150, message = "El nombre es obligatorio"))]
    pub nombre: String,

    #[serde(default)]
    pub telefono: String,

    #[serde(default, deserialize_with = "lenient::opt_text")]
    #[validate(email(message = "El correo no es válido"))]
    pub correo: Option<String>,

    #[serde(default)]
    pub direccion: String,

    /// Só troca a senha quando vier preenchida.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub password: Option<String>,

    /// Só troca a foto quando vier preenchida.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub foto: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn public_user_never_carries_the_hash() {
        let record = UserRecord {
            id: 5,
            nombre: "Ana".into(),
            dui: "01234567-8".into(),
            telefono: String::new(),
            correo: String::new(),
            direccion: String::new(),
            foto: String::new(),
            rol: "user".into(),
            password: "$2b$12$hash".into(),
        };

        let value = serde_json::to_value(record.into_public()).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["id"], 5);
    }

    #[test]
    fn blank_password_on_update_means_keep() {
        let payload: UpdateUserPayload = serde_json::from_value(json!({
            "id": "5",
            "nombre": "Ana",
            "correo": "",
            "password": "",
            "foto": ""
        }))
        .unwrap();

        assert_eq!(payload.password, None);
        assert_eq!(payload.foto, None);
        assert_eq!(payload.correo, None);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let payload: CreateUserPayload = serde_json::from_value(json!({
            "nombre": "Ana",
            "dui": "012345678",
            "correo": "ana-en-algun-lado",
            "password": "secreta"
        }))
        .unwrap();

        assert!(payload.validate().is_err());
    }
}
