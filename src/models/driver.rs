// src/models/driver.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::{normalize_dui, DUI_RE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    Liviana,
    Pesada,
    Particular,
}

impl LicenseType {
    pub fn as_str(self) -> &'static str {
        match self {
            LicenseType::Liviana => "liviana",
            LicenseType::Pesada => "pesada",
            LicenseType::Particular => "particular",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Driver {
    pub id: i32,
    pub nombre: String,
    pub dui: String,
    pub numero_licencia: String,
    pub tipo_licencia: String,
    /// Rota atribuída, se houver.
    pub ruta_nombre: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DriverPayload {
    #[validate(length(min = 1, max = 150, message = "El nombre del motorista es obligatorio"))]
    #[schema(example = "Carlos Martínez")]
    pub nombre: String,

    #[validate(regex(path = *DUI_RE, message = "Formato de DUI inválido. Debe contener 8 dígitos, un guion y 1 dígito"))]
    #[schema(example = "01234567-8")]
    pub dui: String,

    #[validate(length(min = 1, max = 50, message = "El número de licencia es obligatorio"))]
    pub numero_licencia: String,

    pub tipo_licencia: LicenseType,
}

impl DriverPayload {
    pub fn normalize(&mut self) {
        self.nombre = self.nombre.trim().to_string();
        self.numero_licencia = self.numero_licencia.trim().to_string();
        if let Some(dui) = normalize_dui(&self.dui) {
            self.dui = dui;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dui_without_dash_is_normalized_before_validation() {
        let mut payload: DriverPayload = serde_json::from_value(json!({
            "nombre": " Carlos ",
            "dui": "012345678",
            "numero_licencia": "0101-123456-101-1",
            "tipo_licencia": "pesada"
        }))
        .unwrap();

        payload.normalize();
        assert_eq!(payload.dui, "01234567-8");
        assert_eq!(payload.nombre, "Carlos");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn unknown_license_type_is_rejected() {
        let result = serde_json::from_value::<DriverPayload>(json!({
            "nombre": "Carlos",
            "dui": "01234567-8",
            "numero_licencia": "1",
            "tipo_licencia": "moto"
        }));
        assert!(result.is_err());
    }
}
