// src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::{lenient, validation::validate_positive};

// --- CATEGORIAS ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub nombre: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryPayload {
    #[validate(length(min = 1, max = 100, message = "El nombre de la categoría es obligatorio"))]
    #[schema(example = "Gaseosas")]
    pub nombre: String,
}

impl CategoryPayload {
    pub fn normalize(&mut self) {
        self.nombre = self.nombre.trim().to_string();
    }
}

// --- PRODUTOS ---

/// Produto do catálogo com o nome da categoria já resolvido.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Product {
    pub id: i32,
    pub nombre: String,
    pub precio: Decimal,
    pub medida: String,
    pub categoria_id: i32,
    pub categoria_nombre: String,
    pub grupo: Option<String>,
    pub unidades_por_paquete: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 150, message = "El nombre del producto es obligatorio"))]
    #[schema(example = "Coca-Cola 2.5L")]
    pub nombre: String,

    #[validate(custom(function = "validate_positive"))]
    #[schema(value_type = f64, example = 1.75)]
    pub precio: Decimal,

    #[validate(length(min = 1, max = 50, message = "La medida es obligatoria"))]
    #[schema(example = "Fardo")]
    pub medida: String,

    #[serde(deserialize_with = "lenient::id")]
    pub categoria_id: i32,

    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub grupo: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_id")]
    #[validate(range(min = 1, message = "Las unidades por paquete deben ser mayores que cero"))]
    pub unidades_por_paquete: Option<i32>,
}

impl ProductPayload {
    pub fn normalize(&mut self) {
        self.nombre = self.nombre.trim().to_string();
        self.medida = self.medida.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_accepts_form_strings() {
        let payload: ProductPayload = serde_json::from_value(json!({
            "nombre": "Agua 600ml",
            "precio": 0.5,
            "medida": "Unidad",
            "categoria_id": "2",
            "grupo": "",
            "unidades_por_paquete": "24"
        }))
        .unwrap();

        assert_eq!(payload.categoria_id, 2);
        assert_eq!(payload.grupo, None);
        assert_eq!(payload.unidades_por_paquete, Some(24));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn zero_price_fails_validation() {
        let payload: ProductPayload = serde_json::from_value(json!({
            "nombre": "Agua",
            "precio": 0,
            "medida": "Unidad",
            "categoria_id": 1
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("precio"));
    }
}
