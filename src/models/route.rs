// src/models/route.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::{
    lenient,
    validation::{normalize_plate, validate_plate},
};

/// Grupo comercial da rota. No banco é TEXT com CHECK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RouteType {
    #[serde(rename = "GRUPO AJE")]
    GrupoAje,
    #[serde(rename = "LA CONSTANCIA")]
    LaConstancia,
    #[serde(rename = "PRODUCTOS VARIOS")]
    ProductosVarios,
}

impl RouteType {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteType::GrupoAje => "GRUPO AJE",
            RouteType::LaConstancia => "LA CONSTANCIA",
            RouteType::ProductosVarios => "PRODUCTOS VARIOS",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        [RouteType::GrupoAje, RouteType::LaConstancia, RouteType::ProductosVarios]
            .into_iter()
            .find(|tipo| tipo.as_str() == raw)
    }
}

/// Linha da listagem: rota + nome do motorista.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Route {
    pub id: i32,
    pub nombre: String,
    pub tipo: String,
    pub placa_vehiculo: Option<String>,
    pub motorista_id: Option<i32>,
    pub motorista_nombre: Option<String>,
}

/// Rota com os dados completos do motorista (consulta por id).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RouteDetail {
    pub id: i32,
    pub nombre: String,
    pub tipo: String,
    pub placa_vehiculo: Option<String>,
    pub motorista_id: Option<i32>,
    pub motorista_nombre: Option<String>,
    pub motorista_dui: Option<String>,
    pub numero_licencia: Option<String>,
    pub tipo_licencia: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RoutePayload {
    #[validate(length(min = 1, max = 150, message = "El nombre de la ruta es obligatorio"))]
    #[schema(example = "Ruta Centro")]
    pub nombre: String,

    pub tipo: RouteType,

    #[serde(default, deserialize_with = "lenient::opt_text")]
    #[validate(custom(function = "validate_plate"))]
    #[schema(example = "P123-456")]
    pub placa_vehiculo: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub motorista_id: Option<i32>,
}

impl RoutePayload {
    pub fn normalize(&mut self) {
        self.nombre = self.nombre.trim().to_string();
        self.placa_vehiculo = self.placa_vehiculo.as_deref().map(normalize_plate);
    }
}

/// Parâmetros de `verificarDisponibilidad`. `ruta_id` exclui a própria rota
/// quando o formulário está em modo edição.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AvailabilityQuery {
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub motorista_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub placa_vehiculo: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub ruta_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Availability {
    pub motorista: bool,
    pub placa: bool,
}

/// Resultado completo: flags + nome da rota que já usa o recurso.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityCheck {
    pub driver_route: Option<String>,
    pub plate_route: Option<String>,
}

impl AvailabilityCheck {
    pub fn flags(&self) -> Availability {
        Availability {
            motorista: self.driver_route.is_none(),
            placa: self.plate_route.is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn route_type_uses_display_names() {
        let tipo: RouteType = serde_json::from_value(json!("LA CONSTANCIA")).unwrap();
        assert_eq!(tipo, RouteType::LaConstancia);
        assert!(serde_json::from_value::<RouteType>(json!("OTRA")).is_err());
    }

    #[test]
    fn route_type_parses_from_filter_text() {
        assert_eq!(RouteType::parse(" PRODUCTOS VARIOS "), Some(RouteType::ProductosVarios));
        assert_eq!(RouteType::parse("grupo aje"), None);
    }

    #[test]
    fn plate_is_upper_cased_before_validation() {
        let mut payload: RoutePayload = serde_json::from_value(json!({
            "nombre": "Ruta Norte",
            "tipo": "GRUPO AJE",
            "placa_vehiculo": " p123-456 ",
            "motorista_id": ""
        }))
        .unwrap();

        payload.normalize();
        assert_eq!(payload.placa_vehiculo.as_deref(), Some("P123-456"));
        assert_eq!(payload.motorista_id, None);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn bad_plate_fails_validation() {
        let mut payload: RoutePayload = serde_json::from_value(json!({
            "nombre": "Ruta Norte",
            "tipo": "GRUPO AJE",
            "placa_vehiculo": "123"
        }))
        .unwrap();

        payload.normalize();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn availability_flags_follow_conflicts() {
        let check = AvailabilityCheck { driver_route: Some("Ruta Sur".into()), plate_route: None };
        let flags = check.flags();
        assert!(!flags.motorista);
        assert!(flags.placa);
    }
}
