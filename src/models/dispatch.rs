// src/models/dispatch.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::lenient;

// --- Enums ---

/// Estado do despacho. A ordem das variantes é a ordem do dia.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "estado_despacho", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    SalidaManana,
    RecargaMediodia,
    RetornoTarde,
    Completado,
}

/// Coluna de quantidade que cada checkpoint preenche.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityField {
    Salida,
    Recarga,
    Retorno,
}

impl QuantityField {
    pub fn column(self) -> &'static str {
        match self {
            QuantityField::Salida => "salida_manana",
            QuantityField::Recarga => "recarga_mediodia",
            QuantityField::Retorno => "retorno_tarde",
        }
    }
}

impl DispatchState {
    pub const INITIAL: DispatchState = DispatchState::SalidaManana;
    pub const TERMINAL: DispatchState = DispatchState::Completado;

    pub fn as_str(self) -> &'static str {
        match self {
            DispatchState::SalidaManana => "salida_manana",
            DispatchState::RecargaMediodia => "recarga_mediodia",
            DispatchState::RetornoTarde => "retorno_tarde",
            DispatchState::Completado => "completado",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DispatchState::SalidaManana => "Salida Mañana",
            DispatchState::RecargaMediodia => "Recarga Mediodía",
            DispatchState::RetornoTarde => "Retorno Tarde",
            DispatchState::Completado => "Completado",
        }
    }

    /// Tabela de transições permitidas. A recarga do meio-dia é opcional, mas
    /// não se fecha um despacho sem registrar o retorno.
    ///
    /// Registrar o retorno já fecha o despacho na mesma transação, então
    /// nenhum despacho fica parado em `retorno_tarde` e `completado` nunca é
    /// um alvo pedido pelo cliente.
    pub fn allowed_targets(self) -> &'static [DispatchState] {
        match self {
            DispatchState::SalidaManana => &[DispatchState::RecargaMediodia, DispatchState::RetornoTarde],
            DispatchState::RecargaMediodia => &[DispatchState::RetornoTarde],
            DispatchState::RetornoTarde => &[],
            DispatchState::Completado => &[],
        }
    }

    pub fn can_transition_to(self, next: DispatchState) -> bool {
        self.allowed_targets().contains(&next)
    }

    pub fn quantity_field(self) -> Option<QuantityField> {
        match self {
            DispatchState::SalidaManana => Some(QuantityField::Salida),
            DispatchState::RecargaMediodia => Some(QuantityField::Recarga),
            DispatchState::RetornoTarde => Some(QuantityField::Retorno),
            DispatchState::Completado => None,
        }
    }
}

impl Default for DispatchState {
    fn default() -> Self {
        DispatchState::INITIAL
    }
}

impl std::fmt::Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Linhas do banco ---

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Dispatch {
    pub id: i32,
    pub fecha: NaiveDate,
    pub ruta_id: i32,
    pub usuario_id: i32,
    pub estado: DispatchState,
}

/// Linha da listagem de despachos (com nomes e totais agregados).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DispatchSummary {
    pub id: i32,
    pub fecha: NaiveDate,
    pub estado: DispatchState,
    pub usuario_id: i32,
    pub usuario_nombre: String,
    pub ruta_id: i32,
    pub ruta_nombre: String,
    pub ruta_tipo: String,
    pub total_productos: i64,
    pub valor_total: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DispatchHeader {
    pub id: i32,
    pub fecha: NaiveDate,
    pub estado: DispatchState,
    pub usuario_id: i32,
    pub usuario_nombre: String,
    pub ruta_id: i32,
    pub ruta_nombre: String,
    pub ruta_tipo: String,
}

/// Detalhe de um produto dentro do despacho, já com os nomes do catálogo.
/// `total_vendido` e `valor_venta` são colunas geradas pelo banco.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DispatchDetail {
    pub id: i32,
    pub despacho_id: i32,
    pub producto_id: i32,
    pub producto_nombre: String,
    pub medida: String,
    pub categoria_id: i32,
    pub categoria_nombre: String,
    pub precio_unitario: Decimal,
    pub salida_manana: i32,
    pub recarga_mediodia: i32,
    pub retorno_tarde: i32,
    pub total_vendido: i32,
    pub valor_venta: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DispatchWithDetails {
    #[serde(flatten)]
    pub header: DispatchHeader,
    pub detalles: Vec<DispatchDetail>,
}

/// Só as quantidades de um detalhe, para a máquina de estados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct DetailQuantities {
    pub id: i32,
    pub salida_manana: i32,
    pub recarga_mediodia: i32,
    pub retorno_tarde: i32,
}

impl DetailQuantities {
    /// Saída mais recarga, em `i64` para não estourar com valores extremos.
    pub fn dispatched(&self) -> i64 {
        i64::from(self.salida_manana) + i64::from(self.recarga_mediodia)
    }
}

#[cfg(test)]
impl DetailQuantities {
    pub fn total_sold(&self) -> i64 {
        self.dispatched() - i64::from(self.retorno_tarde)
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProductQuantities {
    #[serde(deserialize_with = "lenient::id")]
    pub producto_id: i32,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub salida_manana: i32,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub recarga_mediodia: i32,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub retorno_tarde: i32,
}

impl ProductQuantities {
    pub fn value_for(&self, field: QuantityField) -> i32 {
        match field {
            QuantityField::Salida => self.salida_manana,
            QuantityField::Recarga => self.recarga_mediodia,
            QuantityField::Retorno => self.retorno_tarde,
        }
    }
}

/// Registro de um checkpoint: cria o despacho do dia ou o avança.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DispatchRequest {
    #[serde(default, deserialize_with = "lenient::opt_date")]
    #[schema(value_type = String, example = "2024-01-10")]
    pub fecha: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub ruta_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub usuario_id: Option<i32>,
    #[serde(default)]
    pub estado: DispatchState,
    #[serde(default)]
    pub productos: Vec<ProductQuantities>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub id: i32,
    pub created: bool,
    pub estado: DispatchState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use DispatchState::*;

    #[test]
    fn states_are_totally_ordered() {
        assert!(SalidaManana < RecargaMediodia);
        assert!(RecargaMediodia < RetornoTarde);
        assert!(RetornoTarde < Completado);
        assert_eq!(DispatchState::TERMINAL, Completado);
    }

    #[rstest]
    #[case(SalidaManana, RecargaMediodia, true)]
    #[case(SalidaManana, RetornoTarde, true)]
    #[case(SalidaManana, Completado, false)]
    #[case(RecargaMediodia, RetornoTarde, true)]
    #[case(RecargaMediodia, RecargaMediodia, false)]
    #[case(RecargaMediodia, Completado, false)]
    #[case(RetornoTarde, Completado, false)]
    #[case(RetornoTarde, SalidaManana, false)]
    #[case(Completado, Completado, false)]
    fn transition_table(#[case] from: DispatchState, #[case] to: DispatchState, #[case] allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn every_allowed_transition_moves_forward() {
        for from in [SalidaManana, RecargaMediodia, RetornoTarde, Completado] {
            for to in from.allowed_targets() {
                assert!(*to > from, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn state_wire_names_match_database_labels() {
        assert_eq!(serde_json::to_value(RecargaMediodia).unwrap(), "recarga_mediodia");
        let parsed: DispatchState = serde_json::from_str("\"retorno_tarde\"").unwrap();
        assert_eq!(parsed, RetornoTarde);
    }

    #[test]
    fn total_sold_is_out_plus_reload_minus_return() {
        let q = DetailQuantities { id: 1, salida_manana: 10, recarga_mediodia: 3, retorno_tarde: 2 };
        assert_eq!(q.total_sold(), 11);
        assert_eq!(q.dispatched(), 13);
    }

    #[test]
    fn closed_states_accept_no_target() {
        assert!(RetornoTarde.allowed_targets().is_empty());
        assert!(Completado.allowed_targets().is_empty());
    }

    #[test]
    fn dispatched_does_not_overflow_on_extreme_quantities() {
        let q = DetailQuantities { id: 1, salida_manana: i32::MAX, recarga_mediodia: i32::MAX, retorno_tarde: 0 };
        assert_eq!(q.dispatched(), 2 * i64::from(i32::MAX));
        assert_eq!(q.total_sold(), 2 * i64::from(i32::MAX));
    }
}
