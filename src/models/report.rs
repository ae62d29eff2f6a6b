// src/models/report.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::{common::lenient, models::dispatch::DispatchState};

// 1. Filtros (todos opcionais; vazio = sem filtro)
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReportFilters {
    #[serde(rename = "fechaInicio", default, deserialize_with = "lenient::opt_date")]
    #[schema(value_type = Option<String>)]
    pub fecha_inicio: Option<NaiveDate>,
    #[serde(rename = "fechaFin", default, deserialize_with = "lenient::opt_date")]
    #[schema(value_type = Option<String>)]
    pub fecha_fin: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub ruta_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub usuario_id: Option<i32>,
}

// 2. Linhas vindas do banco
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReportDispatchRow {
    pub id: i32,
    pub fecha: NaiveDate,
    pub estado: DispatchState,
    pub usuario_id: i32,
    pub usuario_nombre: String,
    pub ruta_id: i32,
    pub ruta_nombre: String,
    pub ruta_tipo: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReportDetailRow {
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
    pub ruta_id: i32,
}

// 3. Resumos
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i32,
    pub nombre: String,
    pub medida: String,
    pub categoria: String,
    #[serde(rename = "categoria_id")]
    pub categoria_id: i32,
    pub total_vendido: i64,
    pub total_retornado: i64,
    pub valor_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub id: i32,
    pub nombre: String,
    pub tipo: String,
    pub despachos: i64,
    pub total_vendido: i64,
    pub total_dinero: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i32,
    pub nombre: String,
    pub despachos: i64,
    pub total_vendido: i64,
    pub total_dinero: Decimal,
}

// 4. Relatórios
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneralReport {
    pub filtros: ReportFilters,
    pub total_despachos: i64,
    pub total_vendido: i64,
    pub total_dinero: Decimal,
    pub productos: Vec<ProductSummary>,
    pub rutas: Vec<RouteSummary>,
    pub usuarios: Vec<UserSummary>,
    pub despachos: Vec<ReportDispatchRow>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteHeader {
    pub id: i32,
    pub nombre: String,
    pub tipo: String,
    pub total_despachos: i64,
    pub total_vendido: i64,
    pub total_dinero: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RouteReport {
    pub filtros: ReportFilters,
    pub ruta: RouteHeader,
    pub productos: Vec<ProductSummary>,
    pub despachos: Vec<ReportDispatchRow>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserHeader {
    pub id: i32,
    pub nombre: String,
    pub total_despachos: i64,
    pub total_vendido: i64,
    pub total_dinero: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserReport {
    pub filtros: ReportFilters,
    pub usuario: UserHeader,
    pub rutas: Vec<RouteSummary>,
    pub despachos: Vec<ReportDispatchRow>,
}
