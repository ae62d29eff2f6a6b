// src/services/report_service.rs

use std::collections::HashMap;

use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{report_repo::DetailOrder, ReportRepository},
    models::report::{
        GeneralReport, ProductSummary, ReportDetailRow, ReportDispatchRow, ReportFilters, RouteHeader,
        RouteReport, RouteSummary, UserHeader, UserReport, UserSummary,
    },
};

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
}

impl ReportService {
    pub fn new(repo: ReportRepository) -> Self {
        Self { repo }
    }

    pub async fn general(&self, filters: ReportFilters) -> Result<GeneralReport, AppError> {
        let dispatches = self.repo.list_dispatches(&filters).await?;
        if dispatches.is_empty() {
            return Err(AppError::not_found(
                "No hay despachos que cumplan con los criterios de búsqueda",
            ));
        }
        let details = self.repo.list_details(&dispatch_ids(&dispatches), DetailOrder::Category).await?;
        Ok(build_general(filters, dispatches, &details))
    }

    pub async fn by_route(&self, filters: ReportFilters) -> Result<RouteReport, AppError> {
        if filters.ruta_id.is_none_or(|id| id <= 0) {
            return Err(AppError::invalid("ID de ruta inválido"));
        }
        let filters = ReportFilters { usuario_id: None, ..filters };

        let dispatches = self.repo.list_dispatches(&filters).await?;
        if dispatches.is_empty() {
            return Err(AppError::not_found(
                "No hay despachos para esta ruta en el período seleccionado",
            ));
        }
        let details = self.repo.list_details(&dispatch_ids(&dispatches), DetailOrder::Category).await?;
        build_route_report(filters, dispatches, &details)
    }

    pub async fn by_user(&self, filters: ReportFilters) -> Result<UserReport, AppError> {
        if filters.usuario_id.is_none_or(|id| id <= 0) {
            return Err(AppError::invalid("ID de usuario inválido"));
        }
        let filters = ReportFilters { ruta_id: None, ..filters };

        let dispatches = self.repo.list_dispatches(&filters).await?;
        if dispatches.is_empty() {
            return Err(AppError::not_found(
                "No hay despachos para este usuario en el período seleccionado",
            ));
        }
        let details = self
            .repo
            .list_details(&dispatch_ids(&dispatches), DetailOrder::DateThenCategory)
            .await?;
        build_user_report(filters, dispatches, &details)
    }
}

fn dispatch_ids(dispatches: &[ReportDispatchRow]) -> Vec<i32> {
    dispatches.iter().map(|d| d.id).collect()
}

// ---
// Agregação em memória (funções puras sobre as linhas)
// ---

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Totals {
    sold: i64,
    money: Decimal,
}

impl Totals {
    fn add(&mut self, detail: &ReportDetailRow) {
        self.sold += i64::from(detail.total_vendido);
        self.money += detail.valor_venta;
    }
}

fn totals_by_dispatch(details: &[ReportDetailRow]) -> HashMap<i32, Totals> {
    let mut map: HashMap<i32, Totals> = HashMap::new();
    for detail in details {
        map.entry(detail.despacho_id).or_default().add(detail);
    }
    map
}

/// Detalhes agrupados por despacho; os grupos seguem a primeira linha de cada um.
fn group_by_dispatch(details: &[ReportDetailRow]) -> IndexMap<i32, Vec<&ReportDetailRow>> {
    let mut groups: IndexMap<i32, Vec<&ReportDetailRow>> = IndexMap::new();
    for detail in details {
        groups.entry(detail.despacho_id).or_default().push(detail);
    }
    groups
}

/// Resumo por produto, percorrendo os detalhes despacho a despacho, mais o total geral.
fn summarize_products(details: &[ReportDetailRow]) -> (Vec<ProductSummary>, Totals) {
    let mut products: IndexMap<i32, ProductSummary> = IndexMap::new();
    let mut grand = Totals::default();

    for detail in group_by_dispatch(details).into_values().flatten() {
        let entry = products.entry(detail.producto_id).or_insert_with(|| ProductSummary {
            id: detail.producto_id,
            nombre: detail.producto_nombre.clone(),
            medida: detail.medida.clone(),
            categoria: detail.categoria_nombre.clone(),
            categoria_id: detail.categoria_id,
            total_vendido: 0,
            total_retornado: 0,
            valor_total: Decimal::ZERO,
        });
        entry.total_vendido += i64::from(detail.total_vendido);
        entry.total_retornado += i64::from(detail.retorno_tarde);
        entry.valor_total += detail.valor_venta;
        grand.add(detail);
    }

    (products.into_values().collect(), grand)
}

/// Um resumo por rota; todo despacho conta, mesmo sem detalhes.
fn summarize_routes(dispatches: &[ReportDispatchRow], per_dispatch: &HashMap<i32, Totals>) -> Vec<RouteSummary> {
    let mut routes: IndexMap<i32, RouteSummary> = IndexMap::new();
    for d in dispatches {
        let entry = routes.entry(d.ruta_id).or_insert_with(|| RouteSummary {
            id: d.ruta_id,
            nombre: d.ruta_nombre.clone(),
            tipo: d.ruta_tipo.clone(),
            despachos: 0,
            total_vendido: 0,
            total_dinero: Decimal::ZERO,
        });
        entry.despachos += 1;
        if let Some(t) = per_dispatch.get(&d.id) {
            entry.total_vendido += t.sold;
            entry.total_dinero += t.money;
        }
    }
    routes.into_values().collect()
}

fn summarize_users(dispatches: &[ReportDispatchRow], per_dispatch: &HashMap<i32, Totals>) -> Vec<UserSummary> {
    let mut users: IndexMap<i32, UserSummary> = IndexMap::new();
    for d in dispatches {
        let entry = users.entry(d.usuario_id).or_insert_with(|| UserSummary {
            id: d.usuario_id,
            nombre: d.usuario_nombre.clone(),
            despachos: 0,
            total_vendido: 0,
            total_dinero: Decimal::ZERO,
        });
        entry.despachos += 1;
        if let Some(t) = per_dispatch.get(&d.id) {
            entry.total_vendido += t.sold;
            entry.total_dinero += t.money;
        }
    }
    users.into_values().collect()
}

pub fn build_general(
    filtros: ReportFilters,
    dispatches: Vec<ReportDispatchRow>,
    details: &[ReportDetailRow],
) -> GeneralReport {
    let per_dispatch = totals_by_dispatch(details);
    let (productos, grand) = summarize_products(details);

    let rutas = summarize_routes(&dispatches, &per_dispatch);
    let usuarios = summarize_users(&dispatches, &per_dispatch);

    GeneralReport {
        filtros,
        total_despachos: dispatches.len() as i64,
        total_vendido: grand.sold,
        total_dinero: grand.money,
        productos,
        rutas,
        usuarios,
        despachos: dispatches,
    }
}

pub fn build_route_report(
    filtros: ReportFilters,
    despachos: Vec<ReportDispatchRow>,
    details: &[ReportDetailRow],
) -> Result<RouteReport, AppError> {
    let first = despachos
        .first()
        .ok_or_else(|| AppError::not_found("No hay despachos para esta ruta en el período seleccionado"))?;
    let (productos, grand) = summarize_products(details);

    let ruta = RouteHeader {
        id: first.ruta_id,
        nombre: first.ruta_nombre.clone(),
        tipo: first.ruta_tipo.clone(),
        total_despachos: despachos.len() as i64,
        total_vendido: grand.sold,
        total_dinero: grand.money,
    };

    Ok(RouteReport { filtros, ruta, productos, despachos })
}

/// Por usuário: as rotas saem na ordem dos detalhes e só contam despachos
/// de rotas que tiveram algum detalhe.
pub fn build_user_report(
    filtros: ReportFilters,
    despachos: Vec<ReportDispatchRow>,
    details: &[ReportDetailRow],
) -> Result<UserReport, AppError> {
    let first = despachos
        .first()
        .ok_or_else(|| AppError::not_found("No hay despachos para este usuario en el período seleccionado"))?;

    let mut routes: IndexMap<i32, RouteSummary> = IndexMap::new();
    let mut grand = Totals::default();
    for detail in details {
        let entry = routes.entry(detail.ruta_id).or_insert_with(|| {
            let (nombre, tipo) = despachos
                .iter()
                .find(|d| d.ruta_id == detail.ruta_id)
                .map(|d| (d.ruta_nombre.clone(), d.ruta_tipo.clone()))
                .unwrap_or_default();
            RouteSummary {
                id: detail.ruta_id,
                nombre,
                tipo,
                despachos: 0,
                total_vendido: 0,
                total_dinero: Decimal::ZERO,
            }
        });
        entry.total_vendido += i64::from(detail.total_vendido);
        entry.total_dinero += detail.valor_venta;
        grand.add(detail);
    }
    for d in &despachos {
        if let Some(entry) = routes.get_mut(&d.ruta_id) {
            entry.despachos += 1;
        }
    }

    let usuario = UserHeader {
        id: first.usuario_id,
        nombre: first.usuario_nombre.clone(),
        total_despachos: despachos.len() as i64,
        total_vendido: grand.sold,
        total_dinero: grand.money,
    };

    Ok(UserReport { filtros, usuario, rutas: routes.into_values().collect(), despachos })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dispatch::DispatchState;
    use chrono::NaiveDate;

    fn dispatch(id: i32, ruta_id: i32, usuario_id: i32) -> ReportDispatchRow {
        ReportDispatchRow {
            id,
            fecha: NaiveDate::from_ymd_opt(2024, 1, id as u32).unwrap(),
            estado: DispatchState::Completado,
            usuario_id,
            usuario_nombre: format!("Usuario {usuario_id}"),
            ruta_id,
            ruta_nombre: format!("Ruta {ruta_id}"),
            ruta_tipo: "GRUPO AJE".to_string(),
        }
    }

    fn detail(despacho_id: i32, ruta_id: i32, producto_id: i32, salida: i32, retorno: i32, precio: Decimal) -> ReportDetailRow {
        let sold = salida - retorno;
        ReportDetailRow {
            id: despacho_id * 100 + producto_id,
            despacho_id,
            producto_id,
            producto_nombre: format!("Producto {producto_id}"),
            medida: "Fardo".to_string(),
            categoria_id: 1,
            categoria_nombre: "Gaseosas".to_string(),
            precio_unitario: precio,
            salida_manana: salida,
            recarga_mediodia: 0,
            retorno_tarde: retorno,
            total_vendido: sold,
            valor_venta: precio * Decimal::from(sold),
            ruta_id,
        }
    }

    #[test]
    fn general_report_folds_products_routes_and_users() {
        let dispatches = vec![dispatch(2, 7, 5), dispatch(1, 8, 5)];
        let details = vec![
            detail(2, 7, 10, 10, 2, Decimal::new(150, 2)),
            detail(1, 8, 10, 5, 0, Decimal::new(150, 2)),
            detail(1, 8, 11, 4, 1, Decimal::TWO),
        ];

        let report = build_general(ReportFilters::default(), dispatches, &details);

        assert_eq!(report.total_despachos, 2);
        assert_eq!(report.total_vendido, 8 + 5 + 3);
        assert_eq!(report.total_dinero, Decimal::new(2550, 2));

        assert_eq!(report.productos.len(), 2);
        assert_eq!(report.productos[0].id, 10);
        assert_eq!(report.productos[0].total_vendido, 13);
        assert_eq!(report.productos[0].total_retornado, 2);
        assert_eq!(report.productos[0].valor_total, Decimal::new(1950, 2));

        // Ordem de primeira aparição (despachos vêm do mais recente)
        assert_eq!(report.rutas.iter().map(|r| r.id).collect::<Vec<_>>(), vec![7, 8]);
        assert_eq!(report.rutas[1].total_vendido, 8);
        assert_eq!(report.usuarios.len(), 1);
        assert_eq!(report.usuarios[0].despachos, 2);
        assert_eq!(report.usuarios[0].total_dinero, Decimal::new(2550, 2));

        // Lista crua de despachos na ordem recebida
        assert_eq!(report.despachos.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2, 1]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["despachos"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["despachos"][0]["ruta_id"], 7);
        assert_eq!(value["totalDespachos"], 2);
    }

    #[test]
    fn product_order_follows_dispatch_grouping() {
        // Linhas por categoria intercalam despachos; o produto 30 do despacho 2
        // vem antes do produto 10 do despacho 1.
        let details = vec![
            detail(2, 7, 20, 1, 0, Decimal::ONE),
            detail(1, 8, 10, 1, 0, Decimal::ONE),
            detail(2, 7, 30, 1, 0, Decimal::ONE),
        ];

        let (products, grand) = summarize_products(&details);
        assert_eq!(products.iter().map(|p| p.id).collect::<Vec<_>>(), vec![20, 30, 10]);
        assert_eq!(grand.sold, 3);
    }

    #[test]
    fn dispatch_without_details_still_counts_for_its_route() {
        let dispatches = vec![dispatch(1, 7, 5), dispatch(2, 7, 5)];
        let details = vec![detail(1, 7, 10, 3, 0, Decimal::ONE)];

        let report = build_general(ReportFilters::default(), dispatches, &details);
        assert_eq!(report.rutas[0].despachos, 2);
        assert_eq!(report.rutas[0].total_vendido, 3);
    }

    #[test]
    fn route_report_header_uses_first_dispatch() {
        let dispatches = vec![dispatch(3, 7, 5), dispatch(1, 7, 6)];
        let details = vec![detail(3, 7, 10, 6, 1, Decimal::ONE)];

        let report = build_route_report(ReportFilters::default(), dispatches, &details).unwrap();
        assert_eq!(report.ruta.id, 7);
        assert_eq!(report.ruta.total_despachos, 2);
        assert_eq!(report.ruta.total_vendido, 5);
        assert_eq!(report.despachos.len(), 2);
    }

    #[test]
    fn user_report_counts_only_routes_with_details() {
        let dispatches = vec![dispatch(1, 7, 5), dispatch(2, 8, 5), dispatch(3, 7, 5)];
        let details = vec![
            detail(1, 7, 10, 4, 0, Decimal::ONE),
            detail(3, 7, 10, 2, 0, Decimal::ONE),
        ];

        let report = build_user_report(ReportFilters::default(), dispatches, &details).unwrap();
        assert_eq!(report.usuario.total_despachos, 3);
        assert_eq!(report.usuario.total_vendido, 6);
        assert_eq!(report.rutas.len(), 1);
        assert_eq!(report.rutas[0].id, 7);
        assert_eq!(report.rutas[0].despachos, 2);
    }

    #[test]
    fn empty_input_is_not_found() {
        let err = build_route_report(ReportFilters::default(), vec![], &[]).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn summaries_serialize_with_front_end_keys() {
        let (products, _) = summarize_products(&[detail(1, 7, 10, 3, 1, Decimal::ONE)]);
        let value = serde_json::to_value(&products[0]).unwrap();
        assert_eq!(value["totalVendido"], 2);
        assert_eq!(value["totalRetornado"], 1);
        assert_eq!(value["categoria_id"], 1);
        assert!(value.get("valorTotal").is_some());
    }
}
