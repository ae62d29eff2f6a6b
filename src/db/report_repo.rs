// src/db/report_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::report::{ReportDetailRow, ReportDispatchRow, ReportFilters},
};

/// Ordem dos detalhes no lote. O relatório por usuário agrupa por data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOrder {
    Category,
    DateThenCategory,
}

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Despachos fechados (retorno registrado) que batem com os filtros.
    pub async fn list_dispatches(&self, filters: &ReportFilters) -> Result<Vec<ReportDispatchRow>, AppError> {
        let rows = sqlx::query_as::<_, ReportDispatchRow>(
            r#"
            SELECT d.id, d.fecha, d.estado, d.usuario_id, u.nombre AS usuario_nombre,
                   d.ruta_id, r.nombre AS ruta_nombre, r.tipo AS ruta_tipo
            FROM despachos d
            JOIN usuarios u ON d.usuario_id = u.id
            JOIN rutas r ON d.ruta_id = r.id
            WHERE d.estado IN ('retorno_tarde', 'completado')
              AND ($1::date IS NULL OR d.fecha >= $1)
              AND ($2::date IS NULL OR d.fecha <= $2)
              AND ($3::int IS NULL OR d.ruta_id = $3)
              AND ($4::int IS NULL OR d.usuario_id = $4)
            ORDER BY d.fecha DESC, d.id DESC
            "#,
        )
        .bind(filters.fecha_inicio)
        .bind(filters.fecha_fin)
        .bind(filters.ruta_id)
        .bind(filters.usuario_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Todos os detalhes dos despachos informados, numa consulta só.
    pub async fn list_details(&self, despacho_ids: &[i32], order: DetailOrder) -> Result<Vec<ReportDetailRow>, AppError> {
        if despacho_ids.is_empty() {
            return Ok(Vec::new());
        }

        let order_by = match order {
            DetailOrder::Category => "c.id, p.medida",
            DetailOrder::DateThenCategory => "d.fecha, c.id, p.medida",
        };
        let sql = format!(
            r#"
            SELECT dd.id, dd.despacho_id, dd.producto_id, p.nombre AS producto_nombre,
                   p.medida, p.categoria_id, c.nombre AS categoria_nombre,
                   dd.precio_unitario, dd.salida_manana, dd.recarga_mediodia,
                   dd.retorno_tarde, dd.total_vendido, dd.valor_venta, d.ruta_id
            FROM detalles_despacho dd
            JOIN productos p ON dd.producto_id = p.id
            JOIN categorias c ON p.categoria_id = c.id
            JOIN despachos d ON dd.despacho_id = d.id
            WHERE dd.despacho_id = ANY($1)
            ORDER BY {order_by}
            "#
        );

        let rows = sqlx::query_as::<_, ReportDetailRow>(&sql)
            .bind(despacho_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
