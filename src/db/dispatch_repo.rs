// src/db/dispatch_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, Postgres};

use crate::{
    common::{
        db_utils::{map_foreign_key_violation, map_unique_violation},
        error::AppError,
    },
    models::dispatch::{
        DetailQuantities, Dispatch, DispatchDetail, DispatchHeader, DispatchState, DispatchSummary,
        QuantityField,
    },
    services::dispatch_service::DispatchStore,
};

const DISPATCH_UNIQUE: &[(&str, &str)] = &[(
    "despachos_ruta_fecha_usuario_key",
    "Ya existe un despacho para esta ruta y fecha",
)];

const DETAIL_UNIQUE: &[(&str, &str)] = &[(
    "detalles_despacho_despacho_id_producto_id_key",
    "Un producto no puede repetirse en el mismo despacho",
)];

const SUMMARY_COLUMNS: &str = r#"
    SELECT d.id, d.fecha, d.estado, d.usuario_id, u.nombre AS usuario_nombre,
           d.ruta_id, r.nombre AS ruta_nombre, r.tipo AS ruta_tipo,
           (SELECT COUNT(*) FROM detalles_despacho dd WHERE dd.despacho_id = d.id) AS total_productos,
           (SELECT SUM(dd.valor_venta) FROM detalles_despacho dd WHERE dd.despacho_id = d.id) AS valor_total
    FROM despachos d
    JOIN usuarios u ON d.usuario_id = u.id
    JOIN rutas r ON d.ruta_id = r.id
"#;

#[derive(Clone, Default)]
pub struct DispatchRepository;

impl DispatchRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    /// Mais recentes primeiro; `usuario_id` restringe a um usuário.
    pub async fn list_summaries<'e, E>(
        &self,
        executor: E,
        usuario_id: Option<i32>,
    ) -> Result<Vec<DispatchSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "{SUMMARY_COLUMNS} WHERE ($1::int IS NULL OR d.usuario_id = $1) ORDER BY d.fecha DESC, d.id DESC"
        );
        let rows = sqlx::query_as::<_, DispatchSummary>(&sql)
            .bind(usuario_id)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn find_header<'e, E>(&self, executor: E, id: i32) -> Result<Option<DispatchHeader>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, DispatchHeader>(
            r#"
            SELECT d.id, d.fecha, d.estado, d.usuario_id, u.nombre AS usuario_nombre,
                   d.ruta_id, r.nombre AS ruta_nombre, r.tipo AS ruta_tipo
            FROM despachos d
            JOIN usuarios u ON d.usuario_id = u.id
            JOIN rutas r ON d.ruta_id = r.id
            WHERE d.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    /// Detalhes ordenados por categoria e depois por medida.
    pub async fn list_details<'e, E>(&self, executor: E, despacho_id: i32) -> Result<Vec<DispatchDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, DispatchDetail>(
            r#"
            SELECT dd.id, dd.despacho_id, dd.producto_id, p.nombre AS producto_nombre, p.medida,
                   p.categoria_id, c.nombre AS categoria_nombre, dd.precio_unitario,
                   dd.salida_manana, dd.recarga_mediodia, dd.retorno_tarde,
                   dd.total_vendido, dd.valor_venta
            FROM detalles_despacho dd
            JOIN productos p ON dd.producto_id = p.id
            JOIN categorias c ON p.categoria_id = c.id
            WHERE dd.despacho_id = $1
            ORDER BY c.id, p.medida
            "#,
        )
        .bind(despacho_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    //  MÁQUINA DE ESTADOS
    // =========================================================================

    /// Trava a linha do despacho até o fim da transação.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        ruta_id: i32,
        fecha: NaiveDate,
        usuario_id: i32,
    ) -> Result<Option<Dispatch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Dispatch>(
            r#"
            SELECT id, fecha, ruta_id, usuario_id, estado
            FROM despachos
            WHERE ruta_id = $1 AND fecha = $2 AND usuario_id = $3
            FOR UPDATE
            "#,
        )
        .bind(ruta_id)
        .bind(fecha)
        .bind(usuario_id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn insert_dispatch<'e, E>(
        &self,
        executor: E,
        fecha: NaiveDate,
        ruta_id: i32,
        usuario_id: i32,
        estado: DispatchState,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO despachos (fecha, ruta_id, usuario_id, estado)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(fecha)
        .bind(ruta_id)
        .bind(usuario_id)
        .bind(estado)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            let is_fk = e
                .as_database_error()
                .is_some_and(|db_err| db_err.is_foreign_key_violation());
            if is_fk {
                map_foreign_key_violation(e, "La ruta o el usuario seleccionado no existe")
            } else {
                map_unique_violation(e, DISPATCH_UNIQUE)
            }
        })?;
        Ok(id)
    }

    pub async fn update_state<'e, E>(&self, executor: E, id: i32, estado: DispatchState) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE despachos SET estado = $1, actualizado_en = NOW() WHERE id = $2")
            .bind(estado)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn product_price<'e, E>(&self, executor: E, producto_id: i32) -> Result<Option<Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let price = sqlx::query_scalar("SELECT precio FROM productos WHERE id = $1")
            .bind(producto_id)
            .fetch_optional(executor)
            .await?;
        Ok(price)
    }

    pub async fn insert_detail<'e, E>(
        &self,
        executor: E,
        despacho_id: i32,
        producto_id: i32,
        precio_unitario: Decimal,
        salida_manana: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO detalles_despacho
                (despacho_id, producto_id, precio_unitario, salida_manana, recarga_mediodia, retorno_tarde)
            VALUES ($1, $2, $3, $4, 0, 0)
            "#,
        )
        .bind(despacho_id)
        .bind(producto_id)
        .bind(precio_unitario)
        .bind(salida_manana)
        .execute(executor)
        .await
        .map_err(|e| map_unique_violation(e, DETAIL_UNIQUE))?;
        Ok(())
    }

    pub async fn find_detail<'e, E>(
        &self,
        executor: E,
        despacho_id: i32,
        producto_id: i32,
    ) -> Result<Option<DetailQuantities>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, DetailQuantities>(
            r#"
            SELECT id, salida_manana, recarga_mediodia, retorno_tarde
            FROM detalles_despacho
            WHERE despacho_id = $1 AND producto_id = $2
            "#,
        )
        .bind(despacho_id)
        .bind(producto_id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    /// Atualiza só a coluna do checkpoint. O nome da coluna vem de um enum
    /// fechado, nunca do cliente.
    pub async fn set_quantity<'e, E>(
        &self,
        executor: E,
        detail_id: i32,
        field: QuantityField,
        value: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("UPDATE detalles_despacho SET {} = $1 WHERE id = $2", field.column());
        sqlx::query(&sql)
            .bind(value)
            .bind(detail_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}

// ---
// DispatchStore sobre uma conexão (normalmente a transação aberta pelo serviço)
// ---

pub struct PgDispatchStore<'c> {
    repo: &'c DispatchRepository,
    conn: &'c mut PgConnection,
}

impl<'c> PgDispatchStore<'c> {
    pub fn new(repo: &'c DispatchRepository, conn: &'c mut PgConnection) -> Self {
        Self { repo, conn }
    }
}

#[async_trait]
impl DispatchStore for PgDispatchStore<'_> {
    async fn find_for_update(
        &mut self,
        ruta_id: i32,
        fecha: NaiveDate,
        usuario_id: i32,
    ) -> Result<Option<Dispatch>, AppError> {
        self.repo.find_for_update(&mut *self.conn, ruta_id, fecha, usuario_id).await
    }

    async fn insert_dispatch(
        &mut self,
        fecha: NaiveDate,
        ruta_id: i32,
        usuario_id: i32,
        estado: DispatchState,
    ) -> Result<i32, AppError> {
        self.repo.insert_dispatch(&mut *self.conn, fecha, ruta_id, usuario_id, estado).await
    }

    async fn update_state(&mut self, id: i32, estado: DispatchState) -> Result<(), AppError> {
        self.repo.update_state(&mut *self.conn, id, estado).await
    }

    async fn product_price(&mut self, producto_id: i32) -> Result<Option<Decimal>, AppError> {
        self.repo.product_price(&mut *self.conn, producto_id).await
    }

    async fn insert_detail(
        &mut self,
        despacho_id: i32,
        producto_id: i32,
        precio_unitario: Decimal,
        salida_manana: i32,
    ) -> Result<(), AppError> {
        self.repo
            .insert_detail(&mut *self.conn, despacho_id, producto_id, precio_unitario, salida_manana)
            .await
    }

    async fn find_detail(
        &mut self,
        despacho_id: i32,
        producto_id: i32,
    ) -> Result<Option<DetailQuantities>, AppError> {
        self.repo.find_detail(&mut *self.conn, despacho_id, producto_id).await
    }

    async fn set_quantity(&mut self, detail_id: i32, field: QuantityField, value: i32) -> Result<(), AppError> {
        self.repo.set_quantity(&mut *self.conn, detail_id, field, value).await
    }
}
