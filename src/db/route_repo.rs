// src/db/route_repo.rs

use sqlx::PgPool;

use crate::{
    common::{
        db_utils::{map_foreign_key_violation, map_unique_violation},
        error::AppError,
    },
    models::route::{Route, RouteDetail, RoutePayload},
};

const ROUTE_UNIQUE: &[(&str, &str)] = &[
    ("rutas_placa_key", "La placa ya está asignada a otra ruta"),
    ("rutas_motorista_key", "El motorista ya está asignado a otra ruta"),
];

pub const ROUTE_IN_USE: &str = "No se puede eliminar la ruta porque ya ha sido utilizada en despachos";
pub const DRIVER_MISSING: &str = "El motorista seleccionado no existe";

const ROUTE_COLUMNS: &str = r#"
    SELECT r.id, r.nombre, r.tipo, r.placa_vehiculo, r.motorista_id,
           m.nombre AS motorista_nombre
    FROM rutas r
    LEFT JOIN motoristas m ON r.motorista_id = m.id
"#;

#[derive(Clone)]
pub struct RouteRepository {
    pool: PgPool,
}

impl RouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_routes(&self) -> Result<Vec<Route>, AppError> {
        let sql = format!("{ROUTE_COLUMNS} ORDER BY r.nombre");
        let rows = sqlx::query_as::<_, Route>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn list_by_type(&self, tipo: &str) -> Result<Vec<Route>, AppError> {
        let sql = format!("{ROUTE_COLUMNS} WHERE r.tipo = $1 ORDER BY r.nombre");
        let rows = sqlx::query_as::<_, Route>(&sql)
            .bind(tipo)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_route(&self, id: i32) -> Result<Option<RouteDetail>, AppError> {
        let row = sqlx::query_as::<_, RouteDetail>(
            r#"
            SELECT r.id, r.nombre, r.tipo, r.placa_vehiculo, r.motorista_id,
                   m.nombre AS motorista_nombre, m.dui AS motorista_dui,
                   m.numero_licencia, m.tipo_licencia
            FROM rutas r
            LEFT JOIN motoristas m ON r.motorista_id = m.id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn route_exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM rutas WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn driver_exists(&self, motorista_id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM motoristas WHERE id = $1)")
            .bind(motorista_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Nome da rota (diferente de `exclude_id`) que já usa o motorista.
    pub async fn route_using_driver(
        &self,
        motorista_id: i32,
        exclude_id: Option<i32>,
    ) -> Result<Option<String>, AppError> {
        let name = sqlx::query_scalar(
            r#"
            SELECT nombre FROM rutas
            WHERE motorista_id = $1
              AND ($2::int IS NULL OR id <> $2)
            LIMIT 1
            "#,
        )
        .bind(motorista_id)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(name)
    }

    /// Nome da rota (diferente de `exclude_id`) que já usa a placa.
    pub async fn route_using_plate(
        &self,
        placa: &str,
        exclude_id: Option<i32>,
    ) -> Result<Option<String>, AppError> {
        let name = sqlx::query_scalar(
            r#"
            SELECT nombre FROM rutas
            WHERE upper(placa_vehiculo) = upper($1)
              AND ($2::int IS NULL OR id <> $2)
            LIMIT 1
            "#,
        )
        .bind(placa)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(name)
    }

    pub async fn create_route(&self, payload: &RoutePayload) -> Result<i32, AppError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO rutas (nombre, tipo, placa_vehiculo, motorista_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&payload.nombre)
        .bind(payload.tipo.as_str())
        .bind(payload.placa_vehiculo.as_deref())
        .bind(payload.motorista_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_route_write_error)?;
        Ok(id)
    }

    pub async fn update_route(&self, id: i32, payload: &RoutePayload) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE rutas
            SET nombre = $1, tipo = $2, placa_vehiculo = $3, motorista_id = $4
            WHERE id = $5
            "#,
        )
        .bind(&payload.nombre)
        .bind(payload.tipo.as_str())
        .bind(payload.placa_vehiculo.as_deref())
        .bind(payload.motorista_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_route_write_error)?;
        Ok(result.rows_affected())
    }

    pub async fn route_in_use(&self, id: i32) -> Result<bool, AppError> {
        let used: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM despachos WHERE ruta_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(used)
    }

    pub async fn delete_route(&self, id: i32) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM rutas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_foreign_key_violation(e, ROUTE_IN_USE))?;
        Ok(result.rows_affected())
    }
}

// Índice único ou motorista apagado entre a checagem e a escrita.
fn map_route_write_error(e: sqlx::Error) -> AppError {
    let is_fk = e
        .as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation());
    if is_fk {
        return AppError::business(DRIVER_MISSING);
    }
    map_unique_violation(e, ROUTE_UNIQUE)
}
