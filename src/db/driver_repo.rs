// src/db/driver_repo.rs

use sqlx::PgPool;

use crate::{
    common::{
        db_utils::{map_foreign_key_violation, map_unique_violation},
        error::AppError,
    },
    models::driver::{Driver, DriverPayload},
};

const DRIVER_UNIQUE: &[(&str, &str)] = &[
    ("motoristas_dui_key", "El DUI ya está registrado"),
    ("motoristas_licencia_key", "El número de licencia ya está registrado"),
];

pub const DRIVER_ASSIGNED: &str =
    "No se puede eliminar el motorista porque está asignado a una o más rutas";

const DRIVER_COLUMNS: &str = r#"
    SELECT m.id, m.nombre, m.dui, m.numero_licencia, m.tipo_licencia,
           r.nombre AS ruta_nombre
    FROM motoristas m
    LEFT JOIN rutas r ON r.motorista_id = m.id
"#;

#[derive(Clone)]
pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_drivers(&self) -> Result<Vec<Driver>, AppError> {
        let sql = format!("{DRIVER_COLUMNS} ORDER BY m.nombre");
        let rows = sqlx::query_as::<_, Driver>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn find_driver(&self, id: i32) -> Result<Option<Driver>, AppError> {
        let sql = format!("{DRIVER_COLUMNS} WHERE m.id = $1");
        let row = sqlx::query_as::<_, Driver>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn dui_taken(&self, dui: &str, exclude_id: Option<i32>) -> Result<bool, AppError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM motoristas
                WHERE lower(dui) = lower($1) AND ($2::int IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(dui)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn license_taken(&self, numero: &str, exclude_id: Option<i32>) -> Result<bool, AppError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM motoristas
                WHERE lower(numero_licencia) = lower($1) AND ($2::int IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(numero)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create_driver(&self, payload: &DriverPayload) -> Result<i32, AppError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO motoristas (nombre, dui, numero_licencia, tipo_licencia)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&payload.nombre)
        .bind(&payload.dui)
        .bind(&payload.numero_licencia)
        .bind(payload.tipo_licencia.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DRIVER_UNIQUE))?;
        Ok(id)
    }

    pub async fn update_driver(&self, id: i32, payload: &DriverPayload) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE motoristas
            SET nombre = $1, dui = $2, numero_licencia = $3, tipo_licencia = $4
            WHERE id = $5
            "#,
        )
        .bind(&payload.nombre)
        .bind(&payload.dui)
        .bind(&payload.numero_licencia)
        .bind(payload.tipo_licencia.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DRIVER_UNIQUE))?;
        Ok(result.rows_affected())
    }

    pub async fn assigned_to_route(&self, id: i32) -> Result<bool, AppError> {
        let assigned: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM rutas WHERE motorista_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(assigned)
    }

    pub async fn delete_driver(&self, id: i32) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM motoristas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_foreign_key_violation(e, DRIVER_ASSIGNED))?;
        Ok(result.rows_affected())
    }
}
