// src/db/product_repo.rs

use sqlx::PgPool;

use crate::{
    common::{
        db_utils::{map_foreign_key_violation, map_unique_violation},
        error::AppError,
    },
    models::product::{Category, CategoryPayload, Product, ProductPayload},
};

const CATEGORY_UNIQUE: &[(&str, &str)] =
    &[("categorias_nombre_key", "Ya existe una categoría con ese nombre")];

pub const PRODUCT_IN_USE: &str =
    "No se puede eliminar el producto porque ya ha sido utilizado en despachos";
pub const CATEGORY_IN_USE: &str =
    "No se puede eliminar la categoría porque tiene productos asociados";
pub const CATEGORY_MISSING: &str = "La categoría seleccionada no existe";

const PRODUCT_COLUMNS: &str = r#"
    SELECT p.id, p.nombre, p.precio, p.medida, p.categoria_id,
           c.nombre AS categoria_nombre, p.grupo, p.unidades_por_paquete
    FROM productos p
    JOIN categorias c ON p.categoria_id = c.id
"#;

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let sql = format!("{PRODUCT_COLUMNS} ORDER BY p.nombre");
        let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn find_product(&self, id: i32) -> Result<Option<Product>, AppError> {
        let sql = format!("{PRODUCT_COLUMNS} WHERE p.id = $1");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_by_category(&self, categoria_id: i32) -> Result<Vec<Product>, AppError> {
        let sql = format!("{PRODUCT_COLUMNS} WHERE p.categoria_id = $1 ORDER BY p.medida");
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(categoria_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create_product(&self, payload: &ProductPayload) -> Result<i32, AppError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO productos (nombre, precio, medida, categoria_id, grupo, unidades_por_paquete)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&payload.nombre)
        .bind(payload.precio)
        .bind(&payload.medida)
        .bind(payload.categoria_id)
        .bind(payload.grupo.as_deref())
        .bind(payload.unidades_por_paquete)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_foreign_key_violation(e, CATEGORY_MISSING))?;
        Ok(id)
    }

    /// Devolve o número de linhas afetadas (0 = produto inexistente).
    pub async fn update_product(&self, id: i32, payload: &ProductPayload) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE productos
            SET nombre = $1, precio = $2, medida = $3, categoria_id = $4,
                grupo = $5, unidades_por_paquete = $6
            WHERE id = $7
            "#,
        )
        .bind(&payload.nombre)
        .bind(payload.precio)
        .bind(&payload.medida)
        .bind(payload.categoria_id)
        .bind(payload.grupo.as_deref())
        .bind(payload.unidades_por_paquete)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_foreign_key_violation(e, CATEGORY_MISSING))?;
        Ok(result.rows_affected())
    }

    pub async fn product_in_use(&self, id: i32) -> Result<bool, AppError> {
        let used: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM detalles_despacho WHERE producto_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(used)
    }

    pub async fn delete_product(&self, id: i32) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM productos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_foreign_key_violation(e, PRODUCT_IN_USE))?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, nombre FROM categorias ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn category_exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categorias WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Busca por nome sem diferenciar maiúsculas, ignorando `exclude_id`.
    pub async fn find_category_by_name(
        &self,
        nombre: &str,
        exclude_id: Option<i32>,
    ) -> Result<Option<Category>, AppError> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, nombre FROM categorias
            WHERE lower(nombre) = lower($1)
              AND ($2::int IS NULL OR id <> $2)
            LIMIT 1
            "#,
        )
        .bind(nombre)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<i32, AppError> {
        let id: i32 = sqlx::query_scalar("INSERT INTO categorias (nombre) VALUES ($1) RETURNING id")
            .bind(&payload.nombre)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, CATEGORY_UNIQUE))?;
        Ok(id)
    }

    pub async fn update_category(&self, id: i32, payload: &CategoryPayload) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE categorias SET nombre = $1 WHERE id = $2")
            .bind(&payload.nombre)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, CATEGORY_UNIQUE))?;
        Ok(result.rows_affected())
    }

    pub async fn category_in_use(&self, id: i32) -> Result<bool, AppError> {
        let used: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM productos WHERE categoria_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(used)
    }

    pub async fn delete_category(&self, id: i32) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM categorias WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_foreign_key_violation(e, CATEGORY_IN_USE))?;
        Ok(result.rows_affected())
    }
}
