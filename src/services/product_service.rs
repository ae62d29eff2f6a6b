// src/services/product_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{
        product_repo::{CATEGORY_IN_USE, CATEGORY_MISSING, PRODUCT_IN_USE},
        ProductRepository,
    },
    models::product::{Category, CategoryPayload, Product, ProductPayload},
};

#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
}

impl ProductService {
    pub fn new(repo: ProductRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        self.repo.list_products().await
    }

    pub async fn get(&self, id: i32) -> Result<Product, AppError> {
        self.repo
            .find_product(id)
            .await?
            .ok_or_else(|| AppError::not_found("Producto no encontrado"))
    }

    pub async fn list_by_category(&self, categoria_id: i32) -> Result<Vec<Product>, AppError> {
        if categoria_id <= 0 {
            return Err(AppError::invalid("ID de categoría inválido"));
        }
        self.repo.list_by_category(categoria_id).await
    }

    pub async fn create(&self, mut payload: ProductPayload) -> Result<i32, AppError> {
        self.check_product(&mut payload).await?;
        let id = self.repo.create_product(&payload).await?;
        tracing::info!(producto_id = id, nombre = %payload.nombre, "produto criado");
        Ok(id)
    }

    pub async fn update(&self, id: i32, mut payload: ProductPayload) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::invalid("Datos incompletos o inválidos"));
        }
        self.check_product(&mut payload).await?;
        if self.repo.update_product(id, &payload).await? == 0 {
            return Err(AppError::not_found("Producto no encontrado"));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if self.repo.product_in_use(id).await? {
            return Err(AppError::business(PRODUCT_IN_USE));
        }
        if self.repo.delete_product(id).await? == 0 {
            return Err(AppError::not_found(
                "Error al eliminar el producto o el producto no existe",
            ));
        }
        tracing::info!(producto_id = id, "produto excluído");
        Ok(())
    }

    async fn check_product(&self, payload: &mut ProductPayload) -> Result<(), AppError> {
        payload.normalize();
        payload.validate()?;
        if !self.repo.category_exists(payload.categoria_id).await? {
            return Err(AppError::business(CATEGORY_MISSING));
        }
        Ok(())
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.repo.list_categories().await
    }

    pub async fn create_category(&self, mut payload: CategoryPayload) -> Result<i32, AppError> {
        payload.normalize();
        payload.validate()?;
        if self.repo.find_category_by_name(&payload.nombre, None).await?.is_some() {
            return Err(AppError::business("Ya existe una categoría con ese nombre"));
        }
        self.repo.create_category(&payload).await
    }

    pub async fn update_category(&self, id: i32, mut payload: CategoryPayload) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::invalid("ID de categoría inválido"));
        }
        payload.normalize();
        payload.validate()?;
        if self.repo.find_category_by_name(&payload.nombre, Some(id)).await?.is_some() {
            return Err(AppError::business("Ya existe una categoría con ese nombre"));
        }
        if self.repo.update_category(id, &payload).await? == 0 {
            return Err(AppError::not_found("Categoría no encontrada"));
        }
        Ok(())
    }

    pub async fn delete_category(&self, id: i32) -> Result<(), AppError> {
        if self.repo.category_in_use(id).await? {
            return Err(AppError::business(CATEGORY_IN_USE));
        }
        if self.repo.delete_category(id).await? == 0 {
            return Err(AppError::not_found("Categoría no encontrada"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    fn service(pool: &PgPool) -> ProductService {
        ProductService::new(ProductRepository::new(pool.clone()))
    }

    fn category(nombre: &str) -> CategoryPayload {
        CategoryPayload { nombre: nombre.to_string() }
    }

    async fn detail_count(pool: &PgPool, despacho_id: i32) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM detalles_despacho WHERE despacho_id = $1")
            .bind(despacho_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn product_used_in_dispatch_cannot_be_deleted(pool: PgPool) {
        let seeded = fixtures::seeded_dispatch(&pool).await;
        let products = service(&pool);

        let err = products.delete(seeded.producto_id).await.unwrap_err();
        assert_eq!(err.public_message(), PRODUCT_IN_USE);

        let kept = products.get(seeded.producto_id).await.unwrap();
        assert_eq!(kept.nombre, "Coca-Cola 2.5L");
        assert_eq!(kept.precio, Decimal::new(150, 2));
        assert_eq!(detail_count(&pool, seeded.despacho_id).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn foreign_key_blocks_delete_that_skips_the_check(pool: PgPool) {
        let seeded = fixtures::seeded_dispatch(&pool).await;
        let repo = ProductRepository::new(pool.clone());

        let err = repo.delete_product(seeded.producto_id).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m == PRODUCT_IN_USE));
        assert!(repo.find_product(seeded.producto_id).await.unwrap().is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn category_with_products_cannot_be_deleted(pool: PgPool) {
        let seeded = fixtures::seeded_dispatch(&pool).await;
        let products = service(&pool);

        let err = products.delete_category(seeded.categoria_id).await.unwrap_err();
        assert_eq!(err.public_message(), CATEGORY_IN_USE);

        let categories = products.list_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].nombre, "Gaseosas");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unused_product_and_category_are_deleted(pool: PgPool) {
        let categoria_id = fixtures::category(&pool, "Aguas").await;
        let producto_id = fixtures::product(&pool, categoria_id, "Agua 600ml").await;
        let products = service(&pool);

        products.delete(producto_id).await.unwrap();
        products.delete_category(categoria_id).await.unwrap();
        assert!(products.list_categories().await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn category_name_is_unique_ignoring_case(pool: PgPool) {
        let products = service(&pool);
        products.create_category(category("Gaseosas")).await.unwrap();

        let err = products.create_category(category("  gaseosas ")).await.unwrap_err();
        assert_eq!(err.public_message(), "Ya existe una categoría con ese nombre");
        assert_eq!(products.list_categories().await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unique_index_catches_case_variants_past_the_check(pool: PgPool) {
        let repo = ProductRepository::new(pool.clone());
        repo.create_category(&category("Gaseosas")).await.unwrap();
        let other = repo.create_category(&category("Jugos")).await.unwrap();

        let err = repo.create_category(&category("gaseosas")).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m == "Ya existe una categoría con ese nombre"));

        let err = repo.update_category(other, &category("GASEOSAS")).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m == "Ya existe una categoría con ese nombre"));
    }
}
