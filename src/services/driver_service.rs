// src/services/driver_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{driver_repo::DRIVER_ASSIGNED, DriverRepository},
    models::driver::{Driver, DriverPayload},
};

#[derive(Clone)]
pub struct DriverService {
    repo: DriverRepository,
}

impl DriverService {
    pub fn new(repo: DriverRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Driver>, AppError> {
        self.repo.list_drivers().await
    }

    pub async fn get(&self, id: i32) -> Result<Driver, AppError> {
        self.repo
            .find_driver(id)
            .await?
            .ok_or_else(|| AppError::not_found("Motorista no encontrado"))
    }

    pub async fn create(&self, mut payload: DriverPayload) -> Result<i32, AppError> {
        payload.normalize();
        payload.validate()?;

        if self.repo.dui_taken(&payload.dui, None).await? {
            return Err(AppError::business("El DUI ya está registrado"));
        }
        if self.repo.license_taken(&payload.numero_licencia, None).await? {
            return Err(AppError::business("El número de licencia ya está registrado"));
        }

        let id = self.repo.create_driver(&payload).await?;
        tracing::info!(motorista_id = id, "motorista criado");
        Ok(id)
    }

    pub async fn update(&self, id: i32, mut payload: DriverPayload) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::invalid("Todos los campos son obligatorios"));
        }
        payload.normalize();
        payload.validate()?;

        if self.repo.dui_taken(&payload.dui, Some(id)).await? {
            return Err(AppError::business("El DUI ya está registrado para otro motorista"));
        }
        if self.repo.license_taken(&payload.numero_licencia, Some(id)).await? {
            return Err(AppError::business(
                "El número de licencia ya está registrado para otro motorista",
            ));
        }

        if self.repo.update_driver(id, &payload).await? == 0 {
            return Err(AppError::not_found("Motorista no encontrado"));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::invalid("ID de motorista inválido"));
        }
        if self.repo.assigned_to_route(id).await? {
            return Err(AppError::business(DRIVER_ASSIGNED));
        }
        if self.repo.delete_driver(id).await? == 0 {
            return Err(AppError::not_found(
                "Error al eliminar el motorista o el motorista no existe",
            ));
        }
        tracing::info!(motorista_id = id, "motorista excluído");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::fixtures, models::driver::LicenseType};
    use sqlx::PgPool;

    fn service(pool: &PgPool) -> DriverService {
        DriverService::new(DriverRepository::new(pool.clone()))
    }

    fn payload(dui: &str, numero_licencia: &str) -> DriverPayload {
        DriverPayload {
            nombre: "Carlos Martínez".to_string(),
            dui: dui.to_string(),
            numero_licencia: numero_licencia.to_string(),
            tipo_licencia: LicenseType::Pesada,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn driver_assigned_to_route_cannot_be_deleted(pool: PgPool) {
        let motorista_id = fixtures::driver(&pool, "01234567-8", "LIC-001").await;
        fixtures::route(&pool, "Ruta Centro", None, Some(motorista_id)).await;
        let drivers = service(&pool);

        let err = drivers.delete(motorista_id).await.unwrap_err();
        assert_eq!(err.public_message(), DRIVER_ASSIGNED);

        let kept = drivers.get(motorista_id).await.unwrap();
        assert_eq!(kept.dui, "01234567-8");
        assert_eq!(kept.ruta_nombre.as_deref(), Some("Ruta Centro"));

        let repo = DriverRepository::new(pool.clone());
        let err = repo.delete_driver(motorista_id).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m == DRIVER_ASSIGNED));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn dui_is_unique_in_any_spelling(pool: PgPool) {
        let drivers = service(&pool);
        drivers.create(payload("01234567-8", "LIC-001")).await.unwrap();

        let err = drivers.create(payload("012345678", "LIC-002")).await.unwrap_err();
        assert_eq!(err.public_message(), "El DUI ya está registrado");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn license_is_unique_ignoring_case(pool: PgPool) {
        let drivers = service(&pool);
        drivers.create(payload("01234567-8", "LIC-abc")).await.unwrap();

        let err = drivers.create(payload("98765432-1", "lic-ABC")).await.unwrap_err();
        assert_eq!(err.public_message(), "El número de licencia ya está registrado");
        assert_eq!(drivers.list().await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unique_index_catches_license_case_variant_past_the_check(pool: PgPool) {
        let repo = DriverRepository::new(pool.clone());
        repo.create_driver(&payload("01234567-8", "LIC-abc")).await.unwrap();

        let err = repo.create_driver(&payload("98765432-1", "lic-ABC")).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m == "El número de licencia ya está registrado"));
    }
}
