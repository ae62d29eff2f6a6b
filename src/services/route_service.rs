// src/services/route_service.rs

use validator::Validate;

use crate::{
    common::{error::AppError, validation::normalize_plate},
    db::{
        route_repo::{DRIVER_MISSING, ROUTE_IN_USE},
        RouteRepository,
    },
    models::route::{AvailabilityCheck, AvailabilityQuery, Route, RouteDetail, RoutePayload, RouteType},
};

#[derive(Clone)]
pub struct RouteService {
    repo: RouteRepository,
}

impl RouteService {
    pub fn new(repo: RouteRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Route>, AppError> {
        self.repo.list_routes().await
    }

    pub async fn get(&self, id: i32) -> Result<RouteDetail, AppError> {
        self.repo
            .find_route(id)
            .await?
            .ok_or_else(|| AppError::not_found("Ruta no encontrada"))
    }

    pub async fn list_by_type(&self, tipo: RouteType) -> Result<Vec<Route>, AppError> {
        self.repo.list_by_type(tipo.as_str()).await
    }

    pub async fn create(&self, mut payload: RoutePayload) -> Result<i32, AppError> {
        self.check_route(&mut payload, None).await?;
        let id = self.repo.create_route(&payload).await?;
        tracing::info!(ruta_id = id, nombre = %payload.nombre, "rota criada");
        Ok(id)
    }

    pub async fn update(&self, id: i32, mut payload: RoutePayload) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::invalid("Datos incompletos o inválidos"));
        }
        if !self.repo.route_exists(id).await? {
            return Err(AppError::not_found("Ruta no encontrada"));
        }
        self.check_route(&mut payload, Some(id)).await?;
        if self.repo.update_route(id, &payload).await? == 0 {
            return Err(AppError::not_found("Ruta no encontrada"));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if self.repo.route_in_use(id).await? {
            return Err(AppError::business(ROUTE_IN_USE));
        }
        if self.repo.delete_route(id).await? == 0 {
            return Err(AppError::not_found("Error al eliminar la ruta o la ruta no existe"));
        }
        tracing::info!(ruta_id = id, "rota excluída");
        Ok(())
    }

    /// Quem já usa o motorista e a placa, ignorando a rota em edição.
    pub async fn availability(&self, query: AvailabilityQuery) -> Result<AvailabilityCheck, AppError> {
        let mut check = AvailabilityCheck::default();
        if let Some(motorista_id) = query.motorista_id {
            check.driver_route = self.repo.route_using_driver(motorista_id, query.ruta_id).await?;
        }
        if let Some(placa) = query.placa_vehiculo.as_deref() {
            check.plate_route = self
                .repo
                .route_using_plate(&normalize_plate(placa), query.ruta_id)
                .await?;
        }
        Ok(check)
    }

    async fn check_route(&self, payload: &mut RoutePayload, own_id: Option<i32>) -> Result<(), AppError> {
        payload.normalize();
        payload.validate()?;

        if let Some(motorista_id) = payload.motorista_id {
            if !self.repo.driver_exists(motorista_id).await? {
                return Err(AppError::business(DRIVER_MISSING));
            }
            if let Some(name) = self.repo.route_using_driver(motorista_id, own_id).await? {
                return Err(AppError::business(format!(
                    "El motorista ya está asignado a la ruta: {}",
                    name
                )));
            }
        }

        if let Some(placa) = payload.placa_vehiculo.as_deref() {
            if let Some(name) = self.repo.route_using_plate(placa, own_id).await? {
                return Err(AppError::business(format!(
                    "La placa ya está asignada a la ruta: {}",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use sqlx::PgPool;

    fn service(pool: &PgPool) -> RouteService {
        RouteService::new(RouteRepository::new(pool.clone()))
    }

    fn payload(nombre: &str, placa: Option<&str>, motorista_id: Option<i32>) -> RoutePayload {
        RoutePayload {
            nombre: nombre.to_string(),
            tipo: RouteType::GrupoAje,
            placa_vehiculo: placa.map(str::to_string),
            motorista_id,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn route_used_in_dispatch_cannot_be_deleted(pool: PgPool) {
        let seeded = fixtures::seeded_dispatch(&pool).await;
        let routes = service(&pool);

        let err = routes.delete(seeded.ruta_id).await.unwrap_err();
        assert_eq!(err.public_message(), ROUTE_IN_USE);

        let kept = routes.get(seeded.ruta_id).await.unwrap();
        assert_eq!(kept.nombre, "Ruta Centro");
        assert_eq!(kept.placa_vehiculo.as_deref(), Some("P123-456"));

        // O índice também segura quem pular a checagem
        let repo = RouteRepository::new(pool.clone());
        let err = repo.delete_route(seeded.ruta_id).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m == ROUTE_IN_USE));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn plate_is_unique_ignoring_case(pool: PgPool) {
        let routes = service(&pool);
        routes.create(payload("Ruta Centro", Some("P123-456"), None)).await.unwrap();

        let err = routes
            .create(payload("Ruta Norte", Some("p123-456"), None))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "La placa ya está asignada a la ruta: Ruta Centro");
        assert_eq!(routes.list().await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unique_index_catches_lowercase_plate_past_the_check(pool: PgPool) {
        let repo = RouteRepository::new(pool.clone());
        repo.create_route(&payload("Ruta Centro", Some("P123-456"), None)).await.unwrap();

        // Sem normalize(): a placa chega minúscula ao INSERT
        let err = repo
            .create_route(&payload("Ruta Norte", Some("p123-456"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m == "La placa ya está asignada a otra ruta"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn driver_serves_a_single_route(pool: PgPool) {
        let motorista_id = fixtures::driver(&pool, "01234567-8", "0101-123456-101-1").await;
        let routes = service(&pool);
        routes.create(payload("Ruta Centro", None, Some(motorista_id))).await.unwrap();

        let err = routes
            .create(payload("Ruta Norte", None, Some(motorista_id)))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "El motorista ya está asignado a la ruta: Ruta Centro");

        let repo = RouteRepository::new(pool.clone());
        let err = repo
            .create_route(&payload("Ruta Norte", None, Some(motorista_id)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m == "El motorista ya está asignado a otra ruta"));
    }
}
