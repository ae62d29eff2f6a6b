// src/services/user_service.rs

use validator::Validate;

use crate::{
    common::{error::AppError, validation::normalize_dui},
    db::{
        user_repo::{NewUser, UserChanges, USER_HAS_DISPATCHES},
        UserRepository,
    },
    models::user::{CreateUserPayload, UpdateUserPayload, User},
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.repo.list_users().await
    }

    pub async fn get(&self, id: i32) -> Result<User, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuario no encontrado"))
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<i32, AppError> {
        payload.validate()?;
        let dui = normalize_dui(&payload.dui).ok_or_else(|| AppError::invalid("Formato de DUI inválido"))?;

        if self.repo.dui_exists(&dui).await? {
            return Err(AppError::business("El DUI ya está registrado"));
        }

        let password_hash = hash_password(payload.password.clone()).await?;
        let id = self
            .repo
            .create_user(&NewUser {
                nombre: payload.nombre.trim(),
                dui: &dui,
                telefono: payload.telefono.trim(),
                correo: payload.correo.as_deref().unwrap_or_default(),
                direccion: payload.direccion.trim(),
                password_hash: &password_hash,
                foto: &payload.foto,
            })
            .await?;

        tracing::info!(usuario_id = id, "usuário criado");
        Ok(id)
    }

    pub async fn update(&self, payload: UpdateUserPayload) -> Result<(), AppError> {
        payload.validate()?;

        let password_hash = match payload.password.clone() {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let changes = UserChanges {
            nombre: payload.nombre.trim(),
            telefono: payload.telefono.trim(),
            correo: payload.correo.as_deref().unwrap_or_default(),
            direccion: payload.direccion.trim(),
            password_hash: password_hash.as_deref(),
            foto: payload.foto.as_deref(),
        };
        if self.repo.update_user(payload.id, &changes).await? == 0 {
            return Err(AppError::not_found("Usuario no encontrado"));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if self.repo.has_dispatches(id).await? {
            return Err(AppError::business(USER_HAS_DISPATCHES));
        }
        if self.repo.delete_user(id).await? == 0 {
            return Err(AppError::business(
                "Error al eliminar el usuario o el usuario es administrador",
            ));
        }
        tracing::info!(usuario_id = id, "usuário excluído");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use sqlx::PgPool;

    fn service(pool: &PgPool) -> UserService {
        UserService::new(UserRepository::new(pool.clone()))
    }

    fn payload(dui: &str) -> CreateUserPayload {
        CreateUserPayload {
            nombre: "Ana López".to_string(),
            dui: dui.to_string(),
            telefono: String::new(),
            correo: None,
            direccion: String::new(),
            password: "secreta".to_string(),
            foto: String::new(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn user_with_dispatches_cannot_be_deleted(pool: PgPool) {
        let seeded = fixtures::seeded_dispatch(&pool).await;
        let users = service(&pool);

        let err = users.delete(seeded.usuario_id).await.unwrap_err();
        assert_eq!(err.public_message(), USER_HAS_DISPATCHES);
        assert_eq!(users.get(seeded.usuario_id).await.unwrap().dui, "01234567-8");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn dui_is_checked_before_hashing(pool: PgPool) {
        fixtures::user(&pool, "01234567-8").await;

        let err = service(&pool).create(payload("012345678")).await.unwrap_err();
        assert_eq!(err.public_message(), "El DUI ya está registrado");
    }
}
