// src/services/auth.rs

use bcrypt::{hash, verify};
use validator::Validate;

use crate::{
    common::{error::AppError, validation::normalize_dui},
    config::AdminCredentials,
    db::UserRepository,
    models::user::{LoginPayload, Role, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    admin: Option<AdminCredentials>,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, admin: Option<AdminCredentials>) -> Self {
        Self { user_repo, admin }
    }

    /// Confere DUI + senha e devolve o usuário sem o hash.
    pub async fn login(&self, payload: LoginPayload) -> Result<User, AppError> {
        payload.validate()?;
        let dui = payload.dui.trim();

        // Administrador configurado por ambiente (fora da tabela)
        if let Some(admin) = &self.admin {
            if admin.matches(dui, &payload.password) {
                tracing::info!("login do administrador configurado");
                return Ok(admin.as_user());
            }
        }

        let lookup = normalize_dui(dui).unwrap_or_else(|| dui.to_string());
        let record = self
            .user_repo
            .find_by_dui(&lookup)
            .await?
            .ok_or_else(|| AppError::InvalidCredentials("Usuario no encontrado".into()))?;

        if !verify_password(payload.password, record.password.clone()).await? {
            tracing::warn!(usuario_id = record.id, "senha incorreta");
            return Err(AppError::InvalidCredentials("Contraseña incorrecta".into()));
        }

        tracing::info!(usuario_id = record.id, "login");
        Ok(record.into_public())
    }
}

impl AdminCredentials {
    fn matches(&self, dui: &str, password: &str) -> bool {
        self.dui == dui && self.password == password
    }

    fn as_user(&self) -> User {
        User {
            id: 0,
            nombre: "Administrador".to_string(),
            dui: self.dui.clone(),
            telefono: String::new(),
            correo: String::new(),
            direccion: String::new(),
            foto: String::new(),
            rol: Role::Admin.as_str().to_string(),
        }
    }
}

// bcrypt é CPU-bound: roda fora do runtime assíncrono.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: String, password_hash: String) -> Result<bool, AppError> {
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        // Custo mínimo só para o teste ser rápido
        let hashed = tokio::task::spawn_blocking(|| hash("secreta", 4)).await.unwrap().unwrap();
        assert!(verify_password("secreta".into(), hashed.clone()).await.unwrap());
        assert!(!verify_password("otra".into(), hashed).await.unwrap());
    }

    #[test]
    fn configured_admin_matches_exactly() {
        let admin = AdminCredentials { dui: "admin".into(), password: "clave".into() };
        assert!(admin.matches("admin", "clave"));
        assert!(!admin.matches("admin", "Clave"));
        assert!(!admin.matches("01234567-8", "clave"));

        let user = admin.as_user();
        assert_eq!(user.rol, "admin");
        assert_eq!(user.nombre, "Administrador");
    }
}
