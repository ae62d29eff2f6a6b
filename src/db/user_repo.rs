// src/db/user_repo.rs

use sqlx::PgPool;

use crate::{
    common::{
        db_utils::{map_foreign_key_violation, map_unique_violation},
        error::AppError,
    },
    models::user::{User, UserRecord},
};

const USER_UNIQUE: &[(&str, &str)] = &[("usuarios_dui_key", "El DUI ya está registrado")];

pub const USER_HAS_DISPATCHES: &str =
    "No se puede eliminar el usuario porque tiene despachos asociados";

/// Dados já normalizados e com a senha em hash.
pub struct NewUser<'a> {
    pub nombre: &'a str,
    pub dui: &'a str,
    pub telefono: &'a str,
    pub correo: &'a str,
    pub direccion: &'a str,
    pub password_hash: &'a str,
    pub foto: &'a str,
}

pub struct UserChanges<'a> {
    pub nombre: &'a str,
    pub telefono: &'a str,
    pub correo: &'a str,
    pub direccion: &'a str,
    /// `None` mantém a senha atual.
    pub password_hash: Option<&'a str>,
    /// `None` mantém a foto atual.
    pub foto: Option<&'a str>,
}

// O repositório de usuários, responsável por todas as interações com a tabela 'usuarios'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca pelo DUI, com o hash (só para o login)
    pub async fn find_by_dui(&self, dui: &str) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, nombre, dui, telefono, correo, direccion, foto, rol, password
            FROM usuarios
            WHERE lower(dui) = lower($1)
            "#,
        )
        .bind(dui)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, nombre, dui, telefono, correo, direccion, foto, rol FROM usuarios WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    // Administradores não aparecem na listagem
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nombre, dui, telefono, correo, direccion, foto, rol
            FROM usuarios
            WHERE rol <> 'admin'
            ORDER BY nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn dui_exists(&self, dui: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM usuarios WHERE lower(dui) = lower($1))")
                .bind(dui)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    // O papel é sempre 'user'; administradores só entram pelo banco ou pela configuração.
    pub async fn create_user(&self, user: &NewUser<'_>) -> Result<i32, AppError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO usuarios (nombre, dui, telefono, correo, direccion, password, rol, foto)
            VALUES ($1, $2, $3, $4, $5, $6, 'user', $7)
            RETURNING id
            "#,
        )
        .bind(user.nombre)
        .bind(user.dui)
        .bind(user.telefono)
        .bind(user.correo)
        .bind(user.direccion)
        .bind(user.password_hash)
        .bind(user.foto)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, USER_UNIQUE))?;
        Ok(id)
    }

    pub async fn update_user(&self, id: i32, changes: &UserChanges<'_>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE usuarios
            SET nombre = $1, telefono = $2, correo = $3, direccion = $4,
                password = COALESCE($5, password),
                foto = COALESCE($6, foto)
            WHERE id = $7
            "#,
        )
        .bind(changes.nombre)
        .bind(changes.telefono)
        .bind(changes.correo)
        .bind(changes.direccion)
        .bind(changes.password_hash)
        .bind(changes.foto)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn has_dispatches(&self, id: i32) -> Result<bool, AppError> {
        let has: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM despachos WHERE usuario_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(has)
    }

    /// Apaga só usuários comuns; devolve 0 para admin ou id inexistente.
    pub async fn delete_user(&self, id: i32) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1 AND rol <> 'admin'")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_foreign_key_violation(e, USER_HAS_DISPATCHES))?;
        Ok(result.rows_affected())
    }
}
