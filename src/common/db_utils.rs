use crate::common::error::AppError;

// ---
// Tradução de violações de constraint
// ---
// A checagem prévia (SELECT antes do INSERT) gera a mensagem amigável; o índice
// único é quem garante a invariante quando duas requisições correm juntas.

/// Converte um erro do banco em `AppError`, trocando violações de unicidade
/// pela mensagem cadastrada para o índice correspondente.
pub(crate) fn map_unique_violation(e: sqlx::Error, messages: &[(&str, &str)]) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if let Some((_, message)) = messages.iter().find(|(name, _)| *name == constraint) {
                return AppError::business(*message);
            }
            return AppError::business("El registro ya existe");
        }
    }
    AppError::DatabaseError(e)
}

/// Exclusões bloqueadas por chave estrangeira viram regra de negócio.
pub(crate) fn map_foreign_key_violation(e: sqlx::Error, message: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return AppError::business(message);
        }
    }
    AppError::DatabaseError(e)
}
