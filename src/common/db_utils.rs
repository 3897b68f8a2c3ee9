// Helpers compartilhados pelos repositórios Postgres.

/// Verifica se o erro do sqlx é uma violação de chave única.
/// Quando `constraint` é informado, só aceita aquele índice/constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: Option<&str>) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.is_unique_violation() {
            return match constraint {
                Some(name) => db_err.constraint() == Some(name),
                None => true,
            };
        }
    }
    false
}

/// Violação de chave estrangeira (ex.: perfil inexistente).
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}
