// src/db/profile_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::is_unique_violation, error::AppError},
    models::auth::Profile,
};

const PROFILE_COLUMNS: &str = "id, email, display_name, password_hash, created_at, updated_at";

// O repositório de perfis, responsável por todas as interações com a tabela 'profiles'
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um perfil pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        let maybe_profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_profile)
    }

    // Busca um perfil pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let maybe_profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_profile)
    }

    // Cria um novo perfil, com tratamento específico para e-mails duplicados.
    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        display_name: Option<&str>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (email, password_hash, display_name)
            VALUES ($1, $2, $3)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, Some("profiles_email_key")) {
                return AppError::EmailAlreadyExists;
            }
            e.into()
        })?;

        Ok(profile)
    }
}
