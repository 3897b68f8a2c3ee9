// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProfileRepository,
    models::auth::{Claims, Profile},
};

#[derive(Clone)]
pub struct AuthService {
    profile_repo: ProfileRepository,
    jwt_secret: String,
    pool: sqlx::PgPool,
}

impl AuthService {
    pub fn new(profile_repo: ProfileRepository, jwt_secret: String, pool: sqlx::PgPool) -> Self {
        Self {
            profile_repo,
            jwt_secret,
            pool,
        }
    }

    pub async fn register_profile(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<String, AppError> {
        // bcrypt é caro: roda fora do runtime assíncrono
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let profile = self
            .profile_repo
            .create_profile(&self.pool, email, &hashed_password, display_name)
            .await?;

        tracing::info!(profile_id = %profile.id, "🆕 Perfil registrado");
        self.create_token(profile.id)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let profile = self
            .profile_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = profile.password_hash.clone();

        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(profile.id)
    }

    /// Decodifica o token e carrega o perfil. Perfil apagado conta como token inválido.
    pub async fn validate_token(&self, token: &str) -> Result<Profile, AppError> {
        let profile_id = decode_subject(token, &self.jwt_secret)?;

        self.profile_repo
            .find_by_id(profile_id)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, profile_id: Uuid) -> Result<String, AppError> {
        issue_token(profile_id, &self.jwt_secret)
    }
}

fn issue_token(profile_id: Uuid, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(7);

    let claims = Claims {
        sub: profile_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

fn decode_subject(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    Ok(token_data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_subject() {
        let profile_id = Uuid::new_v4();
        let token = issue_token(profile_id, "segredo").unwrap();
        assert_eq!(decode_subject(&token, "segredo").unwrap(), profile_id);
    }

    #[test]
    fn wrong_secret_is_invalid_token() {
        let token = issue_token(Uuid::new_v4(), "segredo").unwrap();
        assert!(matches!(
            decode_subject(&token, "outro"),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            decode_subject("lixo", "segredo"),
            Err(AppError::InvalidToken)
        ));
    }
}
