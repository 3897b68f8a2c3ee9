// src/db/invite_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::db_utils::is_foreign_key_violation;
use crate::common::error::AppError;
use crate::db::membership_repo::upsert_active_member;
use crate::models::invite::Invite;
use crate::models::membership::{Membership, Role};

const INVITE_COLUMNS: &str =
    "id, business_id, profile_id, role, invited_by, status, created_at, accepted_at";

#[async_trait]
pub trait InviteRepository: Send + Sync {
    async fn create(
        &self,
        business_id: Uuid,
        profile_id: Uuid,
        role: Role,
        invited_by: Uuid,
    ) -> Result<Invite, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invite>, AppError>;

    /// Marca o convite como aceito e cria/reativa o vínculo na mesma transação.
    /// `None` se o convite já não estava pendente.
    async fn accept(&self, invite: &Invite) -> Result<Option<(Invite, Membership)>, AppError>;
}

#[derive(Clone)]
pub struct PgInviteRepository {
    pool: PgPool,
}

impl PgInviteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteRepository for PgInviteRepository {
    async fn create(
        &self,
        business_id: Uuid,
        profile_id: Uuid,
        role: Role,
        invited_by: Uuid,
    ) -> Result<Invite, AppError> {
        let invite = sqlx::query_as::<_, Invite>(&format!(
            r#"
            INSERT INTO business_invites (business_id, profile_id, role, invited_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {INVITE_COLUMNS}
            "#
        ))
        .bind(business_id)
        .bind(profile_id)
        .bind(role)
        .bind(invited_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound("Perfil não encontrado.".into())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        Ok(invite)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invite>, AppError> {
        let invite = sqlx::query_as::<_, Invite>(&format!(
            "SELECT {INVITE_COLUMNS} FROM business_invites WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invite)
    }

    async fn accept(&self, invite: &Invite) -> Result<Option<(Invite, Membership)>, AppError> {
        let mut tx = self.pool.begin().await?;

        // O filtro por status impede aceitar duas vezes o mesmo convite
        let accepted = sqlx::query_as::<_, Invite>(&format!(
            r#"
            UPDATE business_invites
            SET status = 'accepted', accepted_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {INVITE_COLUMNS}
            "#
        ))
        .bind(invite.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(accepted) = accepted else {
            return Ok(None);
        };

        let member =
            upsert_active_member(&mut *tx, accepted.business_id, accepted.profile_id, accepted.role)
                .await?;

        tx.commit().await?;

        Ok(Some((accepted, member)))
    }
}
