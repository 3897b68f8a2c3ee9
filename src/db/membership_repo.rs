// src/db/membership_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::db_utils::is_foreign_key_violation;
use crate::common::error::AppError;
use crate::models::membership::{Membership, Role};

const MEMBER_COLUMNS: &str =
    "business_id, profile_id, role, is_owner, is_active, created_at, updated_at";

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Vínculo do perfil no negócio, ativo ou não.
    async fn find(&self, business_id: Uuid, profile_id: Uuid)
        -> Result<Option<Membership>, AppError>;

    async fn list_active(&self, business_id: Uuid) -> Result<Vec<Membership>, AppError>;

    /// Abre uma unidade de trabalho. Se o objeto for descartado sem `commit`,
    /// tudo é desfeito.
    async fn begin(&self) -> Result<Box<dyn MembershipTx>, AppError>;
}

#[async_trait]
pub trait MembershipTx: Send {
    /// Lista os vínculos ativos do negócio, travando as linhas até o fim da transação.
    async fn list_active(&mut self, business_id: Uuid) -> Result<Vec<Membership>, AppError>;

    async fn find(&mut self, business_id: Uuid, profile_id: Uuid)
        -> Result<Option<Membership>, AppError>;

    /// Cria o vínculo ou reativa um vínculo desativado.
    async fn upsert_active(
        &mut self,
        business_id: Uuid,
        profile_id: Uuid,
        role: Role,
    ) -> Result<Membership, AppError>;

    async fn update_role(
        &mut self,
        business_id: Uuid,
        profile_id: Uuid,
        role: Role,
    ) -> Result<Option<Membership>, AppError>;

    /// Remoção lógica (is_active = false).
    async fn deactivate(
        &mut self,
        business_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Membership>, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    async fn find(
        &self,
        business_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        find_member(&self.pool, business_id, profile_id).await
    }

    async fn list_active(&self, business_id: Uuid) -> Result<Vec<Membership>, AppError> {
        let members = sqlx::query_as::<_, Membership>(&format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM business_members
            WHERE business_id = $1 AND is_active = TRUE
            ORDER BY created_at
            "#
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    async fn begin(&self) -> Result<Box<dyn MembershipTx>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgMembershipTx { tx }))
    }
}

pub struct PgMembershipTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl MembershipTx for PgMembershipTx {
    async fn list_active(&mut self, business_id: Uuid) -> Result<Vec<Membership>, AppError> {
        // FOR UPDATE: duas remoções simultâneas de donos são serializadas aqui,
        // e a segunda relê a contagem já atualizada.
        let members = sqlx::query_as::<_, Membership>(&format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM business_members
            WHERE business_id = $1 AND is_active = TRUE
            ORDER BY created_at
            FOR UPDATE
            "#
        ))
        .bind(business_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(members)
    }

    async fn find(
        &mut self,
        business_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        find_member(&mut *self.tx, business_id, profile_id).await
    }

    async fn upsert_active(
        &mut self,
        business_id: Uuid,
        profile_id: Uuid,
        role: Role,
    ) -> Result<Membership, AppError> {
        upsert_active_member(&mut *self.tx, business_id, profile_id, role).await
    }

    async fn update_role(
        &mut self,
        business_id: Uuid,
        profile_id: Uuid,
        role: Role,
    ) -> Result<Option<Membership>, AppError> {
        let member = sqlx::query_as::<_, Membership>(&format!(
            r#"
            UPDATE business_members
            SET role = $3, is_owner = ($3 = 'owner'::member_role), updated_at = NOW()
            WHERE business_id = $1 AND profile_id = $2 AND is_active = TRUE
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(business_id)
        .bind(profile_id)
        .bind(role)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(member)
    }

    async fn deactivate(
        &mut self,
        business_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        let member = sqlx::query_as::<_, Membership>(&format!(
            r#"
            UPDATE business_members
            SET is_active = FALSE, updated_at = NOW()
            WHERE business_id = $1 AND profile_id = $2 AND is_active = TRUE
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(business_id)
        .bind(profile_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(member)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}

async fn find_member<'e, E>(
    executor: E,
    business_id: Uuid,
    profile_id: Uuid,
) -> Result<Option<Membership>, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let member = sqlx::query_as::<_, Membership>(&format!(
        "SELECT {MEMBER_COLUMNS} FROM business_members WHERE business_id = $1 AND profile_id = $2"
    ))
    .bind(business_id)
    .bind(profile_id)
    .fetch_optional(executor)
    .await?;

    Ok(member)
}

/// Usado também pelo aceite de convite, dentro da transação dele.
/// Um vínculo já ativo nunca é sobrescrito: vira `Conflict`.
pub(crate) async fn upsert_active_member<'e, E>(
    executor: E,
    business_id: Uuid,
    profile_id: Uuid,
    role: Role,
) -> Result<Membership, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let member = sqlx::query_as::<_, Membership>(&format!(
        r#"
        INSERT INTO business_members (business_id, profile_id, role, is_owner, is_active)
        VALUES ($1, $2, $3, ($3 = 'owner'::member_role), TRUE)
        ON CONFLICT (business_id, profile_id)
        DO UPDATE SET
            role = EXCLUDED.role,
            is_owner = EXCLUDED.is_owner,
            is_active = TRUE,
            updated_at = NOW()
        WHERE business_members.is_active = FALSE
        RETURNING {MEMBER_COLUMNS}
        "#
    ))
    .bind(business_id)
    .bind(profile_id)
    .bind(role)
    .fetch_optional(executor)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::NotFound("Perfil não encontrado.".into())
        } else {
            AppError::DatabaseError(e)
        }
    })?;

    member.ok_or_else(|| AppError::Conflict("Este perfil já é membro do negócio.".into()))
}
