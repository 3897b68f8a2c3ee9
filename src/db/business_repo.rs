// src/db/business_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::business::Business;
use crate::models::membership::Role;

const BUSINESS_COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Cria o negócio e o vínculo de dono do criador na MESMA transação.
    async fn create_with_owner(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: Uuid,
    ) -> Result<Business, AppError>;

    /// Somente negócios ativos.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Business>, AppError>;

    async fn list_for_profile(&self, profile_id: Uuid) -> Result<Vec<Business>, AppError>;

    /// `None` quando nenhuma linha foi afetada.
    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Business>, AppError>;

    async fn deactivate(&self, id: Uuid) -> Result<Option<Business>, AppError>;
}

#[derive(Clone)]
pub struct PgBusinessRepository {
    pool: PgPool,
}

impl PgBusinessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessRepository for PgBusinessRepository {
    async fn create_with_owner(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: Uuid,
    ) -> Result<Business, AppError> {
        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o negócio
        let business = sqlx::query_as::<_, Business>(&format!(
            r#"
            INSERT INTO businesses (name, description)
            VALUES ($1, $2)
            RETURNING {BUSINESS_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        // 3. O criador entra como dono. Sem isto o negócio nasceria sem dono.
        sqlx::query(
            r#"
            INSERT INTO business_members (business_id, profile_id, role, is_owner, is_active)
            VALUES ($1, $2, $3, TRUE, TRUE)
            "#,
        )
        .bind(business.id)
        .bind(owner_id)
        .bind(Role::Owner)
        .execute(&mut *tx)
        .await?;

        // 4. Commit
        tx.commit().await?;

        Ok(business)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Business>, AppError> {
        let business = sqlx::query_as::<_, Business>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }

    async fn list_for_profile(&self, profile_id: Uuid) -> Result<Vec<Business>, AppError> {
        let businesses = sqlx::query_as::<_, Business>(
            r#"
            SELECT b.id, b.name, b.description, b.is_active, b.created_at, b.updated_at
            FROM businesses b
            JOIN business_members m ON m.business_id = b.id
            WHERE m.profile_id = $1
              AND m.is_active = TRUE
              AND b.is_active = TRUE
            ORDER BY b.name
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(businesses)
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Business>, AppError> {
        let business = sqlx::query_as::<_, Business>(&format!(
            r#"
            UPDATE businesses
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING {BUSINESS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<Business>, AppError> {
        let business = sqlx::query_as::<_, Business>(&format!(
            r#"
            UPDATE businesses
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING {BUSINESS_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }
}
