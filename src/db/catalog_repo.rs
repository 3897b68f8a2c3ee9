// src/db/catalog_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::catalog::{Catalog, CreateCatalogPayload, UpdateCatalogPayload};

const CATALOG_COLUMNS: &str =
    "id, business_id, name, description, is_published, is_active, created_at, updated_at";

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create(
        &self,
        business_id: Uuid,
        input: &CreateCatalogPayload,
    ) -> Result<Catalog, AppError>;

    /// Somente catálogos ativos.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Catalog>, AppError>;

    async fn update(
        &self,
        id: Uuid,
        input: &UpdateCatalogPayload,
    ) -> Result<Option<Catalog>, AppError>;

    async fn deactivate(&self, id: Uuid) -> Result<Option<Catalog>, AppError>;
}

#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn create(
        &self,
        business_id: Uuid,
        input: &CreateCatalogPayload,
    ) -> Result<Catalog, AppError> {
        let catalog = sqlx::query_as::<_, Catalog>(&format!(
            r#"
            INSERT INTO catalogs (business_id, name, description, is_published)
            VALUES ($1, $2, $3, $4)
            RETURNING {CATALOG_COLUMNS}
            "#
        ))
        .bind(business_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_published)
        .fetch_one(&self.pool)
        .await?;

        Ok(catalog)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Catalog>, AppError> {
        let catalog = sqlx::query_as::<_, Catalog>(&format!(
            "SELECT {CATALOG_COLUMNS} FROM catalogs WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(catalog)
    }

    async fn update(
        &self,
        id: Uuid,
        input: &UpdateCatalogPayload,
    ) -> Result<Option<Catalog>, AppError> {
        let catalog = sqlx::query_as::<_, Catalog>(&format!(
            r#"
            UPDATE catalogs
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_published = COALESCE($4, is_published),
                updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING {CATALOG_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_published)
        .fetch_optional(&self.pool)
        .await?;

        Ok(catalog)
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<Catalog>, AppError> {
        let catalog = sqlx::query_as::<_, Catalog>(&format!(
            r#"
            UPDATE catalogs
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING {CATALOG_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(catalog)
    }
}
