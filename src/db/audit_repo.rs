// src/db/audit_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::audit::{AuditLog, AuditLogQuery, NewAuditLog};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn create(&self, entry: &NewAuditLog) -> Result<(), AppError>;

    /// Entradas do negócio e dos catálogos dele, mais recentes primeiro.
    async fn list_for_business(
        &self,
        business_id: Uuid,
        query: &AuditLogQuery,
    ) -> Result<Vec<AuditLog>, AppError>;
}

#[derive(Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn create(&self, entry: &NewAuditLog) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                actor_id, subject_id, audit_type, action, table_name,
                record_id, old_data, new_data, reason
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.actor_id)
        .bind(entry.subject_id)
        .bind(&entry.audit_type)
        .bind(&entry.action)
        .bind(&entry.table_name)
        .bind(entry.record_id)
        .bind(&entry.old_data)
        .bind(&entry.new_data)
        .bind(&entry.reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_business(
        &self,
        business_id: Uuid,
        query: &AuditLogQuery,
    ) -> Result<Vec<AuditLog>, AppError> {
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, created_at, actor_id, subject_id, audit_type, action, table_name,
                   record_id, old_data, new_data, reason
            FROM audit_logs
            WHERE subject_id = $1
               OR subject_id IN (SELECT id FROM catalogs WHERE business_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(business_id)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
