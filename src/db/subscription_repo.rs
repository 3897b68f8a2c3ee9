// src/db/subscription_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::{db_utils::is_unique_violation, error::AppError};
use crate::models::subscription::{Plan, Subscription, SubscriptionStatus, SubscriptionWithPlan};

const PLAN_COLUMNS: &str = "id, name, price, duration, is_active, created_at";
const SUBSCRIPTION_COLUMNS: &str =
    "id, business_id, plan_id, status, starts_at, expires_at, created_at, updated_at";

// Nome do índice parcial criado na migration
const ONE_ACTIVE_INDEX: &str = "subscriptions_one_active_per_business";

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn list_active_plans(&self) -> Result<Vec<Plan>, AppError>;

    /// Assinatura ativa e não vencida, com os dados do plano.
    async fn find_current(
        &self,
        business_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SubscriptionWithPlan>, AppError>;

    async fn begin(&self) -> Result<Box<dyn SubscriptionTx>, AppError>;
}

#[async_trait]
pub trait SubscriptionTx: Send {
    async fn find_plan(&mut self, plan_id: Uuid) -> Result<Option<Plan>, AppError>;

    /// Move para `expired` as assinaturas cujo prazo já passou. Devolve quantas.
    async fn expire_lapsed(&mut self, business_id: Uuid, now: DateTime<Utc>)
        -> Result<u64, AppError>;

    async fn find_active(
        &mut self,
        business_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Subscription>, AppError>;

    /// Insere com status `active`. Outra assinatura ativa no mesmo negócio vira `Conflict`.
    async fn insert_active(
        &mut self,
        business_id: Uuid,
        plan_id: Uuid,
        starts_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Subscription, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn list_active_plans(&self) -> Result<Vec<Plan>, AppError> {
        let plans = sqlx::query_as::<_, Plan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE is_active = TRUE ORDER BY price"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    async fn find_current(
        &self,
        business_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SubscriptionWithPlan>, AppError> {
        let current = sqlx::query_as::<_, SubscriptionWithPlan>(
            r#"
            SELECT
                s.id, s.business_id, s.plan_id, s.status, s.starts_at, s.expires_at,
                s.created_at, s.updated_at,
                p.name AS plan_name,
                p.price AS plan_price,
                p.duration AS plan_duration
            FROM subscriptions s
            JOIN plans p ON p.id = s.plan_id
            WHERE s.business_id = $1
              AND s.status = 'active'
              AND s.expires_at > $2
            "#,
        )
        .bind(business_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(current)
    }

    async fn begin(&self) -> Result<Box<dyn SubscriptionTx>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSubscriptionTx { tx }))
    }
}

pub struct PgSubscriptionTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SubscriptionTx for PgSubscriptionTx {
    async fn find_plan(&mut self, plan_id: Uuid) -> Result<Option<Plan>, AppError> {
        let plan = sqlx::query_as::<_, Plan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE id = $1"
        ))
        .bind(plan_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(plan)
    }

    async fn expire_lapsed(
        &mut self,
        business_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let expirable: Vec<String> = SubscriptionStatus::expirable()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'expired', updated_at = NOW()
            WHERE business_id = $1
              AND status::text = ANY($2)
              AND expires_at <= $3
            "#,
        )
        .bind(business_id)
        .bind(expirable)
        .bind(now)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn find_active(
        &mut self,
        business_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Subscription>, AppError> {
        let active = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE business_id = $1 AND status = 'active' AND expires_at > $2
            "#
        ))
        .bind(business_id)
        .bind(now)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(active)
    }

    async fn insert_active(
        &mut self,
        business_id: Uuid,
        plan_id: Uuid,
        starts_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Subscription, AppError> {
        sqlx::query_as::<_, Subscription>(&format!(
            r#"
            INSERT INTO subscriptions (business_id, plan_id, status, starts_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        ))
        .bind(business_id)
        .bind(plan_id)
        .bind(SubscriptionStatus::Active)
        .bind(starts_at)
        .bind(expires_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            // Outra ativação concorrente chegou primeiro
            if is_unique_violation(&e, Some(ONE_ACTIVE_INDEX)) {
                return AppError::Conflict("O negócio já possui uma assinatura ativa.".into());
            }
            e.into()
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
