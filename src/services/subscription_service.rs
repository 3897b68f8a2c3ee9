// src/services/subscription_service.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::audit::AuditContext;
use crate::common::error::AppError;
use crate::db::SubscriptionRepository;
use crate::models::subscription::{Plan, SubscriptionWithPlan};
use crate::services::membership_guard::MembershipGuard;
use crate::services::permissions::{SUBSCRIPTION_UPDATE, SUBSCRIPTION_VIEW};

#[derive(Clone)]
pub struct SubscriptionService {
    guard: MembershipGuard,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(guard: MembershipGuard, subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self {
            guard,
            subscriptions,
        }
    }

    pub async fn list_plans(&self) -> Result<Vec<Plan>, AppError> {
        self.subscriptions.list_active_plans().await
    }

    /// Assinatura vigente do negócio (ativa e dentro do prazo).
    pub async fn current(
        &self,
        business_id: Uuid,
        acting_profile_id: Uuid,
    ) -> Result<SubscriptionWithPlan, AppError> {
        self.guard
            .authorize(business_id, acting_profile_id, SUBSCRIPTION_VIEW)
            .await?;

        let now = Utc::now();
        self.subscriptions
            .find_current(business_id, now)
            .await?
            .filter(|current| current.subscription.is_current(now))
            .ok_or_else(|| {
                AppError::NotFound("Nenhuma assinatura ativa para este negócio.".into())
            })
    }

    /// Caso de uso exposto pela API: checa `subscription:update` e registra
    /// a auditoria com o negócio (que vem no corpo) como sujeito.
    pub async fn activate_as(
        &self,
        acting_profile_id: Uuid,
        business_id: Uuid,
        plan_id: Uuid,
        audit: &mut AuditContext,
    ) -> Result<SubscriptionWithPlan, AppError> {
        self.guard
            .authorize(business_id, acting_profile_id, SUBSCRIPTION_UPDATE)
            .await?;

        audit.set_subject(business_id);
        let activated = self.activate(business_id, plan_id).await?;
        audit.capture_new(&activated);
        Ok(activated)
    }

    /// Ativa o plano para o negócio. Tudo acontece numa única transação:
    /// qualquer erro antes do commit desfaz as escritas.
    pub async fn activate(
        &self,
        business_id: Uuid,
        plan_id: Uuid,
    ) -> Result<SubscriptionWithPlan, AppError> {
        let mut tx = self.subscriptions.begin().await?;

        let plan = tx
            .find_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plano não encontrado.".into()))?;
        if !plan.is_active {
            return Err(AppError::InvalidPlan(format!(
                "O plano '{}' não está disponível.",
                plan.name
            )));
        }

        let now = Utc::now();
        let expired = tx.expire_lapsed(business_id, now).await?;
        if expired > 0 {
            tracing::info!(%business_id, expired, "⌛ Assinaturas vencidas marcadas como expired");
        }

        if tx.find_active(business_id, now).await?.is_some() {
            return Err(AppError::Conflict(
                "O negócio já possui uma assinatura ativa.".into(),
            ));
        }

        let expires_at = now + Duration::days(plan.duration_days());
        let subscription = tx
            .insert_active(business_id, plan.id, now, expires_at)
            .await?;
        tx.commit().await?;

        tracing::info!(
            %business_id,
            subscription_id = %subscription.id,
            plan = %plan.name,
            %expires_at,
            "💳 Assinatura ativada"
        );

        Ok(SubscriptionWithPlan::new(subscription, &plan))
    }
}
