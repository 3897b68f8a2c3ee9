// src/services/audit_log_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::AuditRepository;
use crate::models::audit::{AuditLog, AuditLogQuery};
use crate::services::membership_guard::MembershipGuard;
use crate::services::permissions::BUSINESS_UPDATE;

// Consulta da trilha. A escrita fica com o despachante de auditoria.
#[derive(Clone)]
pub struct AuditLogService {
    guard: MembershipGuard,
    audit_repo: Arc<dyn AuditRepository>,
}

impl AuditLogService {
    pub fn new(guard: MembershipGuard, audit_repo: Arc<dyn AuditRepository>) -> Self {
        Self { guard, audit_repo }
    }

    pub async fn list(
        &self,
        business_id: Uuid,
        acting_profile_id: Uuid,
        query: AuditLogQuery,
    ) -> Result<Vec<AuditLog>, AppError> {
        self.guard
            .authorize(business_id, acting_profile_id, BUSINESS_UPDATE)
            .await?;
        self.audit_repo.list_for_business(business_id, &query).await
    }
}
