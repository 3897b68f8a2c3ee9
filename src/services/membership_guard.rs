// src/services/membership_guard.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{BusinessRepository, MembershipRepository};
use crate::models::business::Business;
use crate::models::membership::Membership;
use crate::services::permissions;

/// Porteiro de toda operação que altera um negócio ou seus catálogos.
/// Apenas lê; nunca altera estado.
#[derive(Clone)]
pub struct MembershipGuard {
    members: Arc<dyn MembershipRepository>,
    businesses: Arc<dyn BusinessRepository>,
}

impl MembershipGuard {
    pub fn new(
        members: Arc<dyn MembershipRepository>,
        businesses: Arc<dyn BusinessRepository>,
    ) -> Self {
        Self {
            members,
            businesses,
        }
    }

    /// Negócio ativo, ou `NotFound`. Um negócio desativado não aceita mais
    /// alterações nem expõe seus catálogos.
    pub async fn active_business(&self, business_id: Uuid) -> Result<Business, AppError> {
        self.businesses
            .find_by_id(business_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Negócio não encontrado.".into()))
    }

    /// Vínculo ativo do perfil no negócio, ou `Forbidden`.
    pub async fn active_membership(
        &self,
        business_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Membership, AppError> {
        self.active_business(business_id).await?;

        match self.members.find(business_id, profile_id).await? {
            Some(member) if member.is_active => Ok(member),
            _ => Err(AppError::Forbidden(
                "Você não faz parte deste negócio.".into(),
            )),
        }
    }

    pub async fn authorize(
        &self,
        business_id: Uuid,
        profile_id: Uuid,
        permission: &str,
    ) -> Result<Membership, AppError> {
        let member = self.active_membership(business_id, profile_id).await?;
        require_permission(&member, permission)?;
        Ok(member)
    }
}

/// Checagem da matriz sobre um vínculo já resolvido.
pub fn require_permission(member: &Membership, permission: &str) -> Result<(), AppError> {
    if !permissions::role_has_permission(member.role, permission) {
        tracing::debug!(
            business_id = %member.business_id,
            profile_id = %member.profile_id,
            role = %member.role,
            permission,
            "permissão negada"
        );
        return Err(AppError::Forbidden(format!(
            "Você precisa da permissão '{}' para realizar esta ação.",
            permission
        )));
    }
    Ok(())
}
