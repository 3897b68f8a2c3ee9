// src/services/membership_service.rs

use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::audit::AuditContext;
use crate::common::error::AppError;
use crate::db::MembershipRepository;
use crate::models::membership::{AddMemberPayload, Membership, Role, UpdateRolePayload};
use crate::services::membership_guard::{require_permission, MembershipGuard};
use crate::services::owner_invariant;
use crate::services::permissions::{self, USER_INVITE, USER_REMOVE, USER_UPDATE, USER_VIEW};

#[derive(Clone)]
pub struct MembershipService {
    guard: MembershipGuard,
    members: Arc<dyn MembershipRepository>,
}

impl MembershipService {
    pub fn new(guard: MembershipGuard, members: Arc<dyn MembershipRepository>) -> Self {
        Self { guard, members }
    }

    pub async fn list_members(
        &self,
        business_id: Uuid,
        acting_profile_id: Uuid,
    ) -> Result<Vec<Membership>, AppError> {
        self.guard
            .authorize(business_id, acting_profile_id, USER_VIEW)
            .await?;
        self.members.list_active(business_id).await
    }

    /// Adiciona (ou reativa) um membro diretamente, sem convite.
    pub async fn add_member(
        &self,
        business_id: Uuid,
        acting_profile_id: Uuid,
        payload: AddMemberPayload,
        audit: &mut AuditContext,
    ) -> Result<Membership, AppError> {
        payload.validate()?;
        let role = Role::from_str(&payload.role)?;

        let acting = self
            .guard
            .authorize(business_id, acting_profile_id, USER_INVITE)
            .await?;
        check_can_grant(&acting, role)?;

        let mut tx = self.members.begin().await?;

        if let Some(existing) = tx.find(business_id, payload.profile_id).await? {
            if existing.is_active {
                return Err(AppError::Conflict(
                    "Este perfil já é membro do negócio.".into(),
                ));
            }
            audit.capture_old(&existing);
        }

        let member = tx.upsert_active(business_id, payload.profile_id, role).await?;
        tx.commit().await?;

        tracing::info!(
            %business_id,
            profile_id = %member.profile_id,
            role = %member.role,
            "👤 Membro adicionado"
        );

        audit.set_record(member.profile_id);
        audit.capture_new(&member);
        Ok(member)
    }

    pub async fn update_role(
        &self,
        business_id: Uuid,
        acting_profile_id: Uuid,
        target_profile_id: Uuid,
        payload: UpdateRolePayload,
        audit: &mut AuditContext,
    ) -> Result<Membership, AppError> {
        payload.validate()?;
        let new_role = Role::from_str(&payload.role)?;

        let acting = self
            .guard
            .active_membership(business_id, acting_profile_id)
            .await?;

        let mut tx = self.members.begin().await?;
        let active = tx.list_active(business_id).await?;
        let target = find_target(&active, target_profile_id)?;

        // Invariantes de dono antes da matriz: a resposta é Validation
        // qualquer que seja o cargo de quem chama.
        owner_invariant::check_role_change(acting_profile_id, &target, new_role, &active)?;
        require_permission(&acting, USER_UPDATE)?;
        check_can_manage(&acting, &target)?;
        check_can_grant(&acting, new_role)?;

        audit.set_record(target_profile_id);
        audit.set_reason(payload.reason);
        audit.capture_old(&target);

        let updated = tx
            .update_role(business_id, target_profile_id, new_role)
            .await?
            .ok_or_else(|| AppError::NotFound("Membro não encontrado.".into()))?;
        tx.commit().await?;

        tracing::info!(
            %business_id,
            profile_id = %target_profile_id,
            from = %target.role,
            to = %updated.role,
            "🔁 Cargo alterado"
        );

        audit.capture_new(&updated);
        Ok(updated)
    }

    pub async fn remove_member(
        &self,
        business_id: Uuid,
        acting_profile_id: Uuid,
        target_profile_id: Uuid,
        reason: Option<String>,
        audit: &mut AuditContext,
    ) -> Result<Membership, AppError> {
        let acting = self
            .guard
            .active_membership(business_id, acting_profile_id)
            .await?;

        let mut tx = self.members.begin().await?;
        let active = tx.list_active(business_id).await?;
        let target = find_target(&active, target_profile_id)?;

        owner_invariant::check_removal(acting_profile_id, &target, &active)?;
        require_permission(&acting, USER_REMOVE)?;
        check_can_manage(&acting, &target)?;

        audit.set_record(target_profile_id);
        audit.set_reason(reason);
        audit.capture_old(&target);

        let removed = tx
            .deactivate(business_id, target_profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membro não encontrado.".into()))?;
        tx.commit().await?;

        tracing::info!(%business_id, profile_id = %target_profile_id, "🚪 Membro removido");

        audit.capture_new(&removed);
        Ok(removed)
    }
}

fn find_target(active: &[Membership], profile_id: Uuid) -> Result<Membership, AppError> {
    active
        .iter()
        .find(|m| m.profile_id == profile_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Membro não encontrado.".into()))
}

/// Ninguém concede um cargo acima do próprio. Só um dono cria outro dono.
pub(crate) fn check_can_grant(acting: &Membership, role: Role) -> Result<(), AppError> {
    if !permissions::role_at_least(acting.role, role) {
        return Err(AppError::Forbidden(format!(
            "Você não pode conceder o cargo '{}'.",
            role
        )));
    }
    Ok(())
}

fn check_can_manage(acting: &Membership, target: &Membership) -> Result<(), AppError> {
    if !permissions::role_at_least(acting.role, target.role) {
        return Err(AppError::Forbidden(
            "Você não pode alterar um membro com cargo superior ao seu.".into(),
        ));
    }
    Ok(())
}
