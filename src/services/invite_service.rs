// src/services/invite_service.rs

use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

use crate::audit::AuditContext;
use crate::common::error::AppError;
use crate::db::{InviteRepository, MembershipRepository};
use crate::models::invite::{CreateInvitePayload, Invite, InviteStatus};
use crate::models::membership::{Membership, Role};
use crate::services::membership_guard::MembershipGuard;
use crate::services::membership_service::check_can_grant;
use crate::services::permissions::USER_INVITE;

#[derive(Clone)]
pub struct InviteService {
    guard: MembershipGuard,
    members: Arc<dyn MembershipRepository>,
    invites: Arc<dyn InviteRepository>,
}

impl InviteService {
    pub fn new(
        guard: MembershipGuard,
        members: Arc<dyn MembershipRepository>,
        invites: Arc<dyn InviteRepository>,
    ) -> Self {
        Self {
            guard,
            members,
            invites,
        }
    }

    pub async fn create(
        &self,
        business_id: Uuid,
        acting_profile_id: Uuid,
        payload: CreateInvitePayload,
        audit: &mut AuditContext,
    ) -> Result<Invite, AppError> {
        let role = Role::from_str(&payload.role)?;
        let acting = self
            .guard
            .authorize(business_id, acting_profile_id, USER_INVITE)
            .await?;
        check_can_grant(&acting, role)?;

        if let Some(existing) = self.members.find(business_id, payload.profile_id).await? {
            if existing.is_active {
                return Err(AppError::Conflict(
                    "Este perfil já é membro do negócio.".into(),
                ));
            }
        }

        let invite = self
            .invites
            .create(business_id, payload.profile_id, role, acting_profile_id)
            .await?;

        tracing::info!(
            %business_id,
            invite_id = %invite.id,
            profile_id = %invite.profile_id,
            role = %invite.role,
            "✉️ Convite criado"
        );
        audit.capture_new(&invite);
        Ok(invite)
    }

    /// Só o perfil convidado aceita. O negócio do convite vira o sujeito da auditoria.
    /// Quem já é membro ativo não é tocado: o cargo só muda pelas regras de
    /// `update_role`.
    pub async fn accept(
        &self,
        acting_profile_id: Uuid,
        invite_id: Uuid,
        audit: &mut AuditContext,
    ) -> Result<Membership, AppError> {
        let invite = self
            .invites
            .find_by_id(invite_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Convite não encontrado.".into()))?;

        if invite.profile_id != acting_profile_id {
            return Err(AppError::Forbidden(
                "Este convite pertence a outro perfil.".into(),
            ));
        }
        if invite.status != InviteStatus::Pending {
            return Err(already_used());
        }
        self.guard.active_business(invite.business_id).await?;

        if let Some(previous) = self.members.find(invite.business_id, invite.profile_id).await? {
            if previous.is_active {
                return Err(AppError::Conflict(
                    "Este perfil já é membro do negócio.".into(),
                ));
            }
            audit.capture_old(&previous);
        }

        let (accepted, member) = self
            .invites
            .accept(&invite)
            .await?
            .ok_or_else(already_used)?;

        tracing::info!(
            business_id = %accepted.business_id,
            invite_id = %accepted.id,
            "🤝 Convite aceito"
        );

        audit.set_subject(accepted.business_id);
        audit.set_record(member.profile_id);
        audit.capture_new(&member);
        Ok(member)
    }
}

fn already_used() -> AppError {
    AppError::Conflict("Este convite já foi utilizado.".into())
}
