// src/services/business_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::audit::AuditContext;
use crate::common::error::AppError;
use crate::db::BusinessRepository;
use crate::models::business::{Business, CreateBusinessPayload, UpdateBusinessPayload};
use crate::services::membership_guard::MembershipGuard;
use crate::services::permissions::{BUSINESS_DELETE, BUSINESS_UPDATE, BUSINESS_VIEW};

#[derive(Clone)]
pub struct BusinessService {
    guard: MembershipGuard,
    businesses: Arc<dyn BusinessRepository>,
}

impl BusinessService {
    pub fn new(guard: MembershipGuard, businesses: Arc<dyn BusinessRepository>) -> Self {
        Self { guard, businesses }
    }

    /// Cria o negócio; quem cria vira o primeiro dono.
    pub async fn create(
        &self,
        owner_id: Uuid,
        payload: CreateBusinessPayload,
        audit: &mut AuditContext,
    ) -> Result<Business, AppError> {
        payload.validate()?;

        let business = self
            .businesses
            .create_with_owner(payload.name.trim(), payload.description.as_deref(), owner_id)
            .await?;

        tracing::info!(business_id = %business.id, %owner_id, "🏪 Negócio criado");
        audit.capture_new(&business);
        Ok(business)
    }

    pub async fn list_mine(&self, profile_id: Uuid) -> Result<Vec<Business>, AppError> {
        self.businesses.list_for_profile(profile_id).await
    }

    pub async fn get(&self, business_id: Uuid, acting_profile_id: Uuid) -> Result<Business, AppError> {
        self.guard
            .authorize(business_id, acting_profile_id, BUSINESS_VIEW)
            .await?;
        self.load(business_id).await
    }

    pub async fn update(
        &self,
        business_id: Uuid,
        acting_profile_id: Uuid,
        payload: UpdateBusinessPayload,
        audit: &mut AuditContext,
    ) -> Result<Business, AppError> {
        payload.validate()?;
        self.guard
            .authorize(business_id, acting_profile_id, BUSINESS_UPDATE)
            .await?;

        let current = self.load(business_id).await?;
        audit.capture_old(&current);

        let updated = self
            .businesses
            .update(
                business_id,
                payload.name.as_deref().map(str::trim),
                payload.description.as_deref(),
            )
            .await?
            .ok_or_else(not_found)?;

        audit.capture_new(&updated);
        Ok(updated)
    }

    /// Desativação lógica.
    pub async fn delete(
        &self,
        business_id: Uuid,
        acting_profile_id: Uuid,
        audit: &mut AuditContext,
    ) -> Result<Business, AppError> {
        self.guard
            .authorize(business_id, acting_profile_id, BUSINESS_DELETE)
            .await?;

        let current = self.load(business_id).await?;
        audit.capture_old(&current);

        let removed = self
            .businesses
            .deactivate(business_id)
            .await?
            .ok_or_else(not_found)?;

        tracing::info!(%business_id, "🗑️ Negócio desativado");
        audit.capture_new(&removed);
        Ok(removed)
    }

    async fn load(&self, business_id: Uuid) -> Result<Business, AppError> {
        self.businesses
            .find_by_id(business_id)
            .await?
            .ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Negócio não encontrado.".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::MembershipRepository;
    use crate::models::membership::Role;

    fn service(store: &MemoryStore) -> BusinessService {
        let members: Arc<dyn MembershipRepository> = Arc::new(store.clone());
        let guard = MembershipGuard::new(members, Arc::new(store.clone()));
        BusinessService::new(guard, Arc::new(store.clone()))
    }

    fn create_payload(name: &str) -> CreateBusinessPayload {
        CreateBusinessPayload {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn creator_becomes_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        let mut audit = AuditContext::for_actor(owner);
        let business = service(&store)
            .create(owner, create_payload("Padaria"), &mut audit)
            .await
            .unwrap();

        let member = store.member(business.id, owner).unwrap();
        assert!(member.is_active_owner());
        assert_eq!(member.role, Role::Owner);
        assert!(audit.old_data().is_none());
        assert_eq!(audit.new_data().unwrap()["name"], "Padaria");
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let store = MemoryStore::new();
        let mut audit = AuditContext::default();
        let result = service(&store)
            .create(Uuid::new_v4(), create_payload(""), &mut audit)
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn update_keeps_before_and_after() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let svc = service(&store);
        let mut audit = AuditContext::for_actor(owner);
        let business = svc.create(owner, create_payload("Antigo"), &mut audit).await.unwrap();

        let mut audit = AuditContext::for_actor(owner);
        let payload = UpdateBusinessPayload {
            name: Some("Novo".into()),
            description: None,
        };
        svc.update(business.id, owner, payload, &mut audit).await.unwrap();

        assert_eq!(audit.old_data().unwrap()["name"], "Antigo");
        assert_eq!(audit.new_data().unwrap()["name"], "Novo");
    }

    #[tokio::test]
    async fn only_owner_can_delete() {
        let store = MemoryStore::new();
        let (owner, admin) = (Uuid::new_v4(), Uuid::new_v4());
        let svc = service(&store);
        let mut audit = AuditContext::for_actor(owner);
        let business = svc.create(owner, create_payload("Loja"), &mut audit).await.unwrap();
        store.seed_member(business.id, admin, Role::Admin);

        let mut audit = AuditContext::for_actor(admin);
        let denied = svc.delete(business.id, admin, &mut audit).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let mut audit = AuditContext::for_actor(owner);
        let removed = svc.delete(business.id, owner, &mut audit).await.unwrap();
        assert!(!removed.is_active);

        let gone = svc.get(business.id, owner).await;
        assert!(matches!(gone, Err(AppError::NotFound(_))));

        let payload = UpdateBusinessPayload {
            name: Some("Reaberta".into()),
            description: None,
        };
        let updated = svc.update(business.id, owner, payload, &mut audit).await;
        assert!(matches!(updated, Err(AppError::NotFound(_))));

        let again = svc.delete(business.id, owner, &mut audit).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
        assert_eq!(store.business(business.id).unwrap().name, "Loja");
    }

    #[tokio::test]
    async fn list_mine_only_returns_memberships() {
        let store = MemoryStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let svc = service(&store);
        let mut audit = AuditContext::default();
        svc.create(alice, create_payload("A"), &mut audit).await.unwrap();
        svc.create(bob, create_payload("B"), &mut audit).await.unwrap();

        let mine = svc.list_mine(alice).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "A");
    }
}
