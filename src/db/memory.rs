// src/db/memory.rs
//
// Implementações em memória dos repositórios, usadas nos testes dos serviços.
// Cada transação trabalha numa cópia do estado; `commit` publica a cópia e
// descartar a transação equivale a um rollback. Se outra escrita foi
// publicada depois do `begin`, o `commit` falha em vez de sobrescrevê-la.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::audit_repo::AuditRepository;
use crate::db::business_repo::BusinessRepository;
use crate::db::catalog_repo::CatalogRepository;
use crate::db::invite_repo::InviteRepository;
use crate::db::membership_repo::{MembershipRepository, MembershipTx};
use crate::db::subscription_repo::{SubscriptionRepository, SubscriptionTx};
use crate::models::audit::{AuditLog, AuditLogQuery, NewAuditLog};
use crate::models::business::Business;
use crate::models::catalog::{Catalog, CreateCatalogPayload, UpdateCatalogPayload};
use crate::models::invite::{Invite, InviteStatus};
use crate::models::membership::{Membership, Role};
use crate::models::subscription::{Plan, Subscription, SubscriptionStatus, SubscriptionWithPlan};

#[derive(Debug, Clone, Default)]
struct State {
    version: u64,
    businesses: Vec<Business>,
    catalogs: Vec<Catalog>,
    invites: Vec<Invite>,
    members: Vec<Membership>,
    plans: Vec<Plan>,
    subscriptions: Vec<Subscription>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> State {
        self.state.lock().unwrap().clone()
    }

    // Toda escrita direta avança a versão, como um commit.
    fn write(&self) -> MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.version += 1;
        state
    }

    fn begin_tx(&self) -> MemoryTx {
        let working = self.snapshot();
        MemoryTx {
            shared: self.state.clone(),
            base_version: working.version,
            working,
        }
    }

    /// Cria o vínculo e, se ainda não existir, o negócio dele.
    pub fn seed_member(&self, business_id: Uuid, profile_id: Uuid, role: Role) -> Membership {
        let now = Utc::now();
        let member = Membership {
            business_id,
            profile_id,
            role,
            is_owner: role == Role::Owner,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.write();
        if !state.businesses.iter().any(|b| b.id == business_id) {
            state.businesses.push(Business {
                id: business_id,
                name: "Negócio".to_string(),
                description: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            });
        }
        state.members.push(member.clone());
        member
    }

    pub fn member(&self, business_id: Uuid, profile_id: Uuid) -> Option<Membership> {
        self.snapshot()
            .members
            .into_iter()
            .find(|m| m.business_id == business_id && m.profile_id == profile_id)
    }

    pub fn seed_plan(&self, name: &str, duration: &str, is_active: bool) -> Plan {
        let plan = Plan {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price: Decimal::new(2990, 2),
            duration: duration.to_string(),
            is_active,
            created_at: Utc::now(),
        };
        self.write().plans.push(plan.clone());
        plan
    }

    pub fn seed_subscription(
        &self,
        business_id: Uuid,
        plan_id: Uuid,
        status: SubscriptionStatus,
        expires_at: DateTime<Utc>,
    ) -> Subscription {
        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            business_id,
            plan_id,
            status,
            starts_at: now,
            expires_at,
            created_at: now,
            updated_at: now,
        };
        self.write().subscriptions.push(subscription.clone());
        subscription
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.snapshot().subscriptions
    }

    pub fn business(&self, id: Uuid) -> Option<Business> {
        self.snapshot().businesses.into_iter().find(|b| b.id == id)
    }

    pub fn catalog(&self, id: Uuid) -> Option<Catalog> {
        self.snapshot().catalogs.into_iter().find(|c| c.id == id)
    }

    pub fn invite(&self, id: Uuid) -> Option<Invite> {
        self.snapshot().invites.into_iter().find(|i| i.id == id)
    }

    pub fn active_owner_count(&self, business_id: Uuid) -> usize {
        active_members(&self.snapshot(), business_id)
            .iter()
            .filter(|m| m.is_owner)
            .count()
    }
}

// Igual ao upsert do Postgres: só reativa vínculos inativos.
fn upsert_member(
    state: &mut State,
    business_id: Uuid,
    profile_id: Uuid,
    role: Role,
) -> Result<Membership, AppError> {
    let now = Utc::now();
    if let Some(existing) = find_member_mut(state, business_id, profile_id) {
        if existing.is_active {
            return Err(already_member());
        }
        existing.role = role;
        existing.is_owner = role == Role::Owner;
        existing.is_active = true;
        existing.updated_at = now;
        return Ok(existing.clone());
    }
    let member = Membership {
        business_id,
        profile_id,
        role,
        is_owner: role == Role::Owner,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state.members.push(member.clone());
    Ok(member)
}

fn already_member() -> AppError {
    AppError::Conflict("Este perfil já é membro do negócio.".into())
}

fn active_members(state: &State, business_id: Uuid) -> Vec<Membership> {
    state
        .members
        .iter()
        .filter(|m| m.business_id == business_id && m.is_active)
        .cloned()
        .collect()
}

fn find_member_mut(
    state: &mut State,
    business_id: Uuid,
    profile_id: Uuid,
) -> Option<&mut Membership> {
    state
        .members
        .iter_mut()
        .find(|m| m.business_id == business_id && m.profile_id == profile_id)
}

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn find(
        &self,
        business_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        Ok(self.member(business_id, profile_id))
    }

    async fn list_active(&self, business_id: Uuid) -> Result<Vec<Membership>, AppError> {
        Ok(active_members(&self.snapshot(), business_id))
    }

    async fn begin(&self) -> Result<Box<dyn MembershipTx>, AppError> {
        Ok(Box::new(self.begin_tx()))
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryStore {
    async fn list_active_plans(&self) -> Result<Vec<Plan>, AppError> {
        Ok(self.snapshot().plans.into_iter().filter(|p| p.is_active).collect())
    }

    async fn find_current(
        &self,
        business_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SubscriptionWithPlan>, AppError> {
        let state = self.snapshot();
        let current = state
            .subscriptions
            .iter()
            .find(|s| s.business_id == business_id && s.is_current(now))
            .and_then(|s| {
                state
                    .plans
                    .iter()
                    .find(|p| p.id == s.plan_id)
                    .map(|p| SubscriptionWithPlan::new(s.clone(), p))
            });
        Ok(current)
    }

    async fn begin(&self) -> Result<Box<dyn SubscriptionTx>, AppError> {
        Ok(Box::new(self.begin_tx()))
    }
}

pub struct MemoryTx {
    shared: Arc<Mutex<State>>,
    base_version: u64,
    working: State,
}

impl MemoryTx {
    fn publish(mut self) -> Result<(), AppError> {
        let mut shared = self.shared.lock().unwrap();
        if shared.version != self.base_version {
            return Err(AppError::Conflict(
                "Outra transação alterou os dados; tente novamente.".into(),
            ));
        }
        self.working.version = self.base_version + 1;
        *shared = self.working;
        Ok(())
    }

    // Assinaturas ativas já publicadas por outras transações que esta não
    // encerrou na sua cópia. É o que o índice parcial enxerga no Postgres.
    fn committed_active_elsewhere(&self, business_id: Uuid) -> bool {
        let shared = self.shared.lock().unwrap();
        shared.subscriptions.iter().any(|s| {
            s.business_id == business_id
                && s.status == SubscriptionStatus::Active
                && self
                    .working
                    .subscriptions
                    .iter()
                    .find(|w| w.id == s.id)
                    .is_none_or(|w| w.status == SubscriptionStatus::Active)
        })
    }
}

#[async_trait]
impl MembershipTx for MemoryTx {
    async fn list_active(&mut self, business_id: Uuid) -> Result<Vec<Membership>, AppError> {
        Ok(active_members(&self.working, business_id))
    }

    async fn find(
        &mut self,
        business_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        Ok(find_member_mut(&mut self.working, business_id, profile_id).map(|m| m.clone()))
    }

    async fn upsert_active(
        &mut self,
        business_id: Uuid,
        profile_id: Uuid,
        role: Role,
    ) -> Result<Membership, AppError> {
        upsert_member(&mut self.working, business_id, profile_id, role)
    }

    async fn update_role(
        &mut self,
        business_id: Uuid,
        profile_id: Uuid,
        role: Role,
    ) -> Result<Option<Membership>, AppError> {
        Ok(find_member_mut(&mut self.working, business_id, profile_id)
            .filter(|m| m.is_active)
            .map(|m| {
                m.role = role;
                m.is_owner = role == Role::Owner;
                m.updated_at = Utc::now();
                m.clone()
            }))
    }

    async fn deactivate(
        &mut self,
        business_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        Ok(find_member_mut(&mut self.working, business_id, profile_id)
            .filter(|m| m.is_active)
            .map(|m| {
                m.is_active = false;
                m.updated_at = Utc::now();
                m.clone()
            }))
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.publish()
    }
}

#[async_trait]
impl SubscriptionTx for MemoryTx {
    async fn find_plan(&mut self, plan_id: Uuid) -> Result<Option<Plan>, AppError> {
        Ok(self.working.plans.iter().find(|p| p.id == plan_id).cloned())
    }

    async fn expire_lapsed(
        &mut self,
        business_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let mut expired = 0;
        for s in self.working.subscriptions.iter_mut() {
            if s.business_id == business_id
                && s.expires_at <= now
                && s.status.can_transition_to(SubscriptionStatus::Expired)
            {
                s.status = SubscriptionStatus::Expired;
                s.updated_at = now;
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn find_active(
        &mut self,
        business_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Subscription>, AppError> {
        Ok(self
            .working
            .subscriptions
            .iter()
            .find(|s| s.business_id == business_id && s.is_current(now))
            .cloned())
    }

    async fn insert_active(
        &mut self,
        business_id: Uuid,
        plan_id: Uuid,
        starts_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Subscription, AppError> {
        // Mesmo papel do índice parcial do Postgres
        let active_here = self
            .working
            .subscriptions
            .iter()
            .any(|s| s.business_id == business_id && s.status == SubscriptionStatus::Active);
        if active_here || self.committed_active_elsewhere(business_id) {
            return Err(AppError::Conflict("O negócio já possui uma assinatura ativa.".into()));
        }
        let subscription = Subscription {
            id: Uuid::new_v4(),
            business_id,
            plan_id,
            status: SubscriptionStatus::Active,
            starts_at,
            expires_at,
            created_at: starts_at,
            updated_at: starts_at,
        };
        self.working.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.publish()
    }
}

#[async_trait]
impl BusinessRepository for MemoryStore {
    async fn create_with_owner(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: Uuid,
    ) -> Result<Business, AppError> {
        let now = Utc::now();
        let business = Business {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.write();
        state.businesses.push(business.clone());
        upsert_member(&mut state, business.id, owner_id, Role::Owner)?;
        Ok(business)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Business>, AppError> {
        Ok(self.business(id).filter(|b| b.is_active))
    }

    async fn list_for_profile(&self, profile_id: Uuid) -> Result<Vec<Business>, AppError> {
        let state = self.snapshot();
        Ok(state
            .businesses
            .iter()
            .filter(|b| {
                b.is_active
                    && state
                        .members
                        .iter()
                        .any(|m| m.business_id == b.id && m.profile_id == profile_id && m.is_active)
            })
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Business>, AppError> {
        let mut state = self.write();
        Ok(state
            .businesses
            .iter_mut()
            .find(|b| b.id == id && b.is_active)
            .map(|b| {
                if let Some(name) = name {
                    b.name = name.to_string();
                }
                if let Some(description) = description {
                    b.description = Some(description.to_string());
                }
                b.updated_at = Utc::now();
                b.clone()
            }))
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<Business>, AppError> {
        let mut state = self.write();
        Ok(state
            .businesses
            .iter_mut()
            .find(|b| b.id == id && b.is_active)
            .map(|b| {
                b.is_active = false;
                b.updated_at = Utc::now();
                b.clone()
            }))
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn create(
        &self,
        business_id: Uuid,
        input: &CreateCatalogPayload,
    ) -> Result<Catalog, AppError> {
        let now = Utc::now();
        let catalog = Catalog {
            id: Uuid::new_v4(),
            business_id,
            name: input.name.clone(),
            description: input.description.clone(),
            is_published: input.is_published,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.write().catalogs.push(catalog.clone());
        Ok(catalog)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Catalog>, AppError> {
        Ok(self.catalog(id).filter(|c| c.is_active))
    }

    async fn update(
        &self,
        id: Uuid,
        input: &UpdateCatalogPayload,
    ) -> Result<Option<Catalog>, AppError> {
        let mut state = self.write();
        Ok(state
            .catalogs
            .iter_mut()
            .find(|c| c.id == id && c.is_active)
            .map(|c| {
                if let Some(name) = &input.name {
                    c.name = name.clone();
                }
                if let Some(description) = &input.description {
                    c.description = Some(description.clone());
                }
                if let Some(is_published) = input.is_published {
                    c.is_published = is_published;
                }
                c.updated_at = Utc::now();
                c.clone()
            }))
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<Catalog>, AppError> {
        let mut state = self.write();
        Ok(state
            .catalogs
            .iter_mut()
            .find(|c| c.id == id && c.is_active)
            .map(|c| {
                c.is_active = false;
                c.updated_at = Utc::now();
                c.clone()
            }))
    }
}

#[async_trait]
impl InviteRepository for MemoryStore {
    async fn create(
        &self,
        business_id: Uuid,
        profile_id: Uuid,
        role: Role,
        invited_by: Uuid,
    ) -> Result<Invite, AppError> {
        let invite = Invite {
            id: Uuid::new_v4(),
            business_id,
            profile_id,
            role,
            invited_by,
            status: InviteStatus::Pending,
            created_at: Utc::now(),
            accepted_at: None,
        };
        self.write().invites.push(invite.clone());
        Ok(invite)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invite>, AppError> {
        Ok(self.snapshot().invites.into_iter().find(|i| i.id == id))
    }

    async fn accept(&self, invite: &Invite) -> Result<Option<(Invite, Membership)>, AppError> {
        // Cópia local: se o vínculo falhar, o convite continua pendente.
        let mut state = self.write();
        let mut working = state.clone();
        let Some(stored) = working
            .invites
            .iter_mut()
            .find(|i| i.id == invite.id && i.status == InviteStatus::Pending)
        else {
            return Ok(None);
        };
        stored.status = InviteStatus::Accepted;
        stored.accepted_at = Some(Utc::now());
        let accepted = stored.clone();
        let member = upsert_member(
            &mut working,
            accepted.business_id,
            accepted.profile_id,
            accepted.role,
        )?;
        *state = working;
        Ok(Some((accepted, member)))
    }
}

/// Guarda as entradas de auditoria recebidas. Um `table_name` igual a
/// `panic_on_table` faz a escrita entrar em pânico.
#[derive(Clone, Default)]
pub struct RecordingAuditRepository {
    entries: Arc<Mutex<Vec<NewAuditLog>>>,
    panic_on_table: Option<String>,
}

impl RecordingAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panicking_on(table: &str) -> Self {
        Self {
            entries: Arc::default(),
            panic_on_table: Some(table.to_string()),
        }
    }

    pub fn entries(&self) -> Vec<NewAuditLog> {
        self.entries.lock().unwrap().clone()
    }

    /// Espera até `count` entradas chegarem (ou o tempo acabar).
    pub async fn wait_for(&self, count: usize) -> Vec<NewAuditLog> {
        for _ in 0..200 {
            let entries = self.entries();
            if entries.len() >= count {
                return entries;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        self.entries()
    }
}

#[async_trait]
impl AuditRepository for RecordingAuditRepository {
    async fn create(&self, entry: &NewAuditLog) -> Result<(), AppError> {
        if self.panic_on_table.as_deref() == Some(entry.table_name.as_str()) {
            panic!("falha simulada ao gravar auditoria");
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_for_business(
        &self,
        business_id: Uuid,
        query: &AuditLogQuery,
    ) -> Result<Vec<AuditLog>, AppError> {
        let mut logs: Vec<AuditLog> = self
            .entries()
            .into_iter()
            .enumerate()
            .filter(|(_, e)| e.subject_id == Some(business_id))
            .map(|(i, e)| AuditLog {
                id: i as i64 + 1,
                created_at: Utc::now(),
                actor_id: e.actor_id,
                subject_id: e.subject_id,
                audit_type: e.audit_type,
                action: e.action,
                table_name: e.table_name,
                record_id: e.record_id,
                old_data: e.old_data,
                new_data: e.new_data,
                reason: e.reason,
            })
            .collect();
        logs.reverse();
        let logs = logs
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();
        Ok(logs)
    }
}
