// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    audit::AuditDispatcher,
    db::{
        BusinessRepository, MembershipRepository, PgAuditRepository, PgBusinessRepository,
        PgCatalogRepository, PgInviteRepository, PgMembershipRepository, PgSubscriptionRepository, ProfileRepository,
    },
    services::{
        audit_log_service::AuditLogService, auth::AuthService, business_service::BusinessService,
        catalog_service::CatalogService, invite_service::InviteService,
        membership_guard::MembershipGuard, membership_service::MembershipService,
        subscription_service::SubscriptionService,
    },
};

/// Configuração lida do ambiente (com `.env` opcional).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub audit_workers: usize,
    pub audit_queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
            audit_workers: parse_or("AUDIT_WORKERS", 4)?,
            audit_queue_capacity: parse_or("AUDIT_QUEUE_CAPACITY", 1024)?,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub business_service: BusinessService,
    pub membership_service: MembershipService,
    pub invite_service: InviteService,
    pub subscription_service: SubscriptionService,
    pub catalog_service: CatalogService,
    pub audit_log_service: AuditLogService,
    pub audit: AuditDispatcher,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let members: Arc<dyn MembershipRepository> =
            Arc::new(PgMembershipRepository::new(db_pool.clone()));
        let businesses: Arc<dyn BusinessRepository> =
            Arc::new(PgBusinessRepository::new(db_pool.clone()));
        let guard = MembershipGuard::new(members.clone(), businesses.clone());
        let audit_repo = Arc::new(PgAuditRepository::new(db_pool.clone()));

        let auth_service = AuthService::new(
            ProfileRepository::new(db_pool.clone()),
            config.jwt_secret.clone(),
            db_pool.clone(),
        );
        let business_service = BusinessService::new(guard.clone(), businesses);
        let membership_service = MembershipService::new(guard.clone(), members.clone());
        let invite_service = InviteService::new(
            guard.clone(),
            members,
            Arc::new(PgInviteRepository::new(db_pool.clone())),
        );
        let subscription_service = SubscriptionService::new(
            guard.clone(),
            Arc::new(PgSubscriptionRepository::new(db_pool.clone())),
        );
        let catalog_service = CatalogService::new(
            guard.clone(),
            Arc::new(PgCatalogRepository::new(db_pool.clone())),
        );
        let audit_log_service = AuditLogService::new(guard, audit_repo.clone());

        let audit = AuditDispatcher::start(
            audit_repo,
            config.audit_workers,
            config.audit_queue_capacity,
        );

        Ok(Self {
            db_pool,
            auth_service,
            business_service,
            membership_service,
            invite_service,
            subscription_service,
            catalog_service,
            audit_log_service,
            audit,
        })
    }
}
