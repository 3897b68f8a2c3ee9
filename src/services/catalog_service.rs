// src/services/catalog_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::audit::AuditContext;
use crate::common::error::AppError;
use crate::db::CatalogRepository;
use crate::models::catalog::{Catalog, CreateCatalogPayload, UpdateCatalogPayload};
use crate::services::membership_guard::MembershipGuard;
use crate::services::permissions::{CATALOG_CREATE, CATALOG_DELETE, CATALOG_UPDATE};

#[derive(Clone)]
pub struct CatalogService {
    guard: MembershipGuard,
    catalogs: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(guard: MembershipGuard, catalogs: Arc<dyn CatalogRepository>) -> Self {
        Self { guard, catalogs }
    }

    pub async fn create(
        &self,
        business_id: Uuid,
        acting_profile_id: Uuid,
        payload: CreateCatalogPayload,
        audit: &mut AuditContext,
    ) -> Result<Catalog, AppError> {
        payload.validate()?;
        self.guard
            .authorize(business_id, acting_profile_id, CATALOG_CREATE)
            .await?;

        let catalog = self.catalogs.create(business_id, &payload).await?;

        tracing::info!(%business_id, catalog_id = %catalog.id, "📒 Catálogo criado");
        audit.capture_new(&catalog);
        Ok(catalog)
    }

    // O negócio vem do próprio catálogo, não da rota.
    pub async fn update(
        &self,
        catalog_id: Uuid,
        acting_profile_id: Uuid,
        payload: UpdateCatalogPayload,
        audit: &mut AuditContext,
    ) -> Result<Catalog, AppError> {
        payload.validate()?;
        let current = self.load(catalog_id).await?;
        self.guard
            .authorize(current.business_id, acting_profile_id, CATALOG_UPDATE)
            .await?;

        audit.capture_old(&current);
        let updated = self
            .catalogs
            .update(catalog_id, &payload)
            .await?
            .ok_or_else(not_found)?;

        audit.capture_new(&updated);
        Ok(updated)
    }

    pub async fn delete(
        &self,
        catalog_id: Uuid,
        acting_profile_id: Uuid,
        audit: &mut AuditContext,
    ) -> Result<Catalog, AppError> {
        let current = self.load(catalog_id).await?;
        self.guard
            .authorize(current.business_id, acting_profile_id, CATALOG_DELETE)
            .await?;

        audit.capture_old(&current);
        let removed = self
            .catalogs
            .deactivate(catalog_id)
            .await?
            .ok_or_else(not_found)?;

        audit.capture_new(&removed);
        Ok(removed)
    }

    /// Leitura pública: sem autenticação, só catálogos publicados de
    /// negócios ativos.
    pub async fn get_public(&self, catalog_id: Uuid) -> Result<Catalog, AppError> {
        let catalog = self
            .catalogs
            .find_by_id(catalog_id)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(not_found)?;

        match self.guard.active_business(catalog.business_id).await {
            Ok(_) => Ok(catalog),
            Err(AppError::NotFound(_)) => Err(not_found()),
            Err(e) => Err(e),
        }
    }

    async fn load(&self, catalog_id: Uuid) -> Result<Catalog, AppError> {
        self.catalogs
            .find_by_id(catalog_id)
            .await?
            .ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Catálogo não encontrado.".into())
}
