// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Apenas o cabeçalho do catálogo. Seções e cartões ficam fora deste serviço.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub id: Uuid,
    pub business_id: Uuid,
    #[schema(example = "Cardápio de Verão")]
    pub name: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogPayload {
    #[validate(length(min = 1, max = 120, message = "O nome do catálogo é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCatalogPayload {
    #[validate(length(min = 1, max = 120, message = "O nome do catálogo não pode ficar vazio."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
}
