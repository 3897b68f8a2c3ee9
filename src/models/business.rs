// src/models/business.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// Business (O "Negócio")
// ---
// A conta principal. Dona dos catálogos, das assinaturas e dos vínculos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: Uuid,
    #[schema(example = "Padaria Central")]
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessPayload {
    #[validate(length(min = 1, max = 120, message = "O nome do negócio é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
}

// Campos ausentes mantêm o valor atual
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBusinessPayload {
    #[validate(length(min = 1, max = 120, message = "O nome do negócio não pode ficar vazio."))]
    pub name: Option<String>,
    pub description: Option<String>,
}
