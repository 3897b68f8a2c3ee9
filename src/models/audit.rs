// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Linha da trilha de auditoria. Nunca é alterada depois de gravada.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub actor_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    #[schema(example = "MEMBERSHIP")]
    pub audit_type: String,
    #[schema(example = "UPDATE")]
    pub action: String,
    #[schema(example = "business_members")]
    pub table_name: String,
    pub record_id: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub old_data: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub new_data: Option<serde_json::Value>,
    pub reason: Option<String>,
}

// O que o despachante entrega ao repositório
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLog {
    pub actor_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub audit_type: String,
    pub action: String,
    pub table_name: String,
    pub record_id: Option<Uuid>,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditLogQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AuditLogQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
