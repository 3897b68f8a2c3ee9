// src/handlers/audit_logs.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::audit::{AuditLog, AuditLogQuery},
};

#[utoipa::path(
    get,
    path = "/api/businesses/{business_id}/audit-logs",
    tag = "Audit",
    params(
        ("business_id" = Uuid, Path, description = "ID do negócio"),
        AuditLogQuery
    ),
    responses(
        (status = 200, description = "Trilha do negócio e dos seus catálogos", body = Vec<AuditLog>),
        (status = 403, description = "Requer business:update")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_audit_logs(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(business_id): Path<Uuid>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditLog>>, AppError> {
    let logs = app_state
        .audit_log_service
        .list(business_id, profile.id, query)
        .await?;
    Ok(Json(logs))
}
