// src/handlers/subscriptions.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    audit::AuditContext,
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::subscription::{ActivateSubscriptionPayload, Plan, SubscriptionWithPlan},
};

#[utoipa::path(
    get,
    path = "/api/plans",
    tag = "Subscriptions",
    responses((status = 200, description = "Planos disponíveis", body = Vec<Plan>))
)]
pub async fn list_plans(State(app_state): State<AppState>) -> Result<Json<Vec<Plan>>, AppError> {
    Ok(Json(app_state.subscription_service.list_plans().await?))
}

#[utoipa::path(
    get,
    path = "/api/businesses/{business_id}/subscription",
    tag = "Subscriptions",
    params(("business_id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Assinatura vigente", body = SubscriptionWithPlan),
        (status = 404, description = "Sem assinatura ativa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_current_subscription(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(business_id): Path<Uuid>,
) -> Result<Json<SubscriptionWithPlan>, AppError> {
    let current = app_state
        .subscription_service
        .current(business_id, profile.id)
        .await?;
    Ok(Json(current))
}

#[utoipa::path(
    post,
    path = "/api/subscriptions/activate",
    tag = "Subscriptions",
    request_body = ActivateSubscriptionPayload,
    responses(
        (status = 201, description = "Assinatura ativada", body = SubscriptionWithPlan),
        (status = 403, description = "Requer subscription:update"),
        (status = 404, description = "Plano não encontrado"),
        (status = 409, description = "Já existe assinatura ativa"),
        (status = 422, description = "Plano inativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn activate_subscription(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Json(payload): Json<ActivateSubscriptionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut audit = AuditContext::for_actor(profile.id);
    let activated = app_state
        .subscription_service
        .activate_as(profile.id, payload.business_id, payload.plan_id, &mut audit)
        .await?;

    Ok((StatusCode::CREATED, Extension(audit), Json(activated)))
}
