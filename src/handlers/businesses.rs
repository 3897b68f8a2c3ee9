// src/handlers/businesses.rs

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
    models::business::{Business, CreateBusinessPayload, UpdateBusinessPayload},
};

#[utoipa::path(
    post,
    path = "/api/businesses",
    tag = "Businesses",
    request_body = CreateBusinessPayload,
    responses(
        (status = 201, description = "Negócio criado; o autor vira dono", body = Business),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_business(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Json(payload): Json<CreateBusinessPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut audit = AuditContext::for_actor(profile.id);
    let business = app_state
        .business_service
        .create(profile.id, payload, &mut audit)
        .await?;

    Ok((StatusCode::CREATED, Extension(audit), Json(business)))
}

#[utoipa::path(
    get,
    path = "/api/businesses",
    tag = "Businesses",
    responses(
        (status = 200, description = "Negócios em que o perfil é membro ativo", body = Vec<Business>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_businesses(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
) -> Result<Json<Vec<Business>>, AppError> {
    let businesses = app_state.business_service.list_mine(profile.id).await?;
    Ok(Json(businesses))
}

#[utoipa::path(
    get,
    path = "/api/businesses/{business_id}",
    tag = "Businesses",
    params(("business_id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Negócio", body = Business),
        (status = 403, description = "Sem acesso ao negócio"),
        (status = 404, description = "Negócio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_business(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(business_id): Path<Uuid>,
) -> Result<Json<Business>, AppError> {
    let business = app_state
        .business_service
        .get(business_id, profile.id)
        .await?;
    Ok(Json(business))
}

#[utoipa::path(
    put,
    path = "/api/businesses/{business_id}",
    tag = "Businesses",
    request_body = UpdateBusinessPayload,
    params(("business_id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Negócio atualizado", body = Business),
        (status = 403, description = "Requer business:update")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_business(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(business_id): Path<Uuid>,
    Json(payload): Json<UpdateBusinessPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut audit = AuditContext::for_actor(profile.id);
    let business = app_state
        .business_service
        .update(business_id, profile.id, payload, &mut audit)
        .await?;

    Ok((StatusCode::OK, Extension(audit), Json(business)))
}

#[utoipa::path(
    delete,
    path = "/api/businesses/{business_id}",
    tag = "Businesses",
    params(("business_id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Negócio desativado", body = Business),
        (status = 403, description = "Requer business:delete")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_business(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(business_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut audit = AuditContext::for_actor(profile.id);
    let business = app_state
        .business_service
        .delete(business_id, profile.id, &mut audit)
        .await?;

    Ok((StatusCode::OK, Extension(audit), Json(business)))
}
