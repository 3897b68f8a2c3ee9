// src/handlers/members.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::AuditContext,
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::membership::{AddMemberPayload, Membership, RemoveMemberParams, UpdateRolePayload},
};

#[utoipa::path(
    get,
    path = "/api/businesses/{business_id}/members",
    tag = "Members",
    params(("business_id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Membros ativos", body = Vec<Membership>),
        (status = 403, description = "Requer user:view")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(business_id): Path<Uuid>,
) -> Result<Json<Vec<Membership>>, AppError> {
    let members = app_state
        .membership_service
        .list_members(business_id, profile.id)
        .await?;
    Ok(Json(members))
}

#[utoipa::path(
    post,
    path = "/api/businesses/{business_id}/members",
    tag = "Members",
    request_body = AddMemberPayload,
    params(("business_id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 201, description = "Membro adicionado (ou reativado)", body = Membership),
        (status = 403, description = "Requer user:invite"),
        (status = 409, description = "Perfil já é membro")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_member(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(business_id): Path<Uuid>,
    Json(payload): Json<AddMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut audit = AuditContext::for_actor(profile.id);
    let member = app_state
        .membership_service
        .add_member(business_id, profile.id, payload, &mut audit)
        .await?;

    Ok((StatusCode::CREATED, Extension(audit), Json(member)))
}

#[utoipa::path(
    put,
    path = "/api/businesses/{business_id}/members/{profile_id}/role",
    tag = "Members",
    request_body = UpdateRolePayload,
    params(
        ("business_id" = Uuid, Path, description = "ID do negócio"),
        ("profile_id" = Uuid, Path, description = "Perfil alvo")
    ),
    responses(
        (status = 200, description = "Cargo alterado", body = Membership),
        (status = 400, description = "Auto-alteração ou último dono"),
        (status = 403, description = "Requer user:update")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_member_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path((business_id, target_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut audit = AuditContext::for_actor(profile.id);
    let member = app_state
        .membership_service
        .update_role(business_id, profile.id, target_id, payload, &mut audit)
        .await?;

    Ok((StatusCode::OK, Extension(audit), Json(member)))
}

#[utoipa::path(
    delete,
    path = "/api/businesses/{business_id}/members/{profile_id}",
    tag = "Members",
    params(
        ("business_id" = Uuid, Path, description = "ID do negócio"),
        ("profile_id" = Uuid, Path, description = "Perfil alvo"),
        RemoveMemberParams
    ),
    responses(
        (status = 200, description = "Membro desativado", body = Membership),
        (status = 400, description = "Auto-remoção ou último dono"),
        (status = 403, description = "Requer user:remove")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path((business_id, target_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<RemoveMemberParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;

    let mut audit = AuditContext::for_actor(profile.id);
    let member = app_state
        .membership_service
        .remove_member(business_id, profile.id, target_id, params.reason, &mut audit)
        .await?;

    Ok((StatusCode::OK, Extension(audit), Json(member)))
}
