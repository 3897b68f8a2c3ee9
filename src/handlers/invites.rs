// src/handlers/invites.rs

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
    models::{
        invite::{AcceptInvitePayload, CreateInvitePayload, Invite},
        membership::Membership,
    },
};

#[utoipa::path(
    post,
    path = "/api/businesses/{business_id}/invites",
    tag = "Invites",
    request_body = CreateInvitePayload,
    params(("business_id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 201, description = "Convite criado", body = Invite),
        (status = 403, description = "Requer user:invite"),
        (status = 409, description = "Perfil já é membro")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invite(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(business_id): Path<Uuid>,
    Json(payload): Json<CreateInvitePayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut audit = AuditContext::for_actor(profile.id);
    let invite = app_state
        .invite_service
        .create(business_id, profile.id, payload, &mut audit)
        .await?;

    Ok((StatusCode::CREATED, Extension(audit), Json(invite)))
}

#[utoipa::path(
    post,
    path = "/api/invites/accept",
    tag = "Invites",
    request_body = AcceptInvitePayload,
    responses(
        (status = 200, description = "Convite aceito; vínculo ativo", body = Membership),
        (status = 403, description = "Convite de outro perfil"),
        (status = 409, description = "Convite já utilizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_invite(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Json(payload): Json<AcceptInvitePayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut audit = AuditContext::for_actor(profile.id);
    let member = app_state
        .invite_service
        .accept(profile.id, payload.invite_id, &mut audit)
        .await?;

    Ok((StatusCode::OK, Extension(audit), Json(member)))
}
