// src/handlers/catalogs.rs

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
    models::catalog::{Catalog, CreateCatalogPayload, UpdateCatalogPayload},
};

#[utoipa::path(
    post,
    path = "/api/businesses/{business_id}/catalogs",
    tag = "Catalogs",
    request_body = CreateCatalogPayload,
    params(("business_id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 201, description = "Catálogo criado", body = Catalog),
        (status = 403, description = "Requer catalog:create")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_catalog(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(business_id): Path<Uuid>,
    Json(payload): Json<CreateCatalogPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut audit = AuditContext::for_actor(profile.id);
    let catalog = app_state
        .catalog_service
        .create(business_id, profile.id, payload, &mut audit)
        .await?;

    Ok((StatusCode::CREATED, Extension(audit), Json(catalog)))
}

#[utoipa::path(
    put,
    path = "/api/catalogs/{catalog_id}",
    tag = "Catalogs",
    request_body = UpdateCatalogPayload,
    params(("catalog_id" = Uuid, Path, description = "ID do catálogo")),
    responses(
        (status = 200, description = "Catálogo atualizado", body = Catalog),
        (status = 403, description = "Requer catalog:update")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_catalog(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(catalog_id): Path<Uuid>,
    Json(payload): Json<UpdateCatalogPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut audit = AuditContext::for_actor(profile.id);
    let catalog = app_state
        .catalog_service
        .update(catalog_id, profile.id, payload, &mut audit)
        .await?;

    Ok((StatusCode::OK, Extension(audit), Json(catalog)))
}

#[utoipa::path(
    delete,
    path = "/api/catalogs/{catalog_id}",
    tag = "Catalogs",
    params(("catalog_id" = Uuid, Path, description = "ID do catálogo")),
    responses(
        (status = 200, description = "Catálogo desativado", body = Catalog),
        (status = 403, description = "Requer catalog:delete")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_catalog(
    State(app_state): State<AppState>,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(catalog_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut audit = AuditContext::for_actor(profile.id);
    let catalog = app_state
        .catalog_service
        .delete(catalog_id, profile.id, &mut audit)
        .await?;

    Ok((StatusCode::OK, Extension(audit), Json(catalog)))
}

#[utoipa::path(
    get,
    path = "/api/public/catalogs/{catalog_id}",
    tag = "Catalogs",
    params(("catalog_id" = Uuid, Path, description = "ID do catálogo")),
    responses(
        (status = 200, description = "Catálogo publicado", body = Catalog),
        (status = 404, description = "Inexistente ou não publicado")
    )
)]
pub async fn get_public_catalog(
    State(app_state): State<AppState>,
    Path(catalog_id): Path<Uuid>,
) -> Result<Json<Catalog>, AppError> {
    Ok(Json(app_state.catalog_service.get_public(catalog_id).await?))
}
