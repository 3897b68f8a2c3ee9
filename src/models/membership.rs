// src/models/membership.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// ---
// Role (O "Cargo" dentro do negócio)
// ---
// Conjunto fechado. Qualquer outra string é rejeitada antes de chegar ao banco.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Owner, Role::Admin, Role::Editor, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    /// Posição na hierarquia: owner > admin > editor > viewer.
    pub fn rank(&self) -> u8 {
        match self {
            Role::Owner => 4,
            Role::Admin => 3,
            Role::Editor => 2,
            Role::Viewer => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            other => Err(AppError::Validation(format!(
                "Cargo inválido: '{}'. Use owner, admin, editor ou viewer.",
                other
            ))),
        }
    }
}

// ---
// Membership (A "Ponte" Perfil-Negócio)
// ---
// `is_owner` acompanha `role == owner` em toda escrita.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub business_id: Uuid,
    pub profile_id: Uuid,
    pub role: Role,
    pub is_owner: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn is_active_owner(&self) -> bool {
        self.is_owner && self.is_active
    }
}

// O cargo chega como texto para que valores desconhecidos virem erro de validação
// (e não um 422 genérico do desserializador).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberPayload {
    pub profile_id: Uuid,
    #[schema(example = "editor")]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolePayload {
    #[schema(example = "admin")]
    pub role: String,
    #[validate(length(max = 500, message = "O motivo deve ter no máximo 500 caracteres."))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RemoveMemberParams {
    #[validate(length(max = 500, message = "O motivo deve ter no máximo 500 caracteres."))]
    pub reason: Option<String>,
}
