// src/services/permissions.rs
//
// Hierarquia de cargos e matriz de permissões. Tabelas constantes do processo,
// expostas apenas por funções de consulta.

use std::str::FromStr;

use crate::models::membership::Role;

pub const BUSINESS_VIEW: &str = "business:view";
pub const BUSINESS_CREATE: &str = "business:create";
pub const BUSINESS_UPDATE: &str = "business:update";
pub const BUSINESS_DELETE: &str = "business:delete";

pub const CATALOG_VIEW: &str = "catalog:view";
pub const CATALOG_CREATE: &str = "catalog:create";
pub const CATALOG_UPDATE: &str = "catalog:update";
pub const CATALOG_DELETE: &str = "catalog:delete";

pub const USER_VIEW: &str = "user:view";
pub const USER_INVITE: &str = "user:invite";
pub const USER_UPDATE: &str = "user:update";
pub const USER_REMOVE: &str = "user:remove";

pub const SUBSCRIPTION_VIEW: &str = "subscription:view";
pub const SUBSCRIPTION_UPDATE: &str = "subscription:update";

pub const ALL_PERMISSIONS: [&str; 14] = [
    BUSINESS_VIEW,
    BUSINESS_CREATE,
    BUSINESS_UPDATE,
    BUSINESS_DELETE,
    CATALOG_VIEW,
    CATALOG_CREATE,
    CATALOG_UPDATE,
    CATALOG_DELETE,
    USER_VIEW,
    USER_INVITE,
    USER_UPDATE,
    USER_REMOVE,
    SUBSCRIPTION_VIEW,
    SUBSCRIPTION_UPDATE,
];

// Cada conjunto é escrito por extenso, não derivado da hierarquia.
const OWNER_PERMISSIONS: &[&str] = &[
    BUSINESS_VIEW,
    BUSINESS_CREATE,
    BUSINESS_UPDATE,
    BUSINESS_DELETE,
    CATALOG_VIEW,
    CATALOG_CREATE,
    CATALOG_UPDATE,
    CATALOG_DELETE,
    USER_VIEW,
    USER_INVITE,
    USER_UPDATE,
    USER_REMOVE,
    SUBSCRIPTION_VIEW,
    SUBSCRIPTION_UPDATE,
];

const ADMIN_PERMISSIONS: &[&str] = &[
    BUSINESS_VIEW,
    BUSINESS_UPDATE,
    CATALOG_VIEW,
    CATALOG_CREATE,
    CATALOG_UPDATE,
    CATALOG_DELETE,
    USER_VIEW,
    USER_INVITE,
    USER_UPDATE,
    SUBSCRIPTION_VIEW,
];

const EDITOR_PERMISSIONS: &[&str] = &[
    BUSINESS_VIEW,
    CATALOG_VIEW,
    CATALOG_CREATE,
    CATALOG_UPDATE,
    USER_VIEW,
    SUBSCRIPTION_VIEW,
];

const VIEWER_PERMISSIONS: &[&str] = &[BUSINESS_VIEW, CATALOG_VIEW, USER_VIEW, SUBSCRIPTION_VIEW];

pub fn permissions_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::Owner => OWNER_PERMISSIONS,
        Role::Admin => ADMIN_PERMISSIONS,
        Role::Editor => EDITOR_PERMISSIONS,
        Role::Viewer => VIEWER_PERMISSIONS,
    }
}

pub fn is_valid_role(role: &str) -> bool {
    Role::from_str(role).is_ok()
}

/// `true` se `user_role` está no mesmo nível ou acima de `min_role`.
/// Cargo desconhecido em qualquer lado resulta em `false`.
pub fn has_minimum_role(user_role: &str, min_role: &str) -> bool {
    match (Role::from_str(user_role), Role::from_str(min_role)) {
        (Ok(user), Ok(min)) => role_at_least(user, min),
        _ => false,
    }
}

pub fn role_at_least(user: Role, min: Role) -> bool {
    user.rank() >= min.rank()
}

pub fn has_permission(role: &str, permission: &str) -> bool {
    Role::from_str(role)
        .map(|r| role_has_permission(r, permission))
        .unwrap_or(false)
}

pub fn role_has_permission(role: Role, permission: &str) -> bool {
    permissions_for(role).contains(&permission)
}
