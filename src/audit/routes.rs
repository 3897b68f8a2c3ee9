// src/audit/routes.rs
//
// Tabela declarativa (método, rota) -> metadados de auditoria.
// Para auditar um novo endpoint, adicione uma linha em AUDIT_ROUTES.

use axum::http::Method;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditType {
    Business,
    Membership,
    Invite,
    Subscription,
    Catalog,
}

impl AuditType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditType::Business => "BUSINESS",
            AuditType::Membership => "MEMBERSHIP",
            AuditType::Invite => "INVITE",
            AuditType::Subscription => "SUBSCRIPTION",
            AuditType::Catalog => "CATALOG",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Accept,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Accept => "ACCEPT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditMeta {
    pub audit_type: AuditType,
    pub action: AuditAction,
    pub table: &'static str,
}

struct AuditRoute {
    method: &'static str,
    template: &'static str,
    meta: AuditMeta,
}

const fn route(
    method: &'static str,
    template: &'static str,
    audit_type: AuditType,
    action: AuditAction,
    table: &'static str,
) -> AuditRoute {
    AuditRoute {
        method,
        template,
        meta: AuditMeta {
            audit_type,
            action,
            table,
        },
    }
}

// Ordem fixa: as rotas mais específicas vêm primeiro. Como o casamento é
// segmento a segmento, `/invites/accept` nunca casa com `/invites`.
static AUDIT_ROUTES: &[AuditRoute] = &[
    route("POST", "/api/invites/accept", AuditType::Invite, AuditAction::Accept, "business_members"),
    route("POST", "/api/subscriptions/activate", AuditType::Subscription, AuditAction::Create, "subscriptions"),
    route("PUT", "/api/businesses/{business_id}/members/{profile_id}/role", AuditType::Membership, AuditAction::Update, "business_members"),
    route("DELETE", "/api/businesses/{business_id}/members/{profile_id}", AuditType::Membership, AuditAction::Delete, "business_members"),
    route("POST", "/api/businesses/{business_id}/members", AuditType::Membership, AuditAction::Create, "business_members"),
    route("POST", "/api/businesses/{business_id}/invites", AuditType::Invite, AuditAction::Create, "business_invites"),
    route("POST", "/api/businesses/{business_id}/catalogs", AuditType::Catalog, AuditAction::Create, "catalogs"),
    route("PUT", "/api/catalogs/{catalog_id}", AuditType::Catalog, AuditAction::Update, "catalogs"),
    route("DELETE", "/api/catalogs/{catalog_id}", AuditType::Catalog, AuditAction::Delete, "catalogs"),
    route("PUT", "/api/businesses/{business_id}", AuditType::Business, AuditAction::Update, "businesses"),
    route("DELETE", "/api/businesses/{business_id}", AuditType::Business, AuditAction::Delete, "businesses"),
    route("POST", "/api/businesses", AuditType::Business, AuditAction::Create, "businesses"),
];

/// Resultado de uma resolução: metadados + parâmetros capturados da rota.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub meta: AuditMeta,
    params: Vec<(&'static str, String)>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Negócio ou catálogo citado na rota.
    pub fn subject_id(&self) -> Option<Uuid> {
        self.param("business_id")
            .or_else(|| self.param("catalog_id"))
            .and_then(|id| Uuid::parse_str(id).ok())
    }
}

/// `None` significa "não auditar": GET, HEAD e rotas desconhecidas.
pub fn resolve(method: &Method, path: &str) -> Option<RouteMatch> {
    if method == Method::GET || method == Method::HEAD {
        return None;
    }

    let segments = split(path);
    AUDIT_ROUTES
        .iter()
        .filter(|r| r.method == method.as_str())
        .find_map(|r| {
            match_template(r.template, &segments).map(|params| RouteMatch {
                meta: r.meta,
                params,
            })
        })
}

fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

fn match_template(
    template: &'static str,
    segments: &[&str],
) -> Option<Vec<(&'static str, String)>> {
    let expected = split(template);
    if expected.len() != segments.len() {
        return None;
    }

    let mut params = Vec::new();
    for (tpl, actual) in expected.iter().zip(segments) {
        match placeholder(tpl) {
            Some(name) => params.push((name, (*actual).to_string())),
            None if tpl == actual => {}
            None => return None,
        }
    }
    Some(params)
}
