// src/audit/context.rs

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::audit::routes::{AuditMeta, RouteMatch};
use crate::models::audit::NewAuditLog;

/// Dados de auditoria de UMA requisição.
///
/// O handler cria o contexto, os serviços recebem `&mut AuditContext` e
/// registram o "antes" (antes da escrita) e o "depois" (após o commit).
/// O handler devolve o contexto como extensão da resposta, e o middleware
/// de auditoria o consome depois que a resposta está pronta.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    actor_id: Option<Uuid>,
    subject_id: Option<Uuid>,
    record_id: Option<Uuid>,
    old_data: Option<Value>,
    new_data: Option<Value>,
    reason: Option<String>,
}

impl AuditContext {
    pub fn for_actor(actor_id: Uuid) -> Self {
        Self {
            actor_id: Some(actor_id),
            ..Self::default()
        }
    }

    /// Cópia profunda do estado antes da escrita. A última chamada vence.
    pub fn capture_old<T: Serialize>(&mut self, snapshot: &T) {
        self.old_data = to_snapshot(snapshot);
    }

    /// Cópia profunda do estado depois do commit. A última chamada vence.
    pub fn capture_new<T: Serialize>(&mut self, snapshot: &T) {
        self.new_data = to_snapshot(snapshot);
    }

    /// Sobrescreve o sujeito extraído da rota (ex.: ativação de assinatura,
    /// cujo negócio vem no corpo).
    pub fn set_subject(&mut self, subject_id: Uuid) {
        self.subject_id = Some(subject_id);
    }

    pub fn set_record(&mut self, record_id: Uuid) {
        self.record_id = Some(record_id);
    }

    pub fn set_reason(&mut self, reason: Option<String>) {
        self.reason = reason.filter(|r| !r.trim().is_empty());
    }

    pub fn actor_id(&self) -> Option<Uuid> {
        self.actor_id
    }

    pub fn old_data(&self) -> Option<&Value> {
        self.old_data.as_ref()
    }

    pub fn new_data(&self) -> Option<&Value> {
        self.new_data.as_ref()
    }

    /// Monta a entrada final. Sujeito: override do contexto, senão o da rota.
    /// Registro: override do contexto, senão o campo `id` dos snapshots.
    pub fn into_entry(self, meta: AuditMeta, route: &RouteMatch) -> NewAuditLog {
        let subject_id = self.subject_id.or_else(|| route.subject_id());
        let record_id = self
            .record_id
            .or_else(|| snapshot_id(self.new_data.as_ref()))
            .or_else(|| snapshot_id(self.old_data.as_ref()));

        NewAuditLog {
            actor_id: self.actor_id,
            subject_id,
            audit_type: meta.audit_type.as_str().to_string(),
            action: meta.action.as_str().to_string(),
            table_name: meta.table.to_string(),
            record_id,
            old_data: self.old_data,
            new_data: self.new_data,
            reason: self.reason,
        }
    }
}

fn to_snapshot<T: Serialize>(snapshot: &T) -> Option<Value> {
    match serde_json::to_value(snapshot) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("não foi possível serializar snapshot de auditoria: {}", e);
            None
        }
    }
}

fn snapshot_id(snapshot: Option<&Value>) -> Option<Uuid> {
    snapshot?
        .get("id")?
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::routes::resolve;
    use axum::http::Method;
    use serde_json::json;

    #[test]
    fn snapshots_are_deep_copies_and_last_write_wins() {
        let mut ctx = AuditContext::default();
        let mut state = json!({ "name": "antes" });
        ctx.capture_old(&state);
        state["name"] = json!("mudou depois da captura");
        assert_eq!(ctx.old_data().unwrap()["name"], "antes");

        ctx.capture_new(&json!({ "name": "primeiro" }));
        ctx.capture_new(&json!({ "name": "segundo" }));
        assert_eq!(ctx.new_data().unwrap()["name"], "segundo");
    }

    #[test]
    fn explicit_subject_overrides_path() {
        let business = Uuid::new_v4();
        let override_id = Uuid::new_v4();
        let route = resolve(&Method::PUT, &format!("/api/businesses/{business}")).unwrap();

        let mut ctx = AuditContext::default();
        ctx.set_subject(override_id);
        let entry = ctx.into_entry(route.meta, &route);
        assert_eq!(entry.subject_id, Some(override_id));

        let entry = AuditContext::default().into_entry(route.meta, &route);
        assert_eq!(entry.subject_id, Some(business));
    }

    #[test]
    fn record_id_falls_back_to_snapshot_id() {
        let id = Uuid::new_v4();
        let route = resolve(&Method::POST, "/api/businesses").unwrap();

        let mut ctx = AuditContext::for_actor(Uuid::new_v4());
        ctx.capture_new(&json!({ "id": id.to_string(), "name": "Loja" }));
        let entry = ctx.into_entry(route.meta, &route);
        assert_eq!(entry.record_id, Some(id));
        assert_eq!(entry.old_data, None);
    }

    #[test]
    fn blank_reason_is_dropped() {
        let route = resolve(&Method::POST, "/api/businesses").unwrap();
        let mut ctx = AuditContext::default();
        ctx.set_reason(Some("   ".into()));
        assert_eq!(ctx.into_entry(route.meta, &route).reason, None);
    }
}
