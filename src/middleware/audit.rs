// src/middleware/audit.rs

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::audit::{routes, AuditContext, AuditDispatcher};
use crate::models::audit::NewAuditLog;

/// Camada externa: deixa a requisição seguir e, com a resposta pronta,
/// decide se há algo a auditar. A gravação acontece nos workers.
pub async fn audit_trail(
    State(dispatcher): State<AuditDispatcher>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let mut response = next.run(request).await;

    let context = response.extensions_mut().remove::<AuditContext>();
    if let Some(entry) = build_entry(&method, &path, response.status(), context) {
        dispatcher.dispatch(entry);
    }

    response
}

/// `None` para leituras, respostas de erro e rotas fora da tabela.
pub fn build_entry(
    method: &Method,
    path: &str,
    status: StatusCode,
    context: Option<AuditContext>,
) -> Option<NewAuditLog> {
    if *method == Method::GET || status.as_u16() >= 400 {
        return None;
    }

    let route = routes::resolve(method, path)?;
    Some(context.unwrap_or_default().into_entry(route.meta, &route))
}
