// src/audit/dispatcher.rs

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;

use crate::db::AuditRepository;
use crate::models::audit::NewAuditLog;

/// Fila limitada + pool fixo de workers que gravam a trilha de auditoria.
///
/// `dispatch` nunca espera: com a fila cheia a entrada é descartada (com log).
/// Cada gravação roda na sua própria task; erros e pânicos são logados e a
/// entrada é perdida. Sem retry, sem timeout.
#[derive(Clone)]
pub struct AuditDispatcher {
    sender: mpsc::Sender<NewAuditLog>,
}

impl AuditDispatcher {
    pub fn start(repo: Arc<dyn AuditRepository>, workers: usize, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = workers.max(1);
        for worker_id in 0..workers {
            tokio::spawn(run_worker(worker_id, receiver.clone(), repo.clone()));
        }

        tracing::info!(workers, capacity, "📝 Workers de auditoria iniciados");
        Self { sender }
    }

    pub fn dispatch(&self, entry: NewAuditLog) {
        match self.sender.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                tracing::warn!(
                    audit_type = %entry.audit_type,
                    action = %entry.action,
                    table = %entry.table_name,
                    "⚠️ Fila de auditoria cheia, entrada descartada"
                );
            }
            Err(TrySendError::Closed(entry)) => {
                tracing::warn!(
                    table = %entry.table_name,
                    "⚠️ Fila de auditoria fechada, entrada descartada"
                );
            }
        }
    }
}

async fn run_worker(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<NewAuditLog>>>,
    repo: Arc<dyn AuditRepository>,
) {
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(entry) = next else {
            break;
        };

        let table = entry.table_name.clone();
        let action = entry.action.clone();
        let repo = repo.clone();

        // Task separada: um pânico na gravação não derruba o worker
        match tokio::spawn(async move { repo.create(&entry).await }).await {
            Ok(Ok(())) => {
                tracing::debug!(worker_id, %table, %action, "auditoria gravada");
            }
            Ok(Err(e)) => {
                tracing::error!(worker_id, %table, %action, "🔥 Falha ao gravar auditoria: {}", e);
            }
            Err(join_err) if join_err.is_panic() => {
                tracing::error!(worker_id, %table, %action, "🔥 Pânico ao gravar auditoria");
            }
            Err(join_err) => {
                tracing::error!(worker_id, %table, %action, "🔥 Gravação de auditoria cancelada: {}", join_err);
            }
        }
    }

    tracing::debug!(worker_id, "worker de auditoria encerrado");
}
