//! Arquivamento periódico das pendências concluídas.
//!
//! Roda em intervalo fixo com `tokio::time::interval` e para quando o token
//! de cancelamento é acionado no desligamento do servidor.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::services::task_service::TaskService;

pub async fn run(task_service: TaskService, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Job de arquivamento automático iniciado");

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job de arquivamento automático encerrando");
                break;
            }
            _ = interval.tick() => {
                match task_service.archive_due(Utc::now()).await {
                    Ok(report) if report.archived_ids.is_empty() => {
                        tracing::debug!("Arquivamento automático: nada a arquivar");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Arquivamento automático falhou");
                    }
                }
            }
        }
    }
}
