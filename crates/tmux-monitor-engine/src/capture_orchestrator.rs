//! Capture Orchestrator (C6): concurrent, bounded-retry capture dispatch
//! against the current PaneCollection.

use std::sync::Arc;

use chrono::Utc;
use tmux_monitor_core::{CancellationToken, CaptureSample, PaneCollection, PaneId};
use tmux_monitor_tmux::TmuxCommandRunner;

use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct CaptureError {
    pub id: PaneId,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct CaptureSummary {
    pub processed: usize,
    pub successful: usize,
    pub changed: Vec<PaneId>,
    pub errors: Vec<CaptureError>,
    pub duration_ms: u64,
}

/// Runs one capture pass over every pane currently in `collection`,
/// applying successful captures back onto their panes. Capture failures
/// are collected, never fatal; cancellation stops dispatch of further
/// work and is surfaced as `InvalidState(cancelled)`.
pub async fn capture_all<R>(
    collection: &mut PaneCollection,
    runner: Arc<R>,
    token: &CancellationToken,
    max_retries: u32,
) -> Result<CaptureSummary, EngineError>
where
    R: TmuxCommandRunner + Send + Sync + 'static,
{
    let started = std::time::Instant::now();
    let ids: Vec<PaneId> = collection.all().map(|p| p.id().clone()).collect();

    let mut summary = CaptureSummary::default();

    for id in ids {
        if token.is_cancelled() {
            return Err(EngineError::InvalidState("cancelled".to_string()));
        }

        summary.processed += 1;
        match capture_one_with_retry(Arc::clone(&runner), &id, max_retries).await {
            Ok(content) => {
                let sample = CaptureSample::new(content, Utc::now());
                if let Some(pane) = collection.get_mut(&id) {
                    match pane.apply_capture(sample) {
                        Ok(()) => {
                            summary.successful += 1;
                            if pane.activity() == tmux_monitor_core::ActivityStatus::Working {
                                summary.changed.push(id.clone());
                            }
                        }
                        Err(err) => summary.errors.push(CaptureError {
                            id: id.clone(),
                            reason: err.to_string(),
                        }),
                    }
                }
            }
            Err(err) => summary.errors.push(CaptureError {
                id: id.clone(),
                reason: err.to_string(),
            }),
        }
    }

    summary.duration_ms = started.elapsed().as_millis() as u64;
    Ok(summary)
}

async fn capture_one_with_retry<R>(
    runner: Arc<R>,
    id: &PaneId,
    max_retries: u32,
) -> Result<String, EngineError>
where
    R: TmuxCommandRunner + Send + Sync + 'static,
{
    let pane_id = id.as_str().to_string();
    let mut attempt = 0;
    loop {
        let runner = Arc::clone(&runner);
        let pane_id_for_task = pane_id.clone();
        let result = tokio::task::spawn_blocking(move || {
            tmux_monitor_tmux::capture(&*runner, &pane_id_for_task)
        })
        .await;

        match result {
            Ok(Ok(content)) => return Ok(content),
            Ok(Err(err)) if attempt < max_retries => {
                attempt += 1;
                tracing::debug!(pane = %pane_id, attempt, "capture failed, retrying: {err}");
            }
            Ok(Err(err)) => return Err(EngineError::RepositoryError(err.to_string())),
            Err(join_err) => return Err(EngineError::UnexpectedError(join_err.to_string())),
        }
    }
}
