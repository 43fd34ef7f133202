//! Monitoring Engine (C8): the top-level driver.
//!
//! `Engine::run` walks the state machine from §4.8 — WaitingForSchedule,
//! Discovering, Naming, StartupActions, then Cycling (Capturing →
//! Clearing → Reporting → wait) until cancellation, the runtime-limit
//! deadline, one-shot completion, or a fatal discovery error ends the
//! run. Every suspension point goes through the shared `CancellationToken`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tmux_monitor_core::{
    CancellationToken, Pane, PaneCollection, PaneId, WorkerStatusKind, DEFAULT_ROLE_TEMPLATE,
};
use tmux_monitor_tmux::{PaneCommunicator, StartupCandidate, TmuxCommandRunner};

use crate::capture_orchestrator::capture_all;
use crate::clear_protocol::{clear_pane, ClearOutcome};
use crate::error::EngineError;
use crate::generation::PaneGenerationTracker;
use crate::options::MonitoringOptions;
use crate::report::{build_report, should_report, ReportInput};
use crate::runtime::RuntimeTracker;

/// How the engine's run loop ended. All three variants are clean
/// shutdowns from the caller's point of view; only a genuinely fatal
/// condition (empty/failed discovery) surfaces as `Err(EngineError)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutcome {
    Cancelled { reason: String },
    RuntimeLimitExceeded,
    OneShotCompleted,
}

pub struct Engine<R, C> {
    runner: Arc<R>,
    communicator: Arc<C>,
    options: MonitoringOptions,
    token: CancellationToken,
    collection: PaneCollection,
    runtime: RuntimeTracker,
    generations: PaneGenerationTracker,
    last_status_snapshot: HashMap<PaneId, WorkerStatusKind>,
}

impl<R, C> Engine<R, C>
where
    R: TmuxCommandRunner + Send + Sync + 'static,
    C: PaneCommunicator + 'static,
{
    pub fn new(runner: Arc<R>, communicator: Arc<C>, options: MonitoringOptions, token: CancellationToken) -> Self {
        let started_at = Utc::now();
        let runtime = RuntimeTracker::new(started_at, options.max_runtime_ms, options.scheduled_start);
        Self {
            runner,
            communicator,
            options,
            token,
            collection: PaneCollection::new(),
            runtime,
            generations: PaneGenerationTracker::new(),
            last_status_snapshot: HashMap::new(),
        }
    }

    pub async fn run(mut self) -> Result<EngineOutcome, EngineError> {
        if let Some(outcome) = self.wait_for_schedule().await {
            return Ok(outcome);
        }

        self.discover().await?;
        let summary = self.collection.assign_roles(DEFAULT_ROLE_TEMPLATE);
        tracing::info!(
            assigned = summary.assigned,
            skipped = summary.skipped,
            "role assignment complete"
        );

        if self.options.start_interactive {
            self.run_startup_actions();
        }

        loop {
            if self.token.is_cancelled() {
                return Ok(EngineOutcome::Cancelled {
                    reason: self.token.reason().unwrap_or_default(),
                });
            }
            if self.runtime.has_exceeded_limit(Utc::now()) {
                tracing::warn!("runtime limit exceeded, stopping");
                return Ok(EngineOutcome::RuntimeLimitExceeded);
            }

            let cycle_start = Utc::now();
            match self.run_cycle().await {
                Ok(()) => {}
                Err(EngineError::InvalidState(reason)) if reason == "cancelled" => {
                    return Ok(EngineOutcome::Cancelled {
                        reason: self.token.reason().unwrap_or(reason),
                    });
                }
                Err(err) => return Err(err),
            }

            if self.options.is_one_shot() {
                return Ok(EngineOutcome::OneShotCompleted);
            }

            let next_deadline = self
                .runtime
                .next_cycle_deadline(cycle_start, self.options.cycle_interval_ms);
            let interrupted = self.runtime.sleep_until(next_deadline, &self.token).await;
            if interrupted {
                return Ok(EngineOutcome::Cancelled {
                    reason: self.token.reason().unwrap_or_default(),
                });
            }
        }
    }

    /// Returns `Some(Cancelled)` if the scheduled-start wait was
    /// interrupted; `None` to continue into discovery. A past or absent
    /// schedule proceeds immediately.
    async fn wait_for_schedule(&self) -> Option<EngineOutcome> {
        let Some(scheduled) = self.options.scheduled_start else {
            return None;
        };
        let interrupted = self.runtime.sleep_until(scheduled, &self.token).await;
        if interrupted || self.token.is_cancelled() {
            return Some(EngineOutcome::Cancelled {
                reason: self.token.reason().unwrap_or_default(),
            });
        }
        None
    }

    /// Discovering: invoke discovery once, atomically replace the
    /// collection. Empty or failed discovery is fatal.
    async fn discover(&mut self) -> Result<(), EngineError> {
        let runner = Arc::clone(&self.runner);
        let session = self.options.session.clone();
        let info = tokio::task::spawn_blocking(move || {
            tmux_monitor_tmux::discover_panes(&*runner, session.as_deref())
        })
        .await
        .map_err(|err| EngineError::UnexpectedError(err.to_string()))?
        .map_err(EngineError::from)?;

        let pane_ids: Vec<&str> = info.iter().map(|p| p.pane_id.as_str()).collect();
        let reused = self.generations.observe(&pane_ids);
        if !reused.is_empty() {
            tracing::info!(reused = ?reused, "pane ids reused across discoveries; roles reassigned from scratch");
        }

        let mut fresh = Vec::with_capacity(info.len());
        for raw in &info {
            match Pane::from_discovery(&raw.to_raw_pane()) {
                Ok(pane) => fresh.push(pane),
                Err(err) => tracing::warn!(pane_id = %raw.pane_id, "skipping malformed pane id: {err}"),
            }
        }

        if fresh.is_empty() {
            return Err(EngineError::InvalidState("no_panes".to_string()));
        }

        self.collection.replace_all(fresh);
        self.last_status_snapshot.clear();
        Ok(())
    }

    /// StartupActions (§4.8 step 4): best-effort, never fails the engine.
    fn run_startup_actions(&self) {
        let candidates: Vec<StartupCandidate> = self
            .collection
            .all_sorted_by_numeric_id()
            .into_iter()
            .map(|pane| StartupCandidate {
                pane_id: pane.id().to_string(),
                current_command: pane.current_command().to_string(),
            })
            .collect();
        self.communicator.start_interactive_if_absent(&candidates);
    }

    /// One Capture → Clear → Report cycle body.
    async fn run_cycle(&mut self) -> Result<(), EngineError> {
        let capture_summary = capture_all(
            &mut self.collection,
            Arc::clone(&self.runner),
            &self.token,
            self.options.max_capture_retries,
        )
        .await?;
        for err in &capture_summary.errors {
            tracing::warn!(pane = %err.id, reason = %err.reason, "capture failed for pane, will retry next cycle");
        }

        let status_changes = self.count_status_changes();

        let clearable: Vec<PaneId> = self
            .collection
            .all_sorted_by_numeric_id()
            .into_iter()
            .filter(|p| p.should_be_cleared())
            .map(|p| p.id().clone())
            .collect();

        let mut cleared_count = 0usize;
        for id in clearable {
            if self.token.is_cancelled() {
                break;
            }
            let outcome = self.clear_one(&id).await;
            match outcome {
                ClearOutcome::Success { retry_count, strategy, .. } => {
                    cleared_count += 1;
                    if let Some(pane) = self.collection.get_mut(&id) {
                        pane.mark_cleared();
                    }
                    tracing::info!(pane = %id, ?strategy, retry_count, "pane cleared");
                }
                ClearOutcome::Failed { error, retry_count, strategy, .. } => {
                    if let Some(pane) = self.collection.get_mut(&id) {
                        pane.mark_clear_failed(error.clone());
                        pane.increment_clear_retries();
                    }
                    tracing::warn!(pane = %id, ?strategy, retry_count, %error, "clear protocol exhausted, will retry next cycle");
                }
                ClearOutcome::Skipped { reason, .. } => {
                    tracing::debug!(pane = %id, reason, "clear skipped");
                }
            }
        }

        if should_report(cleared_count, status_changes) {
            self.send_report(cleared_count, status_changes);
        }

        Ok(())
    }

    fn count_status_changes(&mut self) -> usize {
        let mut changes = 0;
        let mut next_snapshot = HashMap::with_capacity(self.collection.len());
        for pane in self.collection.all_sorted_by_numeric_id() {
            let kind = pane.status().kind();
            if let Some(prev_kind) = self.last_status_snapshot.get(pane.id()) {
                if *prev_kind != kind {
                    changes += 1;
                }
            }
            next_snapshot.insert(pane.id().clone(), kind);
        }
        self.last_status_snapshot = next_snapshot;
        changes
    }

    async fn clear_one(&self, id: &PaneId) -> ClearOutcome {
        let runner = Arc::clone(&self.runner);
        let pane_id = id.as_str().to_string();
        let capture_fn = move || {
            tmux_monitor_tmux::capture(&*runner, &pane_id).unwrap_or_default()
        };
        clear_pane(
            Arc::clone(&self.communicator),
            capture_fn,
            id,
            &self.token,
            self.options.max_clear_retries,
            self.options.dry_run_clear,
        )
        .await
    }

    /// Reporting (§4.8 step 8): skipped with `BusinessRuleViolation` when
    /// there is no active pane.
    fn send_report(&self, cleared_count: usize, status_changes: usize) {
        let Some(active) = self.collection.active() else {
            tracing::warn!("no active pane; skipping status report (ActivePaneRequired)");
            return;
        };
        let text = build_report(&ReportInput {
            collection: &self.collection,
            cleared_count,
            status_changes,
            now: Utc::now(),
        });
        if let Err(err) = self.communicator.send_message(active.id().as_str(), &text) {
            tracing::warn!(pane = %active.id(), "failed to send status report: {err}");
        }
    }
}
