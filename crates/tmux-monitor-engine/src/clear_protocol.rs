//! Clear Protocol (C7): strategy escalation with verification for a
//! single worker-like pane.

use std::sync::Arc;

use tmux_monitor_core::{CancellationToken, PaneId};
use tmux_monitor_tmux::PaneCommunicator;

use crate::error::EngineError;

const SETTLE_AFTER_DIRECT_CLEAR: std::time::Duration = std::time::Duration::from_secs(2);
const RETRY_SLEEP: std::time::Duration = std::time::Duration::from_secs(1);
const INCREMENTAL_ESCAPE_GAP: std::time::Duration = std::time::Duration::from_millis(500);
const RECOVERY_STEP_GAP: std::time::Duration = std::time::Duration::from_millis(500);
const MAX_INCREMENTAL_ESCAPES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearStrategy {
    DirectClear,
    SingleEscape,
    IncrementalEscape,
    RecoverySequence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    Cleared,
    NotCleared { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    Success {
        pane_id: PaneId,
        strategy: ClearStrategy,
        retry_count: u32,
    },
    Failed {
        pane_id: PaneId,
        error: String,
        strategy: ClearStrategy,
        retry_count: u32,
    },
    Skipped {
        pane_id: PaneId,
        reason: String,
    },
}

/// Capture the pane's last 10 lines and classify as cleared / not cleared.
pub fn verify(content: &str) -> VerifyResult {
    let clear_count = content.matches("/clear").count();
    if clear_count > 1 {
        return VerifyResult::NotCleared {
            reason: "multiple /clear accumulated".to_string(),
        };
    }

    let trimmed = content.trim_end();
    let looks_cleared = content.trim().is_empty()
        || trimmed.ends_with("> $")
        || trimmed.ends_with('⎿')
        || (content.to_ascii_lowercase().contains("claude") && clear_count <= 1);

    if looks_cleared {
        VerifyResult::Cleared
    } else {
        VerifyResult::NotCleared {
            reason: "pattern absent".to_string(),
        }
    }
}

/// Runs the full strategy escalation for one pane, retrying up to
/// `max_retries` strategies, sleeping preemptibly between attempts.
pub async fn clear_pane<C, R>(
    communicator: Arc<C>,
    capture_fn: R,
    pane_id: &PaneId,
    token: &CancellationToken,
    max_retries: u32,
    dry_run: bool,
) -> ClearOutcome
where
    C: PaneCommunicator + 'static,
    R: Fn() -> String,
{
    if dry_run {
        tracing::info!(pane = %pane_id, "dry-run-clear: would run Clear Protocol");
        return ClearOutcome::Skipped {
            pane_id: pane_id.clone(),
            reason: "dry_run_clear".to_string(),
        };
    }

    let strategies = [
        ClearStrategy::DirectClear,
        ClearStrategy::SingleEscape,
        ClearStrategy::IncrementalEscape,
        ClearStrategy::RecoverySequence,
    ];

    let mut retry_count = 0;
    for (idx, strategy) in strategies.iter().enumerate() {
        if idx as u32 >= max_retries + 1 {
            break;
        }
        if token.is_cancelled() {
            return ClearOutcome::Failed {
                pane_id: pane_id.clone(),
                error: "cancelled".to_string(),
                strategy: *strategy,
                retry_count,
            };
        }

        let verdict = if *strategy == ClearStrategy::IncrementalEscape {
            run_incremental_escape(&communicator, pane_id, &capture_fn, token).await
        } else {
            match run_strategy(&communicator, pane_id, *strategy, token).await {
                Ok(()) => Ok(verify(&capture_fn())),
                Err(err) => Err(err),
            }
        };

        match verdict {
            Err(err) => {
                return ClearOutcome::Failed {
                    pane_id: pane_id.clone(),
                    error: err.to_string(),
                    strategy: *strategy,
                    retry_count,
                };
            }
            Ok(VerifyResult::Cleared) => {
                return ClearOutcome::Success {
                    pane_id: pane_id.clone(),
                    strategy: *strategy,
                    retry_count,
                };
            }
            Ok(VerifyResult::NotCleared { reason }) => {
                tracing::debug!(pane = %pane_id, ?strategy, reason, "clear not verified");
                token.sleep(RETRY_SLEEP).await;
                retry_count += 1;
            }
        }
    }

    ClearOutcome::Failed {
        pane_id: pane_id.clone(),
        error: "exhausted all strategies".to_string(),
        strategy: ClearStrategy::RecoverySequence,
        retry_count,
    }
}

async fn run_strategy<C>(
    communicator: &Arc<C>,
    pane_id: &PaneId,
    strategy: ClearStrategy,
    token: &CancellationToken,
) -> Result<(), EngineError>
where
    C: PaneCommunicator + 'static,
{
    let pane = pane_id.as_str();
    match strategy {
        ClearStrategy::DirectClear => {
            communicator.send_clear_command(pane)?;
            token.sleep(SETTLE_AFTER_DIRECT_CLEAR).await;
        }
        ClearStrategy::SingleEscape => {
            communicator.send_key(pane, "Escape")?;
        }
        ClearStrategy::IncrementalEscape => {
            unreachable!("IncrementalEscape is handled by run_incremental_escape")
        }
        ClearStrategy::RecoverySequence => {
            communicator.send_key(pane, "Escape")?;
            token.sleep(RECOVERY_STEP_GAP).await;
            communicator.send_key(pane, "Enter")?;
            token.sleep(RECOVERY_STEP_GAP).await;
            communicator.send_message(pane, "clear")?;
            token.sleep(RECOVERY_STEP_GAP).await;
            communicator.send_key(pane, "Enter")?;
            token.sleep(RECOVERY_STEP_GAP).await;
            communicator.send_key(pane, "C-l")?;
            token.sleep(RECOVERY_STEP_GAP).await;
            communicator.send_message(pane, "reset")?;
            token.sleep(RECOVERY_STEP_GAP).await;
            communicator.send_key(pane, "Enter")?;
        }
    }
    Ok(())
}

/// Sends `Escape` up to `MAX_INCREMENTAL_ESCAPES` times, verifying after
/// each and stopping early the moment verification succeeds.
async fn run_incremental_escape<C, R>(
    communicator: &Arc<C>,
    pane_id: &PaneId,
    capture_fn: &R,
    token: &CancellationToken,
) -> Result<VerifyResult, EngineError>
where
    C: PaneCommunicator + 'static,
    R: Fn() -> String,
{
    let pane = pane_id.as_str();
    let mut last = VerifyResult::NotCleared {
        reason: "incremental escape not attempted".to_string(),
    };
    for _ in 0..MAX_INCREMENTAL_ESCAPES {
        communicator.send_key(pane, "Escape")?;
        token.sleep(INCREMENTAL_ESCAPE_GAP).await;
        last = verify(&capture_fn());
        if last == VerifyResult::Cleared {
            break;
        }
    }
    Ok(last)
}
