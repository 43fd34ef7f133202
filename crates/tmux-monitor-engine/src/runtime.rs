//! Runtime Tracker & Scheduler (C9).

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tmux_monitor_core::CancellationToken;

#[derive(Debug, Clone)]
pub struct RuntimeTracker {
    started_at: DateTime<Utc>,
    max_runtime_ms: u64,
    scheduled_start: Option<DateTime<Utc>>,
}

impl RuntimeTracker {
    pub fn new(started_at: DateTime<Utc>, max_runtime_ms: u64, scheduled_start: Option<DateTime<Utc>>) -> Self {
        Self {
            started_at,
            max_runtime_ms,
            scheduled_start,
        }
    }

    fn baseline(&self) -> DateTime<Utc> {
        self.scheduled_start.unwrap_or(self.started_at)
    }

    /// True once `now - baseline >= maxRuntimeMs`. The baseline is the
    /// scheduled start when present, else the actual start (§9 open
    /// question: this implementation fixes the cap to the scheduled
    /// instant when one was configured).
    pub fn has_exceeded_limit(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now.signed_duration_since(self.baseline());
        elapsed >= ChronoDuration::milliseconds(self.max_runtime_ms as i64)
    }

    pub fn next_cycle_deadline(&self, last_tick: DateTime<Utc>, interval_ms: u64) -> DateTime<Utc> {
        last_tick + ChronoDuration::milliseconds(interval_ms as i64)
    }

    /// Waits until `instant` (or returns immediately if already past),
    /// via the cancellation token's preemptible sleep. Returns `true` if
    /// the wait was interrupted by cancellation.
    pub async fn sleep_until(&self, instant: DateTime<Utc>, token: &CancellationToken) -> bool {
        let now = Utc::now();
        if instant <= now {
            return token.is_cancelled();
        }
        let duration = (instant - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);
        token.sleep(duration).await
    }
}
