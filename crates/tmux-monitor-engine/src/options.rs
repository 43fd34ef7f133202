//! `MonitoringOptions` (§9): the engine's sole configuration input. The
//! engine never reads argv or the environment directly — the binary
//! crate builds one of these from parsed CLI arguments and owns it.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

pub const DEFAULT_CYCLE_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_MAX_RUNTIME_MS: u64 = 14_400_000;
pub const DEFAULT_MAX_CAPTURE_RETRIES: u32 = 2;
pub const DEFAULT_MAX_CLEAR_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct MonitoringOptions {
    pub continuous: bool,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub instruction_file: Option<PathBuf>,
    pub kill_all_panes: bool,
    pub clear_panes: bool,
    pub clear_all_panes: bool,
    pub start_interactive: bool,
    pub cycle_interval_ms: u64,
    pub max_runtime_ms: u64,
    pub max_capture_retries: u32,
    pub max_clear_retries: u32,
    /// Scopes discovery to a single tmux session (supplements the
    /// distilled spec, which never forbids a global-only discovery).
    pub session: Option<String>,
    /// Logs what the Clear Protocol would do without sending any keys.
    pub dry_run_clear: bool,
}

impl Default for MonitoringOptions {
    fn default() -> Self {
        Self {
            continuous: true,
            scheduled_start: None,
            instruction_file: None,
            kill_all_panes: false,
            clear_panes: false,
            clear_all_panes: false,
            start_interactive: false,
            cycle_interval_ms: DEFAULT_CYCLE_INTERVAL_MS,
            max_runtime_ms: DEFAULT_MAX_RUNTIME_MS,
            max_capture_retries: DEFAULT_MAX_CAPTURE_RETRIES,
            max_clear_retries: DEFAULT_MAX_CLEAR_RETRIES,
            session: None,
            dry_run_clear: false,
        }
    }
}

impl MonitoringOptions {
    /// Per §6: `--clear`, `--clear-all` and `--start-claude` are one-time
    /// administrative flags; any of them forces one-shot mode regardless
    /// of `continuous`.
    pub fn is_one_shot(&self) -> bool {
        self.clear_panes || self.clear_all_panes || self.start_interactive || !self.continuous
    }
}
