//! tmux-monitor-engine: the Monitoring Cycle Engine — capture
//! orchestration, the clear protocol, status reporting, the runtime
//! tracker/scheduler, and the top-level state machine that wires them
//! together. Takes a `TmuxCommandRunner` + `PaneCommunicator` pair from
//! `tmux-monitor-tmux` and drives `tmux-monitor-core`'s pane collection.

pub mod capture_orchestrator;
pub mod clear_protocol;
pub mod engine;
pub mod error;
pub mod generation;
pub mod options;
pub mod report;
pub mod runtime;

pub use capture_orchestrator::{capture_all, CaptureError, CaptureSummary};
pub use clear_protocol::{clear_pane, verify, ClearOutcome, ClearStrategy, VerifyResult};
pub use engine::{Engine, EngineOutcome};
pub use error::EngineError;
pub use generation::PaneGenerationTracker;
pub use options::{
    MonitoringOptions, DEFAULT_CYCLE_INTERVAL_MS, DEFAULT_MAX_CAPTURE_RETRIES,
    DEFAULT_MAX_CLEAR_RETRIES, DEFAULT_MAX_RUNTIME_MS,
};
pub use report::{build_report, should_report, ReportInput};
pub use runtime::RuntimeTracker;
