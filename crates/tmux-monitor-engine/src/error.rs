//! Engine-level error kinds (§7).

use thiserror::Error;

use tmux_monitor_core::CoreError;
use tmux_monitor_tmux::TmuxError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("tmux repository error: {0}")]
    RepositoryError(String),

    #[error("pane communication failed: {0}")]
    CommunicationFailed(String),

    #[error("business rule violation: {0}")]
    BusinessRuleViolation(String),

    #[error("cancellation requested")]
    CancellationRequested,

    #[error("runtime limit exceeded")]
    RuntimeLimitExceeded,

    #[error("unexpected error: {0}")]
    UnexpectedError(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<TmuxError> for EngineError {
    fn from(err: TmuxError) -> Self {
        EngineError::RepositoryError(err.to_string())
    }
}
