//! Core error taxonomy.
//!
//! Mirrors the tagged error kinds that originate inside value
//! constructors and aggregate state-machine guards. Transport- and
//! communication-level kinds (`RepositoryError`, `CommunicationFailed`,
//! `CancellationRequested`, `RuntimeLimitExceeded`, ...) live closer to
//! where they're raised, in `tmux-monitor-tmux` and `tmux-monitor-engine`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),
}
