//! tmux-monitor-core: pane identity, cancellation, activity
//! classification and the pane-collection state machine. Pure,
//! synchronous business logic (apart from `CancellationToken::sleep`,
//! which suspends) — no IO, no tmux-process knowledge.

pub mod cancellation;
pub mod classifier;
pub mod collection;
pub mod error;
pub mod pane;
pub mod pane_id;
pub mod role;

pub use cancellation::{CancellationInfo, CancellationToken};
pub use classifier::{
    classify_activity, derive_worker_status, detect_input_field, normalize, ActivityStatus,
    CaptureSample, InputFieldStatus, WorkerStatus, WorkerStatusKind,
};
pub use collection::{PaneCollection, RoleAssignmentSummary};
pub use error::CoreError;
pub use pane::{Pane, RawPane};
pub use pane_id::PaneId;
pub use role::{RoleKind, RoleName, DEFAULT_ROLE_TEMPLATE};
