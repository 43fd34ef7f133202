//! Pane Aggregate (C4): one pane's full state — identity, role, last
//! command, current/previous capture, and derived statuses.

use serde::{Deserialize, Serialize};

use crate::classifier::{
    classify_activity, derive_worker_status, detect_input_field, ActivityStatus, CaptureSample,
    InputFieldStatus, WorkerStatus, WorkerStatusKind,
};
use crate::error::CoreError;
use crate::pane_id::PaneId;
use crate::role::RoleName;

/// The subset of a discovery record a `Pane` is built from. The full
/// 15-field wire record lives in `tmux-monitor-tmux`; the engine maps it
/// down to this shape when discovering panes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPane {
    pub pane_id: String,
    /// `"1"` if this is the tmux-reported focused pane, else `"0"`.
    pub active: String,
    pub current_command: String,
    pub title: String,
}

/// Snapshot of one pane's full state, for debug dumps (`tracing`
/// `?pane` fields and ad-hoc diagnostics) — not read back by anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pane {
    id: PaneId,
    role: Option<RoleName>,
    is_active: bool,
    current_command: String,
    title: String,
    prev: Option<CaptureSample>,
    curr: Option<CaptureSample>,
    activity: ActivityStatus,
    input: InputFieldStatus,
    status: WorkerStatus,
    clear_retries: u32,
    last_clear_failure: Option<String>,
}

impl Pane {
    /// Build a pane from a raw discovery record. Fails if the pane id is
    /// malformed.
    pub fn from_discovery(raw: &RawPane) -> Result<Self, CoreError> {
        let id = PaneId::parse(raw.pane_id.clone())?;
        Ok(Self {
            id,
            role: None,
            is_active: raw.active == "1",
            current_command: raw.current_command.clone(),
            title: raw.title.clone(),
            prev: None,
            curr: None,
            activity: ActivityStatus::NotEvaluated,
            input: InputFieldStatus::NoInputField,
            status: WorkerStatus::Unknown { last_known: None },
            clear_retries: 0,
            last_clear_failure: None,
        })
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn id(&self) -> &PaneId {
        &self.id
    }

    pub fn role(&self) -> Option<&RoleName> {
        self.role.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn current_command(&self) -> &str {
        &self.current_command
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn prev(&self) -> Option<&CaptureSample> {
        self.prev.as_ref()
    }

    pub fn curr(&self) -> Option<&CaptureSample> {
        self.curr.as_ref()
    }

    pub fn activity(&self) -> ActivityStatus {
        self.activity
    }

    pub fn input(&self) -> InputFieldStatus {
        self.input
    }

    pub fn status(&self) -> &WorkerStatus {
        &self.status
    }

    pub fn clear_retries(&self) -> u32 {
        self.clear_retries
    }

    pub fn last_clear_failure(&self) -> Option<&str> {
        self.last_clear_failure.as_deref()
    }

    pub fn is_working(&self) -> bool {
        self.status.kind() == WorkerStatusKind::Working
    }

    pub fn is_idle(&self) -> bool {
        self.status.kind() == WorkerStatusKind::Idle
    }

    pub fn is_done(&self) -> bool {
        self.status.kind() == WorkerStatusKind::Done
    }

    pub fn is_terminated(&self) -> bool {
        self.status.kind() == WorkerStatusKind::Terminated
    }

    /// Invariant 4: `Done|Idle|Terminated` is task-assignable only with
    /// an empty input field and at least one capture evaluated.
    pub fn can_assign_task(&self) -> bool {
        matches!(
            self.status.kind(),
            WorkerStatusKind::Done | WorkerStatusKind::Idle | WorkerStatusKind::Terminated
        ) && self.input == InputFieldStatus::Empty
            && self.activity != ActivityStatus::NotEvaluated
    }

    /// Invariant 3: manager-like roles are never eligible for clearing.
    pub fn should_be_cleared(&self) -> bool {
        let Some(role) = &self.role else {
            return false;
        };
        role.is_worker_like()
            && matches!(
                self.status.kind(),
                WorkerStatusKind::Idle | WorkerStatusKind::Done
            )
            && self.input == InputFieldStatus::Empty
    }

    // ── Mutations (total, Result-returning) ──────────────────────────

    /// Idempotent: a second call with the same role succeeds; a second
    /// call with a different role fails with `IllegalState`.
    pub fn assign_role(&mut self, role: RoleName) -> Result<(), CoreError> {
        match &self.role {
            None => {
                self.role = Some(role);
                Ok(())
            }
            Some(existing) if *existing == role => Ok(()),
            Some(existing) => Err(CoreError::IllegalState(format!(
                "pane {} already has role {existing}, cannot reassign to {role}",
                self.id
            ))),
        }
    }

    /// Rolls `prev <- curr`, stores the new sample as `curr`, and
    /// re-derives `activity`, `input` and `status`. Fails only if the
    /// sample has fewer than three lines, in which case no state is
    /// mutated.
    pub fn apply_capture(&mut self, sample: CaptureSample) -> Result<(), CoreError> {
        let input = detect_input_field(&sample.content)?;

        let activity = classify_activity(self.curr.as_ref(), &sample);
        let status = derive_worker_status(activity, &sample.content);

        self.prev = self.curr.take();
        self.curr = Some(sample);
        self.activity = activity;
        self.input = input;
        self.status = status;
        Ok(())
    }

    pub fn mark_cleared(&mut self) {
        self.clear_retries = 0;
        self.last_clear_failure = None;
    }

    pub fn mark_clear_failed(&mut self, reason: impl Into<String>) {
        self.last_clear_failure = Some(reason.into());
    }

    pub fn increment_clear_retries(&mut self) {
        self.clear_retries += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-02-25T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn raw(id: &str, active: &str, cmd: &str) -> RawPane {
        RawPane {
            pane_id: id.to_string(),
            active: active.to_string(),
            current_command: cmd.to_string(),
            title: "title".to_string(),
        }
    }

    #[test]
    fn from_discovery_parses_active_flag() {
        let pane = Pane::from_discovery(&raw("%0", "1", "zsh")).unwrap();
        assert!(pane.is_active());
        let pane2 = Pane::from_discovery(&raw("%1", "0", "zsh")).unwrap();
        assert!(!pane2.is_active());
    }

    #[test]
    fn from_discovery_rejects_invalid_id() {
        assert!(Pane::from_discovery(&raw("bad", "1", "zsh")).is_err());
    }

    #[test]
    fn initial_activity_is_not_evaluated() {
        let pane = Pane::from_discovery(&raw("%0", "1", "zsh")).unwrap();
        assert_eq!(pane.activity(), ActivityStatus::NotEvaluated);
        assert!(pane.prev().is_none());
        assert!(pane.curr().is_none());
    }

    #[test]
    fn assign_role_idempotent_same_role_ok() {
        let mut pane = Pane::from_discovery(&raw("%0", "1", "zsh")).unwrap();
        pane.assign_role(RoleName::named("main")).unwrap();
        pane.assign_role(RoleName::named("main")).unwrap();
        assert_eq!(pane.role().unwrap().name(), "main");
    }

    #[test]
    fn assign_role_rejects_reassignment_with_different_role() {
        let mut pane = Pane::from_discovery(&raw("%0", "1", "zsh")).unwrap();
        pane.assign_role(RoleName::named("main")).unwrap();
        let err = pane.assign_role(RoleName::named("worker1")).unwrap_err();
        assert!(matches!(err, CoreError::IllegalState(_)));
    }

    #[test]
    fn apply_capture_rejects_short_sample_without_mutating() {
        let mut pane = Pane::from_discovery(&raw("%0", "1", "zsh")).unwrap();
        let err = pane
            .apply_capture(CaptureSample::new("only\ntwo", ts()))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed(_)));
        assert_eq!(pane.activity(), ActivityStatus::NotEvaluated);
        assert!(pane.curr().is_none());
    }

    #[test]
    fn apply_capture_rolls_prev_and_curr() {
        let mut pane = Pane::from_discovery(&raw("%0", "1", "zsh")).unwrap();
        let first = CaptureSample::new("a\nb\nc", ts());
        pane.apply_capture(first.clone()).unwrap();
        assert_eq!(pane.activity(), ActivityStatus::NotEvaluated);
        assert_eq!(pane.curr(), Some(&first));
        assert!(pane.prev().is_none());

        let second = CaptureSample::new("a\nb\nd", ts());
        pane.apply_capture(second.clone()).unwrap();
        assert_eq!(pane.prev(), Some(&first));
        assert_eq!(pane.curr(), Some(&second));
        assert_eq!(pane.activity(), ActivityStatus::Working);
    }

    #[test]
    fn should_be_cleared_false_without_role() {
        let mut pane = Pane::from_discovery(&raw("%0", "1", "zsh")).unwrap();
        let sample = CaptureSample::new("x\ny\n│ > │", ts());
        pane.apply_capture(sample.clone()).unwrap();
        pane.apply_capture(sample).unwrap();
        assert!(!pane.should_be_cleared());
    }

    #[test]
    fn should_be_cleared_true_for_idle_empty_worker() {
        let mut pane = Pane::from_discovery(&raw("%1", "0", "node")).unwrap();
        pane.assign_role(RoleName::named("worker1")).unwrap();
        let sample = CaptureSample::new("x\ny\n│ > │", ts());
        pane.apply_capture(sample.clone()).unwrap();
        pane.apply_capture(sample).unwrap();
        assert_eq!(pane.activity(), ActivityStatus::Idle);
        assert_eq!(pane.input(), InputFieldStatus::Empty);
        assert!(pane.should_be_cleared());
    }

    #[test]
    fn should_be_cleared_false_for_manager_like_role_even_when_idle_empty() {
        let mut pane = Pane::from_discovery(&raw("%0", "1", "zsh")).unwrap();
        pane.assign_role(RoleName::named("main")).unwrap();
        let sample = CaptureSample::new("x\ny\n│ > │", ts());
        pane.apply_capture(sample.clone()).unwrap();
        pane.apply_capture(sample).unwrap();
        assert!(!pane.should_be_cleared(), "manager-like pane must never be cleared");
    }

    #[test]
    fn should_be_cleared_false_when_input_has_content() {
        let mut pane = Pane::from_discovery(&raw("%1", "0", "node")).unwrap();
        pane.assign_role(RoleName::named("worker1")).unwrap();
        let sample = CaptureSample::new("x\ny\n│ > typing│", ts());
        pane.apply_capture(sample.clone()).unwrap();
        pane.apply_capture(sample).unwrap();
        assert!(!pane.should_be_cleared());
    }

    #[test]
    fn can_assign_task_requires_empty_input_and_evaluated_activity() {
        let mut pane = Pane::from_discovery(&raw("%1", "0", "node")).unwrap();
        pane.assign_role(RoleName::named("worker1")).unwrap();
        assert!(!pane.can_assign_task(), "not yet evaluated");

        let sample = CaptureSample::new("x\ny\n│ > │", ts());
        pane.apply_capture(sample.clone()).unwrap();
        pane.apply_capture(sample).unwrap();
        assert!(pane.can_assign_task());
    }

    #[test]
    fn clear_bookkeeping_roundtrip() {
        let mut pane = Pane::from_discovery(&raw("%1", "0", "node")).unwrap();
        pane.increment_clear_retries();
        pane.increment_clear_retries();
        pane.mark_clear_failed("multiple /clear accumulated");
        assert_eq!(pane.clear_retries(), 2);
        assert_eq!(pane.last_clear_failure(), Some("multiple /clear accumulated"));

        pane.mark_cleared();
        assert_eq!(pane.clear_retries(), 0);
        assert!(pane.last_clear_failure().is_none());
    }
}
