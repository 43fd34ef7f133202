//! Status-report wire format (§6), built from the current PaneCollection
//! and sent to the active pane via `sendMessage`.
//!
//! Display timestamps use `Asia/Tokyo`; this affects formatting only,
//! never scheduling arithmetic (§6 Environment).

use chrono::{DateTime, Utc};
use chrono_tz::Asia::Tokyo;
use tmux_monitor_core::{PaneCollection, WorkerStatusKind};

pub struct ReportInput<'a> {
    pub collection: &'a PaneCollection,
    pub cleared_count: usize,
    pub status_changes: usize,
    pub now: DateTime<Utc>,
}

/// `None` when the precondition for a report (clears executed, or any
/// status-kind change this cycle) is not met by the caller — callers
/// should check that before building a report; this function always
/// renders when asked.
pub fn build_report(input: &ReportInput<'_>) -> String {
    let local_time = input.now.with_timezone(&Tokyo).format("%H:%M:%S");
    let mut out = format!("📊 [{local_time}] tmux-monitor Status Report\n");

    if input.cleared_count > 0 {
        out.push_str(&format!("🧹 Cleared {} IDLE panes\n", input.cleared_count));
    }
    if input.status_changes > 0 {
        out.push_str(&format!(
            "📈 {} pane status changes detected\n",
            input.status_changes
        ));
    }

    out.push('\n');
    out.push_str("📋 Current Status:\n");
    out.push_str(&format!("  Total: {} panes\n", input.collection.len()));

    let ids_for = |kind: WorkerStatusKind| -> Vec<String> {
        input
            .collection
            .by_status(kind)
            .into_iter()
            .map(|p| p.id().to_string())
            .collect()
    };

    let working = ids_for(WorkerStatusKind::Working);
    if !working.is_empty() {
        out.push_str(&format!("  ⚡ Working ({}): {}\n", working.len(), working.join(",")));
    }
    let idle = ids_for(WorkerStatusKind::Idle);
    if !idle.is_empty() {
        out.push_str(&format!("  💤 Idle ({}): {}\n", idle.len(), idle.join(",")));
    }
    let done = ids_for(WorkerStatusKind::Done);
    if !done.is_empty() {
        out.push_str(&format!("  ✅ Done ({}): {}\n", done.len(), done.join(",")));
    }

    let available = input
        .collection
        .all_sorted_by_numeric_id()
        .iter()
        .filter(|p| p.can_assign_task())
        .count();
    out.push_str(&format!("  🎯 Available for tasks: {available}"));

    out
}

/// Whether this cycle's outcome warrants a report at all (§4.8 step 8).
pub fn should_report(cleared_count: usize, status_changes: usize) -> bool {
    cleared_count > 0 || status_changes > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmux_monitor_core::{CaptureSample, Pane, RawPane, RoleName};

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-02-25T03:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn idle_worker(id: &str) -> Pane {
        let mut pane = Pane::from_discovery(&RawPane {
            pane_id: id.to_string(),
            active: "0".to_string(),
            current_command: "node".to_string(),
            title: "t".to_string(),
        })
        .unwrap();
        pane.assign_role(RoleName::named("worker1")).unwrap();
        let sample = CaptureSample::new("x\ny\n│ > │", ts());
        pane.apply_capture(sample.clone()).unwrap();
        pane.apply_capture(sample).unwrap();
        pane
    }

    #[test]
    fn should_report_requires_clears_or_changes() {
        assert!(!should_report(0, 0));
        assert!(should_report(1, 0));
        assert!(should_report(0, 3));
    }

    #[test]
    fn report_includes_header_and_total() {
        let mut coll = PaneCollection::new();
        coll.add(idle_worker("%1")).unwrap();
        let input = ReportInput {
            collection: &coll,
            cleared_count: 1,
            status_changes: 2,
            now: ts(),
        };
        let report = build_report(&input);
        assert!(report.starts_with("📊 ["));
        assert!(report.contains("tmux-monitor Status Report"));
        assert!(report.contains("🧹 Cleared 1 IDLE panes"));
        assert!(report.contains("📈 2 pane status changes detected"));
        assert!(report.contains("Total: 1 panes"));
        assert!(report.contains("💤 Idle (1): %1"));
        assert!(report.contains("🎯 Available for tasks:"));
    }

    #[test]
    fn report_omits_cleared_and_changes_lines_when_zero() {
        let mut coll = PaneCollection::new();
        coll.add(idle_worker("%1")).unwrap();
        let input = ReportInput {
            collection: &coll,
            cleared_count: 0,
            status_changes: 0,
            now: ts(),
        };
        let report = build_report(&input);
        assert!(!report.contains("Cleared"));
        assert!(!report.contains("status changes"));
    }

    #[test]
    fn report_renders_tokyo_local_time() {
        let mut coll = PaneCollection::new();
        coll.add(idle_worker("%1")).unwrap();
        let input = ReportInput {
            collection: &coll,
            cleared_count: 0,
            status_changes: 1,
            now: ts(),
        };
        let report = build_report(&input);
        // ts() is 03:00 UTC = 12:00 JST.
        assert!(report.contains("[12:00:00]"));
    }
}
