//! Pane generation tracking (supplemented feature, §2 of the expanded
//! spec): in-memory-only observability of pane id reuse across
//! discoveries within a single process lifetime. Carries no
//! classification or clearing semantics — purely informs a richer
//! `tracing::info!` line at re-discovery. No persistence across
//! restarts.

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct PaneGenerationTracker {
    seen: HashSet<String>,
}

impl PaneGenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the current discovery's pane ids and returns which of them
    /// were already seen in a prior discovery this process lifetime.
    pub fn observe(&mut self, pane_ids: &[&str]) -> Vec<String> {
        let reused: Vec<String> = pane_ids
            .iter()
            .filter(|id| self.seen.contains(**id))
            .map(|id| id.to_string())
            .collect();
        for id in pane_ids {
            self.seen.insert(id.to_string());
        }
        reused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_discovery_reports_no_reuse() {
        let mut tracker = PaneGenerationTracker::new();
        let reused = tracker.observe(&["%0", "%1"]);
        assert!(reused.is_empty());
    }

    #[test]
    fn second_discovery_with_same_id_reports_reuse() {
        let mut tracker = PaneGenerationTracker::new();
        tracker.observe(&["%0", "%1"]);
        let reused = tracker.observe(&["%0", "%2"]);
        assert_eq!(reused, vec!["%0".to_string()]);
    }
}
