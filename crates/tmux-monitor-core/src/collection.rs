//! Pane Collection (C5): keyed set of Pane aggregates with ordinal sort
//! and role assignment.

use std::collections::HashMap;

use crate::classifier::WorkerStatusKind;
use crate::error::CoreError;
use crate::pane::Pane;
use crate::pane_id::PaneId;
use crate::role::RoleName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleAssignmentSummary {
    pub assigned: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct PaneCollection {
    panes: HashMap<PaneId, Pane>,
}

impl PaneCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `IllegalState` on a duplicate id.
    pub fn add(&mut self, pane: Pane) -> Result<(), CoreError> {
        if self.panes.contains_key(pane.id()) {
            return Err(CoreError::IllegalState(format!(
                "pane {} already present in collection",
                pane.id()
            )));
        }
        self.panes.insert(pane.id().clone(), pane);
        Ok(())
    }

    pub fn remove(&mut self, id: &PaneId) -> Option<Pane> {
        self.panes.remove(id)
    }

    pub fn get(&self, id: &PaneId) -> Option<&Pane> {
        self.panes.get(id)
    }

    pub fn get_mut(&mut self, id: &PaneId) -> Option<&mut Pane> {
        self.panes.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.panes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &Pane> {
        self.panes.values()
    }

    pub fn all_sorted_by_numeric_id(&self) -> Vec<&Pane> {
        let mut panes: Vec<&Pane> = self.panes.values().collect();
        panes.sort_by(|a, b| a.id().cmp(b.id()));
        panes
    }

    pub fn by_status(&self, kind: WorkerStatusKind) -> Vec<&Pane> {
        self.all_sorted_by_numeric_id()
            .into_iter()
            .filter(|p| p.status().kind() == kind)
            .collect()
    }

    /// The single pane whose `is_active` is true, or `None`.
    pub fn active(&self) -> Option<&Pane> {
        self.panes.values().find(|p| p.is_active())
    }

    /// Atomic swap: replaces the entire collection with a fresh set of
    /// panes, keyed by id. Used at discovery.
    pub fn replace_all(&mut self, panes: Vec<Pane>) {
        let mut fresh = HashMap::with_capacity(panes.len());
        for pane in panes {
            fresh.insert(pane.id().clone(), pane);
        }
        self.panes = fresh;
    }

    /// Role assignment is a total function over the stable numeric
    /// ordering of pane ids within this snapshot: sort by numeric id,
    /// assign `template[i]` to position `i` (§4.1, §4.5, invariant 5).
    ///
    /// A pane that rejects a role (because it already has a different
    /// one) is skipped and counted; the operation as a whole still
    /// succeeds.
    pub fn assign_roles(&mut self, template: &[&str]) -> RoleAssignmentSummary {
        let mut ids: Vec<PaneId> = self.panes.keys().cloned().collect();
        ids.sort();

        let mut summary = RoleAssignmentSummary::default();
        for (index, id) in ids.iter().enumerate() {
            let role = RoleName::for_position(template, index);
            let Some(pane) = self.panes.get_mut(id) else {
                continue;
            };
            match pane.assign_role(role) {
                Ok(()) => summary.assigned += 1,
                Err(_) => summary.skipped += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::RawPane;
    use crate::role::DEFAULT_ROLE_TEMPLATE;

    fn make_pane(id: &str) -> Pane {
        Pane::from_discovery(&RawPane {
            pane_id: id.to_string(),
            active: "0".to_string(),
            current_command: "zsh".to_string(),
            title: "t".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut coll = PaneCollection::new();
        coll.add(make_pane("%0")).unwrap();
        let err = coll.add(make_pane("%0")).unwrap_err();
        assert!(matches!(err, CoreError::IllegalState(_)));
    }

    #[test]
    fn all_sorted_by_numeric_id_orders_numerically() {
        let mut coll = PaneCollection::new();
        coll.add(make_pane("%10")).unwrap();
        coll.add(make_pane("%2")).unwrap();
        coll.add(make_pane("%1")).unwrap();

        let ids: Vec<&str> = coll
            .all_sorted_by_numeric_id()
            .iter()
            .map(|p| p.id().as_str())
            .collect();
        assert_eq!(ids, vec!["%1", "%2", "%10"]);
    }

    #[test]
    fn active_returns_the_focused_pane() {
        let mut coll = PaneCollection::new();
        coll.add(make_pane("%0")).unwrap();
        let active_pane = Pane::from_discovery(&RawPane {
            pane_id: "%1".to_string(),
            active: "1".to_string(),
            current_command: "zsh".to_string(),
            title: "t".to_string(),
        })
        .unwrap();
        coll.add(active_pane).unwrap();

        let found = coll.active().expect("one active pane");
        assert_eq!(found.id().as_str(), "%1");
    }

    #[test]
    fn active_returns_none_when_no_pane_focused() {
        let mut coll = PaneCollection::new();
        coll.add(make_pane("%0")).unwrap();
        assert!(coll.active().is_none());
    }

    #[test]
    fn replace_all_swaps_atomically() {
        let mut coll = PaneCollection::new();
        coll.add(make_pane("%0")).unwrap();
        coll.replace_all(vec![make_pane("%5"), make_pane("%6")]);
        assert_eq!(coll.len(), 2);
        assert!(coll.get(&PaneId::parse("%0").unwrap()).is_none());
        assert!(coll.get(&PaneId::parse("%5").unwrap()).is_some());
    }

    #[test]
    fn assign_roles_follows_template_in_numeric_order() {
        let mut coll = PaneCollection::new();
        coll.add(make_pane("%2")).unwrap();
        coll.add(make_pane("%0")).unwrap();
        coll.add(make_pane("%1")).unwrap();

        let summary = coll.assign_roles(DEFAULT_ROLE_TEMPLATE);
        assert_eq!(summary.assigned, 3);
        assert_eq!(summary.skipped, 0);

        assert_eq!(
            coll.get(&PaneId::parse("%0").unwrap()).unwrap().role().unwrap().name(),
            "main"
        );
        assert_eq!(
            coll.get(&PaneId::parse("%1").unwrap()).unwrap().role().unwrap().name(),
            "manager1"
        );
        assert_eq!(
            coll.get(&PaneId::parse("%2").unwrap()).unwrap().role().unwrap().name(),
            "manager2"
        );
    }

    #[test]
    fn assign_roles_is_invariant_under_input_permutation() {
        let mut a = PaneCollection::new();
        a.add(make_pane("%0")).unwrap();
        a.add(make_pane("%1")).unwrap();
        a.add(make_pane("%2")).unwrap();
        a.assign_roles(DEFAULT_ROLE_TEMPLATE);

        let mut b = PaneCollection::new();
        b.add(make_pane("%2")).unwrap();
        b.add(make_pane("%1")).unwrap();
        b.add(make_pane("%0")).unwrap();
        b.assign_roles(DEFAULT_ROLE_TEMPLATE);

        for id in ["%0", "%1", "%2"] {
            let pid = PaneId::parse(id).unwrap();
            assert_eq!(
                a.get(&pid).unwrap().role().unwrap().name(),
                b.get(&pid).unwrap().role().unwrap().name()
            );
        }
    }

    #[test]
    fn assign_roles_partial_success_skips_conflicting_pane() {
        let mut coll = PaneCollection::new();
        coll.add(make_pane("%0")).unwrap();
        coll.add(make_pane("%1")).unwrap();
        coll.get_mut(&PaneId::parse("%1").unwrap())
            .unwrap()
            .assign_role(crate::role::RoleName::named("worker99"))
            .unwrap();

        let summary = coll.assign_roles(DEFAULT_ROLE_TEMPLATE);
        assert_eq!(summary.assigned, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            coll.get(&PaneId::parse("%1").unwrap()).unwrap().role().unwrap().name(),
            "worker99"
        );
    }

    #[test]
    fn by_status_filters_by_kind() {
        let mut coll = PaneCollection::new();
        coll.add(make_pane("%0")).unwrap();
        coll.add(make_pane("%1")).unwrap();
        let unknown = coll.by_status(WorkerStatusKind::Unknown);
        assert_eq!(unknown.len(), 2);
        let idle = coll.by_status(WorkerStatusKind::Idle);
        assert!(idle.is_empty());
    }
}
