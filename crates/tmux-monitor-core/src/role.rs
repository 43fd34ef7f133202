//! Ordinal role assignment (§4.1, §4.5).
//!
//! Roles are drawn from a fixed ordered template. `main`, `manager*` and
//! `secretary` are manager-like and are never handed to the Clear
//! Protocol; everything past the template's non-worker prefix is
//! worker-like and clearable when idle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The default ordered template: `main, manager1, manager2, secretary`,
/// after which every position is `workerK`.
pub const DEFAULT_ROLE_TEMPLATE: &[&str] = &["main", "manager1", "manager2", "secretary"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    ManagerLike,
    WorkerLike,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleName {
    name: String,
    kind: RoleKind,
}

impl RoleName {
    /// Build the role for `index` (0-based) given an ordered `template`.
    ///
    /// Indices within the template take the template's name verbatim.
    /// Indices past the end of the template fall back to `workerK`,
    /// where `K` continues counting past however many `worker*` entries
    /// the template itself already names.
    pub fn for_position(template: &[&str], index: usize) -> Self {
        if let Some(name) = template.get(index) {
            return Self::named(name);
        }
        let worker_count_in_template = template.iter().filter(|n| n.starts_with("worker")).count();
        let overflow = index - template.len();
        let k = worker_count_in_template + overflow + 1;
        Self::named(&format!("worker{k}"))
    }

    /// Build a role directly from a name, classifying its kind.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = classify(&name);
        Self { name, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RoleKind {
        self.kind
    }

    pub fn is_manager_like(&self) -> bool {
        self.kind == RoleKind::ManagerLike
    }

    pub fn is_worker_like(&self) -> bool {
        self.kind == RoleKind::WorkerLike
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn classify(name: &str) -> RoleKind {
    if name.starts_with("worker") {
        RoleKind::WorkerLike
    } else {
        RoleKind::ManagerLike
    }
}
