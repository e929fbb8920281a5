//! Project status lookup values and the lifecycle transition table.
//!
//! The numeric ids must match the seed rows of the `project_statuses` table in
//! `20260301000002_create_projects.sql`.

use serde::{Deserialize, Serialize};

use crate::types::StatusId;

/// Where a project is in its lifecycle.
///
/// `Pending → Approved → InProgress → Completed`, with `Rejected` reachable
/// only from `Pending`. `Completed` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum ProjectStatus {
    Pending = 1,
    Approved = 2,
    InProgress = 3,
    Completed = 4,
    Rejected = 5,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Pending,
        ProjectStatus::Approved,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
        ProjectStatus::Rejected,
    ];

    /// The `project_statuses.id` value for this status.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    pub fn from_id(id: StatusId) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    /// Machine name, as stored in `project_statuses.name`.
    pub fn name(self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Approved => "approved",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Rejected => "rejected",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Human-readable label used in exports and notification text.
    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pending",
            ProjectStatus::Approved => "Approved",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Rejected)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// `InProgress → InProgress` is a council re-assignment.
    pub fn can_transition_to(self, next: ProjectStatus) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, InProgress)
                | (InProgress, InProgress)
                | (InProgress, Completed)
        )
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for status in ProjectStatus::ALL {
            assert_eq!(ProjectStatus::from_id(status.id()), Some(status));
            assert_eq!(ProjectStatus::from_name(status.name()), Some(status));
        }
        assert_eq!(ProjectStatus::from_id(0), None);
        assert_eq!(ProjectStatus::from_name("archived"), None);
    }

    #[test]
    fn rejected_only_reachable_from_pending() {
        for from in ProjectStatus::ALL {
            let allowed = from.can_transition_to(ProjectStatus::Rejected);
            assert_eq!(allowed, from == ProjectStatus::Pending, "from {from}");
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [ProjectStatus::Completed, ProjectStatus::Rejected] {
            assert!(from.is_terminal());
            for to in ProjectStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn completion_only_from_in_progress() {
        for from in ProjectStatus::ALL {
            assert_eq!(
                from.can_transition_to(ProjectStatus::Completed),
                from == ProjectStatus::InProgress
            );
        }
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
