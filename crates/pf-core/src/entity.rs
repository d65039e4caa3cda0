//! Source entities extracted from the operational (PMO) store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One logical dataset pulled from the source store.
///
/// Each variant maps to exactly one named extraction query. The order of
/// [`Entity::ALL`] is the extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Projects,
    Tasks,
    ProjectEmployees,
    States,
    Types,
    Finances,
    Clients,
    DefectTypes,
    Phases,
    Defects,
}

impl Entity {
    /// Every entity, in extraction order.
    pub const ALL: [Entity; 10] = [
        Entity::Projects,
        Entity::Tasks,
        Entity::ProjectEmployees,
        Entity::States,
        Entity::Types,
        Entity::Finances,
        Entity::Clients,
        Entity::DefectTypes,
        Entity::Phases,
        Entity::Defects,
    ];

    /// Name of the extraction query that produces this entity.
    pub fn query_name(self) -> &'static str {
        match self {
            Entity::Projects => "extract_projects",
            Entity::Tasks => "extract_tasks",
            Entity::ProjectEmployees => "extract_project_employees",
            Entity::States => "extract_states",
            Entity::Types => "extract_types",
            Entity::Finances => "extract_finances",
            Entity::Clients => "extract_clients",
            Entity::DefectTypes => "extract_defect_types",
            Entity::Phases => "extract_phases",
            Entity::Defects => "extract_defects",
        }
    }

    /// Snake-case identifier, as used in `pmoflow.yml`.
    pub fn as_str(self) -> &'static str {
        match self {
            Entity::Projects => "projects",
            Entity::Tasks => "tasks",
            Entity::ProjectEmployees => "project_employees",
            Entity::States => "states",
            Entity::Types => "types",
            Entity::Finances => "finances",
            Entity::Clients => "clients",
            Entity::DefectTypes => "defect_types",
            Entity::Phases => "phases",
            Entity::Defects => "defects",
        }
    }

    /// Whether rows of this entity are identified by a single integer key.
    ///
    /// Assignments are keyed by (project, employee) and cannot be marked.
    pub fn has_single_key(self) -> bool {
        !matches!(self, Entity::ProjectEmployees)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
