//! The extracted source state for one run.

use std::collections::BTreeSet;

use pf_core::{Entity, Table};
use serde::Serialize;

use crate::entities::{
    decode_all, Client, Defect, DefectType, Finance, Phase, Project, ProjectEmployee,
    ProjectType, State, Task,
};
use crate::error::EtlResult;

/// Every source entity, decoded.
///
/// An entity whose extraction query was missing is present as an empty
/// vector and listed in `missing`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSnapshot {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub project_employees: Vec<ProjectEmployee>,
    pub states: Vec<State>,
    pub types: Vec<ProjectType>,
    pub finances: Vec<Finance>,
    pub clients: Vec<Client>,
    pub defect_types: Vec<DefectType>,
    pub phases: Vec<Phase>,
    pub defects: Vec<Defect>,
    pub missing: BTreeSet<Entity>,
}

/// Row count of one extracted entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityCount {
    pub entity: Entity,
    pub rows: usize,
    pub missing: bool,
}

impl SourceSnapshot {
    /// Decode an extracted table into the slot for `entity`.
    pub fn insert_table(&mut self, entity: Entity, table: &Table) -> EtlResult<()> {
        match entity {
            Entity::Projects => self.projects = decode_all(table)?,
            Entity::Tasks => self.tasks = decode_all(table)?,
            Entity::ProjectEmployees => self.project_employees = decode_all(table)?,
            Entity::States => self.states = decode_all(table)?,
            Entity::Types => self.types = decode_all(table)?,
            Entity::Finances => self.finances = decode_all(table)?,
            Entity::Clients => self.clients = decode_all(table)?,
            Entity::DefectTypes => self.defect_types = decode_all(table)?,
            Entity::Phases => self.phases = decode_all(table)?,
            Entity::Defects => self.defects = decode_all(table)?,
        }
        self.missing.remove(&entity);
        Ok(())
    }

    pub fn mark_missing(&mut self, entity: Entity) {
        self.missing.insert(entity);
    }

    pub fn is_missing(&self, entity: Entity) -> bool {
        self.missing.contains(&entity)
    }

    pub fn len(&self, entity: Entity) -> usize {
        match entity {
            Entity::Projects => self.projects.len(),
            Entity::Tasks => self.tasks.len(),
            Entity::ProjectEmployees => self.project_employees.len(),
            Entity::States => self.states.len(),
            Entity::Types => self.types.len(),
            Entity::Finances => self.finances.len(),
            Entity::Clients => self.clients.len(),
            Entity::DefectTypes => self.defect_types.len(),
            Entity::Phases => self.phases.len(),
            Entity::Defects => self.defects.len(),
        }
    }

    /// Single-column keys of the extracted rows, in extraction order.
    ///
    /// `None` for assignments, which are keyed by (project, employee).
    pub fn ids(&self, entity: Entity) -> Option<Vec<i64>> {
        let ids = match entity {
            Entity::Projects => self.projects.iter().map(|r| r.project_id).collect(),
            Entity::Tasks => self.tasks.iter().map(|r| r.task_id).collect(),
            Entity::ProjectEmployees => return None,
            Entity::States => self.states.iter().map(|r| r.state_id).collect(),
            Entity::Types => self.types.iter().map(|r| r.type_id).collect(),
            Entity::Finances => self.finances.iter().map(|r| r.finance_id).collect(),
            Entity::Clients => self.clients.iter().map(|r| r.client_id).collect(),
            Entity::DefectTypes => self.defect_types.iter().map(|r| r.defect_type_id).collect(),
            Entity::Phases => self.phases.iter().map(|r| r.phase_id).collect(),
            Entity::Defects => self.defects.iter().map(|r| r.defect_id).collect(),
        };
        Some(ids)
    }

    /// Row count per entity, in extraction order.
    pub fn counts(&self) -> Vec<EntityCount> {
        Entity::ALL
            .iter()
            .map(|&entity| EntityCount {
                entity,
                rows: self.len(entity),
                missing: self.is_missing(entity),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
