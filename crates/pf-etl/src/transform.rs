//! Transformation: source snapshot to star schema.
//!
//! This module performs no I/O. The same snapshot and options always produce
//! the same schema.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use pf_core::{ProjectScope, TransformConfig};

use crate::calendar::{time_id, Calendar};
use crate::entities::{Finance, Project, Task};
use crate::metrics::{cycle_time, task_counts, FinanceTotals};
use crate::snapshot::SourceSnapshot;
use crate::star::{
    DimClient, DimDefectType, DimPhase, DimProjectType, DimState, FactDefect, FactProject,
    StarSchema,
};

/// Build every dimension and fact table from one snapshot.
///
/// An empty project set yields an empty schema.
pub fn transform(snapshot: &SourceSnapshot, options: &TransformConfig) -> StarSchema {
    if snapshot.projects.is_empty() {
        log::info!("No projects to transform");
        return StarSchema::default();
    }

    let scoped;
    let source = match options.project_scope {
        ProjectScope::All => snapshot,
        ProjectScope::Terminal => {
            scoped = terminal_scope(snapshot, &options.terminal_states);
            log::info!(
                "Projects in terminal scope: {} -> {}",
                snapshot.projects.len(),
                scoped.projects.len()
            );
            &scoped
        }
    };

    let calendar = Calendar::build(referenced_dates(source), options.locale);

    StarSchema {
        years: calendar.years,
        months: calendar.months,
        days: calendar.days,
        times: calendar.times,
        states: source
            .states
            .iter()
            .map(|s| DimState {
                state_id: s.state_id,
                state_name: s.state_name.clone(),
            })
            .collect(),
        project_types: source
            .types
            .iter()
            .map(|t| DimProjectType {
                type_id: t.type_id,
                name: t.name.clone(),
            })
            .collect(),
        clients: source
            .clients
            .iter()
            .map(|c| DimClient {
                client_id: c.client_id,
                name: c.name.clone(),
                sector: c.sector.clone(),
                country: c.country.clone(),
            })
            .collect(),
        defect_types: source
            .defect_types
            .iter()
            .map(|dt| DimDefectType {
                defect_type_id: dt.defect_type_id,
                name: dt.display_name(),
            })
            .collect(),
        phases: source
            .phases
            .iter()
            .map(|p| DimPhase {
                phase_id: p.phase_id,
                phase_name: p.phase_name.clone(),
            })
            .collect(),
        projects: project_facts(source),
        defects: source
            .defects
            .iter()
            .map(|d| FactDefect {
                project_id: d.project_id,
                defect_type_id: d.defect_type_id,
                phase_id: d.phase_id,
                severity: d.severity.clone(),
                time_id: d.registered_on.map(time_id),
            })
            .collect(),
    }
}

/// Every date a fact row will reference.
fn referenced_dates(source: &SourceSnapshot) -> impl Iterator<Item = NaiveDate> + '_ {
    let project_dates = source.projects.iter().flat_map(|p| {
        [p.plan_start, p.plan_end, p.actual_start, p.actual_end]
            .into_iter()
            .flatten()
    });
    let defect_dates = source.defects.iter().filter_map(|d| d.registered_on);
    project_dates.chain(defect_dates)
}

fn project_facts(source: &SourceSnapshot) -> Vec<FactProject> {
    let mut tasks_by_catalog: HashMap<i64, Vec<&Task>> = HashMap::new();
    for task in &source.tasks {
        if let Some(catalog_id) = task.catalog_id {
            tasks_by_catalog.entry(catalog_id).or_default().push(task);
        }
    }

    let mut finances_by_project: HashMap<i64, Vec<&Finance>> = HashMap::new();
    for finance in &source.finances {
        if let Some(project_id) = finance.project_id {
            finances_by_project.entry(project_id).or_default().push(finance);
        }
    }

    let mut employees_by_project: HashMap<i64, i64> = HashMap::new();
    for assignment in &source.project_employees {
        *employees_by_project.entry(assignment.project_id).or_default() += 1;
    }

    source
        .projects
        .iter()
        .map(|project| {
            let tasks = project
                .catalog_id
                .and_then(|id| tasks_by_catalog.get(&id))
                .map(Vec::as_slice)
                .unwrap_or_default();
            let finances = finances_by_project
                .get(&project.project_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let employees = employees_by_project
                .get(&project.project_id)
                .copied()
                .unwrap_or(0);
            project_fact(project, tasks, finances, employees)
        })
        .collect()
}

fn project_fact(
    project: &Project,
    tasks: &[&Task],
    finances: &[&Finance],
    employees_assigned: i64,
) -> FactProject {
    let counts = task_counts(tasks.iter().copied(), project.actual_end);
    let totals = FinanceTotals::sum(finances.iter().copied());

    FactProject {
        fact_id: project.project_id,
        project_id: project.project_id,
        name: project.name.clone(),
        description: project.description.clone(),
        planned_hours: project.planned_hours.unwrap_or(0.0),
        worked_hours: project.worked_hours.unwrap_or(0.0),
        planned_amount: totals.planned_amount,
        actual_amount: totals.actual_amount,
        profit: totals.profit(),
        tasks_planned: counts.planned,
        tasks_completed: counts.completed,
        tasks_delayed: counts.delayed,
        employees_assigned,
        roi: totals.roi(),
        cycle_time: cycle_time(project.plan_start, project.actual_end),
        plan_start_time_id: project.plan_start.map(time_id),
        plan_end_time_id: project.plan_end.map(time_id),
        actual_start_time_id: project.actual_start.map(time_id),
        actual_end_time_id: project.actual_end.map(time_id),
        state_id: project.state_id,
        type_id: project.type_id,
        client_id: project.client_id,
    }
}

/// Restrict a snapshot to projects in a terminal state.
///
/// Assignments, finances and defects follow their project; tasks follow the
/// task catalogs of the kept projects. Reference entities are kept whole.
pub fn terminal_scope(snapshot: &SourceSnapshot, terminal_states: &[String]) -> SourceSnapshot {
    let terminal_ids: HashSet<i64> = snapshot
        .states
        .iter()
        .filter(|s| {
            s.state_name
                .as_deref()
                .is_some_and(|name| terminal_states.iter().any(|t| t == name))
        })
        .map(|s| s.state_id)
        .collect();

    let projects: Vec<Project> = snapshot
        .projects
        .iter()
        .filter(|p| p.state_id.is_some_and(|id| terminal_ids.contains(&id)))
        .cloned()
        .collect();
    let project_ids: HashSet<i64> = projects.iter().map(|p| p.project_id).collect();
    let catalog_ids: HashSet<i64> = projects.iter().filter_map(|p| p.catalog_id).collect();
    let in_scope = |id: Option<i64>| id.is_some_and(|id| project_ids.contains(&id));

    SourceSnapshot {
        tasks: snapshot
            .tasks
            .iter()
            .filter(|t| t.catalog_id.is_some_and(|id| catalog_ids.contains(&id)))
            .cloned()
            .collect(),
        project_employees: snapshot
            .project_employees
            .iter()
            .filter(|a| project_ids.contains(&a.project_id))
            .cloned()
            .collect(),
        finances: snapshot
            .finances
            .iter()
            .filter(|f| in_scope(f.project_id))
            .cloned()
            .collect(),
        defects: snapshot
            .defects
            .iter()
            .filter(|d| in_scope(d.project_id))
            .cloned()
            .collect(),
        projects,
        states: snapshot.states.clone(),
        types: snapshot.types.clone(),
        clients: snapshot.clients.clone(),
        defect_types: snapshot.defect_types.clone(),
        phases: snapshot.phases.clone(),
        missing: snapshot.missing.clone(),
    }
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
