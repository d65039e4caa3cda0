//! Dimension and fact rows of the reporting star schema.
//!
//! Field order of every record matches the column order of its target table.

use chrono::NaiveDate;
use pf_core::{Record, SqlValue, Table};
use serde::Serialize;

pub const DIM_YEAR: &str = "dim_year";
pub const DIM_MONTH: &str = "dim_month";
pub const DIM_DAY: &str = "dim_day";
pub const DIM_TIME: &str = "dim_time";
pub const DIM_STATE: &str = "dim_state";
pub const DIM_PROJECT_TYPE: &str = "dim_project_type";
pub const DIM_CLIENT: &str = "dim_client";
pub const DIM_DEFECT_TYPE: &str = "dim_defect_type";
pub const DIM_PHASE: &str = "dim_phase";
pub const FACT_PROJECT: &str = "fact_project";
pub const FACT_DEFECT: &str = "fact_defect";

/// Target tables in load order: parents before the tables referencing them.
pub const LOAD_ORDER: [&str; 11] = [
    DIM_YEAR,
    DIM_MONTH,
    DIM_DAY,
    DIM_TIME,
    DIM_STATE,
    DIM_PROJECT_TYPE,
    DIM_CLIENT,
    DIM_DEFECT_TYPE,
    DIM_PHASE,
    FACT_PROJECT,
    FACT_DEFECT,
];

/// Name of the load template for a target table.
pub fn load_template_name(table: &str) -> String {
    format!("load_{table}")
}

/// Column count of a target table, for template checks.
pub fn column_count(table: &str) -> Option<usize> {
    let count = match table {
        DIM_YEAR => DimYear::COLUMNS.len(),
        DIM_MONTH => DimMonth::COLUMNS.len(),
        DIM_DAY => DimDay::COLUMNS.len(),
        DIM_TIME => DimTime::COLUMNS.len(),
        DIM_STATE => DimState::COLUMNS.len(),
        DIM_PROJECT_TYPE => DimProjectType::COLUMNS.len(),
        DIM_CLIENT => DimClient::COLUMNS.len(),
        DIM_DEFECT_TYPE => DimDefectType::COLUMNS.len(),
        DIM_PHASE => DimPhase::COLUMNS.len(),
        FACT_PROJECT => FactProject::COLUMNS.len(),
        FACT_DEFECT => FactDefect::COLUMNS.len(),
        _ => return None,
    };
    Some(count)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimYear {
    pub year_id: i64,
    pub year: i32,
}

impl Record for DimYear {
    const COLUMNS: &'static [&'static str] = &["year_id", "year"];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![self.year_id.into(), self.year.into()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimMonth {
    pub month_id: i64,
    pub month_name: String,
    pub month_number: u32,
    pub quarter: u32,
    pub year_id: i64,
}

impl Record for DimMonth {
    const COLUMNS: &'static [&'static str] =
        &["month_id", "month_name", "month_number", "quarter", "year_id"];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![
            self.month_id.into(),
            self.month_name.as_str().into(),
            self.month_number.into(),
            self.quarter.into(),
            self.year_id.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimDay {
    pub day_id: i64,
    pub day_name: String,
    pub day_number: u32,
    pub month_id: i64,
}

impl Record for DimDay {
    const COLUMNS: &'static [&'static str] = &["day_id", "day_name", "day_number", "month_id"];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![
            self.day_id.into(),
            self.day_name.as_str().into(),
            self.day_number.into(),
            self.month_id.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimTime {
    /// `YYYYMMDD` of `date`.
    pub time_id: i64,
    pub date: NaiveDate,
    pub day_id: i64,
}

impl Record for DimTime {
    const COLUMNS: &'static [&'static str] = &["time_id", "date", "day_id"];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![self.time_id.into(), self.date.into(), self.day_id.into()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimState {
    pub state_id: i64,
    pub state_name: Option<String>,
}

impl Record for DimState {
    const COLUMNS: &'static [&'static str] = &["state_id", "state_name"];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![self.state_id.into(), self.state_name.clone().into()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimProjectType {
    pub type_id: i64,
    pub name: Option<String>,
}

impl Record for DimProjectType {
    const COLUMNS: &'static [&'static str] = &["type_id", "name"];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![self.type_id.into(), self.name.clone().into()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimClient {
    pub client_id: i64,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub country: Option<String>,
}

impl Record for DimClient {
    const COLUMNS: &'static [&'static str] = &["client_id", "name", "sector", "country"];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![
            self.client_id.into(),
            self.name.clone().into(),
            self.sector.clone().into(),
            self.country.clone().into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimDefectType {
    pub defect_type_id: i64,
    pub name: Option<String>,
}

impl Record for DimDefectType {
    const COLUMNS: &'static [&'static str] = &["defect_type_id", "name"];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![self.defect_type_id.into(), self.name.clone().into()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimPhase {
    pub phase_id: i64,
    pub phase_name: Option<String>,
}

impl Record for DimPhase {
    const COLUMNS: &'static [&'static str] = &["phase_id", "phase_name"];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![self.phase_id.into(), self.phase_name.clone().into()]
    }
}

/// One row per source project.
#[derive(Debug, Clone, PartialEq)]
pub struct FactProject {
    pub fact_id: i64,
    pub project_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub planned_hours: f64,
    pub worked_hours: f64,
    pub planned_amount: f64,
    pub actual_amount: f64,
    pub profit: f64,
    pub tasks_planned: i64,
    pub tasks_completed: i64,
    pub tasks_delayed: i64,
    pub employees_assigned: i64,
    pub roi: f64,
    /// Days from planned start to actual end.
    pub cycle_time: f64,
    pub plan_start_time_id: Option<i64>,
    pub plan_end_time_id: Option<i64>,
    pub actual_start_time_id: Option<i64>,
    pub actual_end_time_id: Option<i64>,
    pub state_id: Option<i64>,
    pub type_id: Option<i64>,
    pub client_id: Option<i64>,
}

impl Record for FactProject {
    const COLUMNS: &'static [&'static str] = &[
        "fact_id",
        "project_id",
        "name",
        "description",
        "planned_hours",
        "worked_hours",
        "planned_amount",
        "actual_amount",
        "profit",
        "tasks_planned",
        "tasks_completed",
        "tasks_delayed",
        "employees_assigned",
        "roi",
        "cycle_time",
        "plan_start_time_id",
        "plan_end_time_id",
        "actual_start_time_id",
        "actual_end_time_id",
        "state_id",
        "type_id",
        "client_id",
    ];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![
            self.fact_id.into(),
            self.project_id.into(),
            self.name.clone().into(),
            self.description.clone().into(),
            self.planned_hours.into(),
            self.worked_hours.into(),
            self.planned_amount.into(),
            self.actual_amount.into(),
            self.profit.into(),
            self.tasks_planned.into(),
            self.tasks_completed.into(),
            self.tasks_delayed.into(),
            self.employees_assigned.into(),
            self.roi.into(),
            self.cycle_time.into(),
            self.plan_start_time_id.into(),
            self.plan_end_time_id.into(),
            self.actual_start_time_id.into(),
            self.actual_end_time_id.into(),
            self.state_id.into(),
            self.type_id.into(),
            self.client_id.into(),
        ]
    }
}

/// One row per source defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactDefect {
    pub project_id: Option<i64>,
    pub defect_type_id: Option<i64>,
    pub phase_id: Option<i64>,
    pub severity: Option<String>,
    pub time_id: Option<i64>,
}

impl Record for FactDefect {
    const COLUMNS: &'static [&'static str] =
        &["project_id", "defect_type_id", "phase_id", "severity", "time_id"];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![
            self.project_id.into(),
            self.defect_type_id.into(),
            self.phase_id.into(),
            self.severity.clone().into(),
            self.time_id.into(),
        ]
    }
}

/// Everything the transformer produces for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarSchema {
    pub years: Vec<DimYear>,
    pub months: Vec<DimMonth>,
    pub days: Vec<DimDay>,
    pub times: Vec<DimTime>,
    pub states: Vec<DimState>,
    pub project_types: Vec<DimProjectType>,
    pub clients: Vec<DimClient>,
    pub defect_types: Vec<DimDefectType>,
    pub phases: Vec<DimPhase>,
    pub projects: Vec<FactProject>,
    pub defects: Vec<FactDefect>,
}

/// Row count of one target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: usize,
}

impl StarSchema {
    /// True when there is no project fact to load.
    pub fn has_no_projects(&self) -> bool {
        self.projects.is_empty()
    }

    /// Encode every table, in load order.
    pub fn tables(&self) -> Vec<Table> {
        vec![
            Table::from_records(DIM_YEAR, &self.years),
            Table::from_records(DIM_MONTH, &self.months),
            Table::from_records(DIM_DAY, &self.days),
            Table::from_records(DIM_TIME, &self.times),
            Table::from_records(DIM_STATE, &self.states),
            Table::from_records(DIM_PROJECT_TYPE, &self.project_types),
            Table::from_records(DIM_CLIENT, &self.clients),
            Table::from_records(DIM_DEFECT_TYPE, &self.defect_types),
            Table::from_records(DIM_PHASE, &self.phases),
            Table::from_records(FACT_PROJECT, &self.projects),
            Table::from_records(FACT_DEFECT, &self.defects),
        ]
    }

    /// Row count per table, in load order.
    pub fn counts(&self) -> Vec<TableCount> {
        let rows = [
            self.years.len(),
            self.months.len(),
            self.days.len(),
            self.times.len(),
            self.states.len(),
            self.project_types.len(),
            self.clients.len(),
            self.defect_types.len(),
            self.phases.len(),
            self.projects.len(),
            self.defects.len(),
        ];
        LOAD_ORDER
            .iter()
            .zip(rows)
            .map(|(&table, rows)| TableCount { table, rows })
            .collect()
    }
}

#[cfg(test)]
#[path = "star_test.rs"]
mod tests;
