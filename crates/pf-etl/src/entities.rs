//! Typed source records.
//!
//! Extraction queries alias the operational columns to the names used here;
//! decoding is by column name, so column order in a query does not matter.
//! Key columns are required. Everything else is optional and reads as `None`
//! when the column is absent, null or unparseable.

use chrono::NaiveDate;
use pf_core::{Entity, RowRef, SqlValue, Table};

use crate::error::{EtlError, EtlResult};

/// A record decoded from one extracted row.
pub trait SourceRecord: Sized {
    /// Entity this record type belongs to.
    const ENTITY: Entity;

    fn decode(row: &RowCursor<'_>) -> EtlResult<Self>;
}

/// Decode every row of an extracted table.
pub fn decode_all<R: SourceRecord>(table: &Table) -> EtlResult<Vec<R>> {
    table
        .iter()
        .enumerate()
        .map(|(index, row)| {
            R::decode(&RowCursor {
                entity: R::ENTITY,
                index,
                row,
            })
        })
        .collect()
}

/// One row being decoded, with enough context for error messages.
pub struct RowCursor<'a> {
    entity: Entity,
    index: usize,
    row: RowRef<'a>,
}

impl RowCursor<'_> {
    fn value(&self, column: &str) -> Option<&SqlValue> {
        self.row.get(column).filter(|v| !v.is_null())
    }

    fn error(&self, message: String) -> EtlError {
        EtlError::Decode {
            entity: self.entity,
            row: self.index,
            message,
        }
    }

    /// Required integer key.
    pub fn id(&self, column: &str) -> EtlResult<i64> {
        match self.row.get(column) {
            None => Err(self.error(format!("missing column '{column}'"))),
            Some(v) if v.is_null() => Err(self.error(format!("'{column}' is null"))),
            Some(v) => v
                .as_i64()
                .ok_or_else(|| self.error(format!("'{column}' is not an integer: {v:?}"))),
        }
    }

    pub fn int(&self, column: &str) -> Option<i64> {
        self.value(column).and_then(SqlValue::as_i64)
    }

    pub fn float(&self, column: &str) -> Option<f64> {
        self.value(column).and_then(SqlValue::as_f64)
    }

    pub fn text(&self, column: &str) -> Option<String> {
        self.value(column).and_then(SqlValue::to_text)
    }

    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.value(column).and_then(SqlValue::as_date)
    }

    /// Boolean-like flag; absent or unreadable is `false`.
    pub fn flag(&self, column: &str) -> bool {
        self.value(column)
            .and_then(SqlValue::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub project_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub plan_start: Option<NaiveDate>,
    pub plan_end: Option<NaiveDate>,
    pub actual_start: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,
    pub planned_hours: Option<f64>,
    pub worked_hours: Option<f64>,
    pub state_id: Option<i64>,
    pub type_id: Option<i64>,
    pub client_id: Option<i64>,
    /// Task catalog this project's tasks hang from.
    pub catalog_id: Option<i64>,
}

impl SourceRecord for Project {
    const ENTITY: Entity = Entity::Projects;

    fn decode(row: &RowCursor<'_>) -> EtlResult<Self> {
        Ok(Self {
            project_id: row.id("project_id")?,
            name: row.text("name"),
            description: row.text("description"),
            plan_start: row.date("plan_start"),
            plan_end: row.date("plan_end"),
            actual_start: row.date("actual_start"),
            actual_end: row.date("actual_end"),
            planned_hours: row.float("planned_hours"),
            worked_hours: row.float("worked_hours"),
            state_id: row.int("state_id"),
            type_id: row.int("type_id"),
            client_id: row.int("client_id"),
            catalog_id: row.int("catalog_id"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub task_id: i64,
    pub catalog_id: Option<i64>,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
}

impl SourceRecord for Task {
    const ENTITY: Entity = Entity::Tasks;

    fn decode(row: &RowCursor<'_>) -> EtlResult<Self> {
        Ok(Self {
            task_id: row.id("task_id")?,
            catalog_id: row.int("catalog_id"),
            completed: row.flag("completed"),
            due_date: row.date("due_date"),
            completed_date: row.date("completed_date"),
        })
    }
}

/// Assignment of an employee to a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectEmployee {
    pub project_id: i64,
    pub employee_id: Option<i64>,
}

impl SourceRecord for ProjectEmployee {
    const ENTITY: Entity = Entity::ProjectEmployees;

    fn decode(row: &RowCursor<'_>) -> EtlResult<Self> {
        Ok(Self {
            project_id: row.id("project_id")?,
            employee_id: row.int("employee_id"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub state_id: i64,
    pub state_name: Option<String>,
}

impl SourceRecord for State {
    const ENTITY: Entity = Entity::States;

    fn decode(row: &RowCursor<'_>) -> EtlResult<Self> {
        Ok(Self {
            state_id: row.id("state_id")?,
            state_name: row.text("state_name"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectType {
    pub type_id: i64,
    pub name: Option<String>,
}

impl SourceRecord for ProjectType {
    const ENTITY: Entity = Entity::Types;

    fn decode(row: &RowCursor<'_>) -> EtlResult<Self> {
        Ok(Self {
            type_id: row.id("type_id")?,
            name: row.text("name"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finance {
    pub finance_id: i64,
    pub project_id: Option<i64>,
    pub planned_amount: Option<f64>,
    pub actual_amount: Option<f64>,
    pub revenue: Option<f64>,
}

impl SourceRecord for Finance {
    const ENTITY: Entity = Entity::Finances;

    fn decode(row: &RowCursor<'_>) -> EtlResult<Self> {
        Ok(Self {
            finance_id: row.id("finance_id")?,
            project_id: row.int("project_id"),
            planned_amount: row.float("planned_amount"),
            actual_amount: row.float("actual_amount"),
            revenue: row.float("revenue"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub client_id: i64,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub country: Option<String>,
}

impl SourceRecord for Client {
    const ENTITY: Entity = Entity::Clients;

    fn decode(row: &RowCursor<'_>) -> EtlResult<Self> {
        Ok(Self {
            client_id: row.id("client_id")?,
            name: row.text("name"),
            sector: row.text("sector"),
            country: row.text("country"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefectType {
    pub defect_type_id: i64,
    pub category: Option<String>,
    pub subtype: Option<String>,
}

impl DefectType {
    /// Display name, `"<category> - <subtype>"`. Null when either part is null.
    pub fn display_name(&self) -> Option<String> {
        match (&self.category, &self.subtype) {
            (Some(category), Some(subtype)) => Some(format!("{category} - {subtype}")),
            _ => None,
        }
    }
}

impl SourceRecord for DefectType {
    const ENTITY: Entity = Entity::DefectTypes;

    fn decode(row: &RowCursor<'_>) -> EtlResult<Self> {
        Ok(Self {
            defect_type_id: row.id("defect_type_id")?,
            category: row.text("category"),
            subtype: row.text("subtype"),
        })
    }
}

/// Software-lifecycle phase in which a defect was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub phase_id: i64,
    pub phase_name: Option<String>,
}

impl SourceRecord for Phase {
    const ENTITY: Entity = Entity::Phases;

    fn decode(row: &RowCursor<'_>) -> EtlResult<Self> {
        Ok(Self {
            phase_id: row.id("phase_id")?,
            phase_name: row.text("phase_name"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Defect {
    pub defect_id: i64,
    pub project_id: Option<i64>,
    pub defect_type_id: Option<i64>,
    pub phase_id: Option<i64>,
    pub severity: Option<String>,
    pub registered_on: Option<NaiveDate>,
}

impl SourceRecord for Defect {
    const ENTITY: Entity = Entity::Defects;

    fn decode(row: &RowCursor<'_>) -> EtlResult<Self> {
        Ok(Self {
            defect_id: row.id("defect_id")?,
            project_id: row.int("project_id"),
            defect_type_id: row.int("defect_type_id"),
            phase_id: row.int("phase_id"),
            severity: row.text("severity"),
            registered_on: row.date("registered_on"),
        })
    }
}

#[cfg(test)]
#[path = "entities_test.rs"]
mod tests;
