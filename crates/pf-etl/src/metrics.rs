//! Per-project KPIs derived during transformation.
//!
//! Every function here is total: missing or unparseable inputs produce a
//! zero or a "not delayed" answer, never an error.

use chrono::NaiveDate;

use crate::entities::{Finance, Task};

/// Task counters of one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub planned: i64,
    pub completed: i64,
    pub delayed: i64,
}

/// Whether a task missed its window.
///
/// A finished task is late when it was completed after its due date. An
/// unfinished task is late when its due date falls on or before the day the
/// project actually closed.
pub fn is_delayed(task: &Task, project_actual_end: Option<NaiveDate>) -> bool {
    if task.completed {
        matches!(
            (task.due_date, task.completed_date),
            (Some(due), Some(done)) if done > due
        )
    } else {
        matches!(
            (task.due_date, project_actual_end),
            (Some(due), Some(end)) if due <= end
        )
    }
}

/// Count planned, completed and delayed tasks of one project.
pub fn task_counts<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    project_actual_end: Option<NaiveDate>,
) -> TaskCounts {
    tasks
        .into_iter()
        .fold(TaskCounts::default(), |mut counts, task| {
            counts.planned += 1;
            if task.completed {
                counts.completed += 1;
            }
            if is_delayed(task, project_actual_end) {
                counts.delayed += 1;
            }
            counts
        })
}

/// Summed money columns of a project's finance rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinanceTotals {
    pub planned_amount: f64,
    pub actual_amount: f64,
    pub revenue: f64,
}

impl FinanceTotals {
    /// Sum finance rows column by column; nulls count as 0.
    pub fn sum<'a>(rows: impl IntoIterator<Item = &'a Finance>) -> Self {
        rows.into_iter().fold(Self::default(), |totals, f| Self {
            planned_amount: totals.planned_amount + f.planned_amount.unwrap_or(0.0),
            actual_amount: totals.actual_amount + f.actual_amount.unwrap_or(0.0),
            revenue: totals.revenue + f.revenue.unwrap_or(0.0),
        })
    }

    pub fn profit(&self) -> f64 {
        self.revenue - self.actual_amount
    }

    pub fn roi(&self) -> f64 {
        roi(self.profit(), self.actual_amount)
    }
}

/// Return on investment in percent; 0 when the actual cost is not positive.
pub fn roi(profit: f64, actual_amount: f64) -> f64 {
    if actual_amount > 0.0 {
        profit / actual_amount * 100.0
    } else {
        0.0
    }
}

/// Days from planned start to actual end.
///
/// 0 when either date is missing or the span is negative.
pub fn cycle_time(plan_start: Option<NaiveDate>, actual_end: Option<NaiveDate>) -> f64 {
    match (plan_start, actual_end) {
        (Some(start), Some(end)) => {
            let days = (end - start).num_days();
            if days >= 0 {
                days as f64
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod tests;
