//! Tabular datasets exchanged between the database layer and the pipeline.
//!
//! A [`Table`] is a header plus rows of dynamically typed [`SqlValue`]s.
//! Backends materialize query results into tables; the ETL layer decodes
//! them into typed records and encodes dimension/fact records back into
//! tables for loading.

use crate::error::{CoreError, CoreResult};
use chrono::{NaiveDate, NaiveDateTime};

/// Formats accepted for date-only text values.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Formats accepted for timestamp text values (the time part is discarded).
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl SqlValue {
    /// True for `NULL` and for not-a-number floats.
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Null => true,
            SqlValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Read the value as an integer.
    ///
    /// Floats are accepted only when they carry no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(i) => Some(*i),
            SqlValue::Bool(b) => Some(i64::from(*b)),
            SqlValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read the value as a float. `NaN` reads as `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Int(i) => Some(*i as f64),
            SqlValue::Float(f) if !f.is_nan() => Some(*f),
            SqlValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            SqlValue::Text(s) => s.trim().parse().ok().filter(|f: &f64| !f.is_nan()),
            _ => None,
        }
    }

    /// Read the value as a boolean flag (`1`, `true`, `t`, `yes` are true).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(b) => Some(*b),
            SqlValue::Int(i) => Some(*i != 0),
            SqlValue::Float(f) if !f.is_nan() => Some(*f != 0.0),
            SqlValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "t" | "yes" | "y" => Some(true),
                "0" | "false" | "f" | "no" | "n" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Borrow the value as text; only `Text` values qualify.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read the value as a calendar date.
    ///
    /// Text is parsed leniently; anything unparseable reads as `None`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            SqlValue::Date(d) => Some(*d),
            SqlValue::DateTime(dt) => Some(dt.date()),
            SqlValue::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// Render the value as owned text, or `None` for nulls.
    pub fn to_text(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Float(f) if f.is_nan() => None,
            SqlValue::Bool(b) => Some(b.to_string()),
            SqlValue::Int(i) => Some(i.to_string()),
            SqlValue::Float(f) => Some(f.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            SqlValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// Parse a date from common textual encodings.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(d);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.date());
    }
    // Timestamps with zone suffixes: keep the leading date when clearly delimited.
    match (s.get(..10), s.as_bytes().get(10)) {
        (Some(head), Some(b'T' | b' ')) => NaiveDate::parse_from_str(head, "%Y-%m-%d").ok(),
        _ => None,
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(i64::from(v))
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        SqlValue::Int(i64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// A record type that can be written as one table row.
pub trait Record {
    /// Column names, in the order produced by [`Record::to_row`].
    const COLUMNS: &'static [&'static str];

    /// Encode the record as one row of values.
    fn to_row(&self) -> Vec<SqlValue>;
}

/// A named tabular dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table from a header and rows, checking every row's width.
    pub fn with_rows(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<SqlValue>>,
    ) -> CoreResult<Self> {
        let mut table = Self::new(name, columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Encode a slice of records as a table.
    pub fn from_records<R: Record>(name: impl Into<String>, records: &[R]) -> Self {
        Self {
            name: name.into(),
            columns: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: records.iter().map(Record::to_row).collect(),
        }
    }

    /// Append a row; its width must match the header.
    pub fn push_row(&mut self, row: Vec<SqlValue>) -> CoreResult<()> {
        if row.len() != self.columns.len() {
            return Err(CoreError::RowWidthMismatch {
                table: self.name.clone(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Iterate rows with by-name access.
    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |values| RowRef {
            table: self,
            values,
        })
    }
}

/// Borrowed view of one row with column lookup by name.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    values: &'a [SqlValue],
}

impl<'a> RowRef<'a> {
    /// Value of the named column, or `None` when the table has no such column.
    pub fn get(&self, column: &str) -> Option<&'a SqlValue> {
        self.table
            .column_index(column)
            .and_then(|idx| self.values.get(idx))
    }
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
