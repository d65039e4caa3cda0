use super::*;
use crate::star::{DimState, DimYear, FactDefect, DIM_STATE, DIM_YEAR, FACT_DEFECT};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use pf_core::DbType;
use pf_db::{Database, DbResult, DuckDbBackend};
use pf_sql::SqlDialect;
use std::sync::Mutex;

const WAREHOUSE_DDL: &str = include_str!("../tests/fixtures/warehouse.sql");
const LOAD_QUERIES: &str = include_str!("../../../sql/load_queries.sql");

async fn warehouse() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(WAREHOUSE_DDL).await.unwrap();
    db
}

async fn count(db: &DuckDbBackend, table: &str) -> i64 {
    let result = db
        .query(&format!("SELECT COUNT(*) AS n FROM {table}"))
        .await
        .unwrap();
    result.rows()[0][0].as_i64().unwrap()
}

fn schema() -> StarSchema {
    StarSchema {
        years: vec![
            DimYear {
                year_id: 1,
                year: 2023,
            },
            DimYear {
                year_id: 2,
                year: 2024,
            },
        ],
        states: vec![
            DimState {
                state_id: 1,
                state_name: Some("En curso".into()),
            },
            DimState {
                state_id: 2,
                state_name: None,
            },
        ],
        defects: vec![FactDefect {
            project_id: Some(1),
            defect_type_id: None,
            phase_id: None,
            severity: Some("Media".into()),
            time_id: None,
        }],
        ..StarSchema::default()
    }
}

#[test]
fn test_normalize_values() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let stamp = NaiveDateTime::parse_from_str("2024-03-15 10:30:00", "%Y-%m-%d %H:%M:%S").unwrap();

    assert_eq!(normalize(&SqlValue::Date(date)), SqlValue::Text("2024-03-15".into()));
    assert_eq!(normalize(&SqlValue::DateTime(stamp)), SqlValue::Text("2024-03-15".into()));
    assert_eq!(normalize(&SqlValue::Float(f64::NAN)), SqlValue::Null);
    assert_eq!(normalize(&SqlValue::Float(1.5)), SqlValue::Float(1.5));
    assert_eq!(normalize(&SqlValue::Int(7)), SqlValue::Int(7));
}

#[tokio::test]
async fn test_load_reports_every_table_in_order() {
    let db = warehouse().await;
    let queries = QuerySet::parse(LOAD_QUERIES);
    let loader = Loader::new(&db, &queries, LoadStrategy::Clean);

    let report = loader.load(&schema()).await;
    let names: Vec<&str> = report.tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(names, LOAD_ORDER);
    assert!(report.is_success());
    assert_eq!(report.rows_inserted(), 5);
    assert_eq!(report.table(DIM_YEAR).unwrap().rows_inserted, 2);
    assert_eq!(report.table(FACT_DEFECT).unwrap().rows_attempted, 1);

    assert_eq!(count(&db, DIM_YEAR).await, 2);
    assert_eq!(count(&db, DIM_STATE).await, 2);
    assert_eq!(count(&db, FACT_DEFECT).await, 1);
}

#[tokio::test]
async fn test_incremental_load_ignores_duplicate_dimensions() {
    let db = warehouse().await;
    let queries = QuerySet::parse(LOAD_QUERIES);
    let loader = Loader::new(&db, &queries, LoadStrategy::Incremental);
    let schema = StarSchema {
        defects: Vec::new(),
        ..schema()
    };

    let first = loader.load(&schema).await;
    assert!(first.is_success());
    let second = loader.load(&schema).await;
    assert!(second.is_success(), "{:?}", second.failed().collect::<Vec<_>>());
    assert_eq!(second.table(DIM_YEAR).unwrap().rows_inserted, 0);
    assert_eq!(second.table(DIM_STATE).unwrap().rows_attempted, 2);

    assert_eq!(count(&db, DIM_YEAR).await, 2);
    assert_eq!(count(&db, DIM_STATE).await, 2);
}

#[tokio::test]
async fn test_clean_load_replaces_previous_rows() {
    let db = warehouse().await;
    db.execute_batch("INSERT INTO dim_year VALUES (99, 1999); INSERT INTO fact_defect VALUES (5, 5, 5, 'Alta', NULL);")
        .await
        .unwrap();
    let queries = QuerySet::parse(LOAD_QUERIES);

    let report = Loader::new(&db, &queries, LoadStrategy::Clean)
        .load(&schema())
        .await;
    assert!(report.is_success());
    assert_eq!(count(&db, DIM_YEAR).await, 2);
    assert_eq!(count(&db, FACT_DEFECT).await, 1);
}

#[tokio::test]
async fn test_missing_template_is_reported_not_fatal() {
    let db = warehouse().await;
    let queries = QuerySet::parse(
        "-- load_dim_year\nINSERT IGNORE INTO dim_year (year_id, year) VALUES (%s, %s);\n",
    );
    let report = Loader::new(&db, &queries, LoadStrategy::Incremental)
        .load(&schema())
        .await;

    assert!(report.table(DIM_YEAR).unwrap().is_ok());
    let state = report.table(DIM_STATE).unwrap();
    assert_eq!(state.rows_inserted, 0);
    assert!(state.error.as_deref().unwrap().contains("load_dim_state"));
    assert_eq!(count(&db, DIM_YEAR).await, 2);
    assert_eq!(count(&db, DIM_STATE).await, 0);
}

#[tokio::test]
async fn test_failed_table_rolls_back_and_next_table_loads() {
    let db = warehouse().await;
    // The second row violates the primary key of a plain INSERT.
    let years = Table::from_records(
        DIM_YEAR,
        &[
            DimYear {
                year_id: 1,
                year: 2023,
            },
            DimYear {
                year_id: 1,
                year: 2024,
            },
        ],
    );
    let queries = QuerySet::default();
    let loader = Loader::new(&db, &queries, LoadStrategy::Incremental);

    let result = loader
        .load_table(&years, "INSERT INTO dim_year (year_id, year) VALUES (%s, %s)")
        .await;
    assert!(!result.is_ok());
    assert_eq!(result.rows_attempted, 2);
    assert_eq!(result.rows_inserted, 0);
    assert_eq!(count(&db, DIM_YEAR).await, 0);

    let states = Table::from_records(DIM_STATE, &schema().states);
    let result = loader
        .load_table(&states, "INSERT IGNORE INTO dim_state (state_id, state_name) VALUES (%s, %s)")
        .await;
    assert!(result.is_ok());
    assert_eq!(count(&db, DIM_STATE).await, 2);
}

#[tokio::test]
async fn test_empty_table_is_a_no_op() {
    let db = warehouse().await;
    let none: Vec<DimYear> = Vec::new();
    let empty = Table::from_records(DIM_YEAR, &none);
    let result = Loader::new(&db, &QuerySet::default(), LoadStrategy::Clean)
        .load_table(&empty, "INSERT INTO missing_table VALUES (%s)")
        .await;
    assert!(result.is_ok());
    assert_eq!(result.rows_attempted, 0);
}

#[tokio::test]
async fn test_dates_load_into_date_columns() {
    let db = warehouse().await;
    let queries = QuerySet::parse(LOAD_QUERIES);
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let schema = StarSchema {
        times: vec![crate::star::DimTime {
            time_id: 20240315,
            date,
            day_id: 1,
        }],
        ..StarSchema::default()
    };

    let report = Loader::new(&db, &queries, LoadStrategy::Incremental)
        .load(&schema)
        .await;
    assert!(report.is_success());
    let rows = db.query("SELECT date FROM dim_time").await.unwrap();
    assert_eq!(rows.rows()[0][0].as_date(), Some(date));
}

/// DuckDB wrapper recording how many statements each write call carried.
struct BatchLog {
    inner: DuckDbBackend,
    single: Mutex<usize>,
    batches: Mutex<Vec<usize>>,
}

#[async_trait]
impl Database for BatchLog {
    async fn query(&self, sql: &str) -> DbResult<Table> {
        self.inner.query(sql).await
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        *self.single.lock().unwrap() += 1;
        self.inner.execute(sql, params).await
    }

    async fn execute_many(&self, sql: &str, rows: &[Vec<SqlValue>]) -> DbResult<usize> {
        self.batches.lock().unwrap().push(rows.len());
        self.inner.execute_many(sql, rows).await
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.inner.execute_batch(sql).await
    }

    async fn begin(&self) -> DbResult<()> {
        self.inner.begin().await
    }

    async fn commit(&self) -> DbResult<()> {
        self.inner.commit().await
    }

    async fn rollback(&self) -> DbResult<()> {
        self.inner.rollback().await
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.inner.relation_exists(name).await
    }

    fn dialect(&self) -> &dyn SqlDialect {
        self.inner.dialect()
    }

    fn db_type(&self) -> DbType {
        DbType::DuckDb
    }
}

#[tokio::test]
async fn test_each_table_is_inserted_as_one_batch() {
    let db = BatchLog {
        inner: warehouse().await,
        single: Mutex::new(0),
        batches: Mutex::new(Vec::new()),
    };
    let queries = QuerySet::parse(LOAD_QUERIES);

    let report = Loader::new(&db, &queries, LoadStrategy::Incremental)
        .load(&schema())
        .await;

    assert!(report.is_success(), "{report:?}");
    assert_eq!(*db.single.lock().unwrap(), 0);
    // dim_year, dim_state and fact_defect; empty tables issue nothing.
    assert_eq!(*db.batches.lock().unwrap(), [2, 2, 1]);
    assert_eq!(count(&db.inner, DIM_YEAR).await, 2);
}
