use super::*;

const TEMPLATE: &str = "INSERT IGNORE INTO dim_year (year_id, year) VALUES (%s, %s)";

#[test]
fn test_duckdb_adapts_verb_and_placeholders() {
    let dialect = DuckDbDialect::new();
    assert_eq!(
        dialect.adapt_template(TEMPLATE),
        "INSERT OR IGNORE INTO dim_year (year_id, year) VALUES (?, ?)"
    );
}

#[test]
fn test_mysql_keeps_verb_and_rewrites_placeholders() {
    let dialect = MySqlDialect::new();
    assert_eq!(
        dialect.adapt_template(TEMPLATE),
        "INSERT IGNORE INTO dim_year (year_id, year) VALUES (?, ?)"
    );
}

#[test]
fn test_verb_match_is_case_insensitive() {
    let dialect = DuckDbDialect::new();
    assert_eq!(
        dialect.adapt_template("insert ignore into t VALUES (%s)"),
        "INSERT OR IGNORE into t VALUES (?)"
    );
}

#[test]
fn test_plain_insert_untouched() {
    let dialect = DuckDbDialect::new();
    assert_eq!(
        dialect.adapt_template("INSERT INTO t (a) VALUES (%s)"),
        "INSERT INTO t (a) VALUES (?)"
    );
}

#[test]
fn test_placeholder_list() {
    let dialect = MySqlDialect::new();
    assert_eq!(dialect.placeholders(3), "?, ?, ?");
    assert_eq!(dialect.placeholders(1), "?");
}

#[test]
fn test_count_placeholders() {
    assert_eq!(count_placeholders(TEMPLATE), 2);
    assert_eq!(count_placeholders("SELECT 1"), 0);
}

#[test]
fn test_clear_table_per_engine() {
    assert_eq!(DuckDbDialect::new().clear_table("dim_year"), "DELETE FROM dim_year");
    assert!(DuckDbDialect::new().foreign_key_guard().is_none());

    let mysql = MySqlDialect::new();
    assert_eq!(mysql.clear_table("dim_year"), "TRUNCATE TABLE dim_year");
    assert_eq!(
        mysql.foreign_key_guard(),
        Some(("SET FOREIGN_KEY_CHECKS = 0", "SET FOREIGN_KEY_CHECKS = 1"))
    );
}

#[test]
fn test_dialect_for() {
    assert_eq!(dialect_for(DbType::DuckDb).name(), "duckdb");
    assert_eq!(dialect_for(DbType::MySql).name(), "mysql");
}

#[test]
fn test_parse_select() {
    let stmts = MySqlDialect::new()
        .parse("SELECT proyecto_id AS project_id FROM proyecto WHERE metadata_extraccion = 0")
        .unwrap();
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_parse_empty() {
    assert!(matches!(
        DuckDbDialect::new().parse("   "),
        Err(SqlError::EmptySql)
    ));
}

#[test]
fn test_parse_error_location() {
    let result = DuckDbDialect::new().parse("SELECT\nFROM users");
    match result {
        Err(SqlError::ParseError { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_location_extraction() {
    assert_eq!(
        parse_location_from_error("Expected: an expression, found: FROM at Line: 2, Column: 1"),
        (2, 1)
    );
    assert_eq!(parse_location_from_error("no location"), (0, 0));
}
