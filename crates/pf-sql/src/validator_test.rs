use super::*;
use crate::dialect::DuckDbDialect;

fn full_extraction_set() -> String {
    Entity::ALL
        .iter()
        .map(|e| format!("-- {}\nSELECT 1 AS id FROM t;\n", e.query_name()))
        .collect()
}

#[test]
fn test_complete_extraction_set_is_clean() {
    let queries = QuerySet::parse(&full_extraction_set());
    assert!(validate_extraction(&queries, &DuckDbDialect::new()).is_empty());
}

#[test]
fn test_missing_extraction_query_reported() {
    let text = full_extraction_set().replace("-- extract_phases", "-- extract_phase_typo");
    let queries = QuerySet::parse(&text);
    let issues = validate_extraction(&queries, &DuckDbDialect::new());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].query, "extract_phases");
    assert_eq!(issues[0].problem, "query is missing");
}

#[test]
fn test_non_select_extraction_reported() {
    let text = full_extraction_set().replace(
        "-- extract_states\nSELECT 1 AS id FROM t;",
        "-- extract_states\nDELETE FROM estado;",
    );
    let queries = QuerySet::parse(&text);
    let issues = validate_extraction(&queries, &DuckDbDialect::new());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].query, "extract_states");
    assert!(issues[0].problem.contains("SELECT"));
}

#[test]
fn test_unparseable_extraction_reported() {
    let text = full_extraction_set().replace(
        "-- extract_clients\nSELECT 1 AS id FROM t;",
        "-- extract_clients\nSELECT FROM WHERE;",
    );
    let queries = QuerySet::parse(&text);
    let issues = validate_extraction(&queries, &DuckDbDialect::new());
    assert_eq!(issues.len(), 1);
    assert!(issues[0].problem.contains("[S004]"));
}

#[test]
fn test_load_template_clean() {
    let queries = QuerySet::parse(
        "-- load_dim_year\nINSERT IGNORE INTO dim_year (year_id, year) VALUES (%s, %s)\n",
    );
    assert!(validate_load(&queries, &[("load_dim_year", 2)]).is_empty());
}

#[test]
fn test_load_placeholder_mismatch() {
    let queries = QuerySet::parse(
        "-- load_dim_year\nINSERT IGNORE INTO dim_year (year_id, year) VALUES (%s)\n",
    );
    let issues = validate_load(&queries, &[("load_dim_year", 2)]);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].problem, "expected 2 placeholders, found 1");
}

#[test]
fn test_load_missing_and_wrong_kind() {
    let queries = QuerySet::parse("-- load_dim_month\nSELECT %s, %s\n");
    let issues = validate_load(&queries, &[("load_dim_year", 2), ("load_dim_month", 2)]);
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].to_string(), "load_dim_year: template is missing");
    assert_eq!(issues[1].problem, "expected an INSERT statement");
}
