use super::*;

#[test]
fn test_parse_two_blocks() {
    let text = "\
-- extract_states
SELECT estado_id AS state_id
FROM estado;

-- extract_types
SELECT * FROM tipo_proyecto;
";
    let queries = QuerySet::parse(text);
    assert_eq!(queries.len(), 2);
    assert_eq!(
        queries.get("extract_states"),
        Some("SELECT estado_id AS state_id\nFROM estado;")
    );
    assert_eq!(queries.get("extract_types"), Some("SELECT * FROM tipo_proyecto;"));
}

#[test]
fn test_marker_name_is_trimmed_and_indent_allowed() {
    let queries = QuerySet::parse("   --   load_dim_year   \nINSERT INTO x VALUES (%s)\n");
    assert_eq!(queries.get("load_dim_year"), Some("INSERT INTO x VALUES (%s)"));
}

#[test]
fn test_body_indentation_is_preserved_inside() {
    let queries = QuerySet::parse("-- q\nSELECT a\n    , b\nFROM t\n");
    assert_eq!(queries.get("q"), Some("SELECT a\n    , b\nFROM t"));
}

#[test]
fn test_preamble_is_discarded() {
    let queries = QuerySet::parse("SET NAMES utf8;\n-- q\nSELECT 1\n");
    assert_eq!(queries.len(), 1);
    assert_eq!(queries.get("q"), Some("SELECT 1"));
}

#[test]
fn test_empty_block_and_last_block_without_newline() {
    let queries = QuerySet::parse("-- empty\n-- last\nSELECT 2");
    assert_eq!(queries.get("empty"), Some(""));
    assert_eq!(queries.get("last"), Some("SELECT 2"));
}

#[test]
fn test_comment_inside_body_starts_new_block() {
    let queries = QuerySet::parse("-- q\nSELECT 1\n-- note\nFROM t\n");
    assert_eq!(queries.get("q"), Some("SELECT 1"));
    assert_eq!(queries.get("note"), Some("FROM t"));
}

#[test]
fn test_duplicate_name_keeps_last() {
    let queries = QuerySet::parse("-- q\nSELECT 1\n-- q\nSELECT 2\n");
    assert_eq!(queries.len(), 1);
    assert_eq!(queries.get("q"), Some("SELECT 2"));
}

#[test]
fn test_require_missing() {
    let queries = QuerySet::parse("-- q\nSELECT 1\n");
    assert!(queries.require("q").is_ok());
    let err = queries.require("other").unwrap_err();
    assert!(err.to_string().contains("[S003]"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = QuerySet::load(&dir.path().join("nope.sql")).unwrap_err();
    assert!(matches!(err, SqlError::ResourceNotFound { .. }));
}

#[test]
fn test_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queries.sql");
    std::fs::write(&path, "-- a\nSELECT 1;\r\n-- b\r\nSELECT 2;\r\n").unwrap();
    let queries = QuerySet::load(&path).unwrap();
    assert_eq!(queries.names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(queries.get("a"), Some("SELECT 1;"));
}
