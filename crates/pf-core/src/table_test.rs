use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_nan_is_null() {
    assert!(SqlValue::Float(f64::NAN).is_null());
    assert!(SqlValue::Null.is_null());
    assert!(!SqlValue::Float(0.0).is_null());
    assert_eq!(SqlValue::Float(f64::NAN).as_f64(), None);
}

#[test]
fn test_as_i64_rejects_fractional_floats() {
    assert_eq!(SqlValue::Float(3.0).as_i64(), Some(3));
    assert_eq!(SqlValue::Float(3.5).as_i64(), None);
    assert_eq!(SqlValue::Text(" 42 ".into()).as_i64(), Some(42));
}

#[test]
fn test_as_bool_variants() {
    assert_eq!(SqlValue::Int(1).as_bool(), Some(true));
    assert_eq!(SqlValue::Int(0).as_bool(), Some(false));
    assert_eq!(SqlValue::Text("TRUE".into()).as_bool(), Some(true));
    assert_eq!(SqlValue::Text("maybe".into()).as_bool(), None);
}

#[test]
fn test_parse_date_formats() {
    assert_eq!(parse_date("2024-03-15"), Some(date(2024, 3, 15)));
    assert_eq!(parse_date("2024/03/15"), Some(date(2024, 3, 15)));
    assert_eq!(parse_date("2024-03-15 10:20:30"), Some(date(2024, 3, 15)));
    assert_eq!(parse_date("2024-03-15T10:20:30.123"), Some(date(2024, 3, 15)));
    assert_eq!(parse_date("2024-03-15T10:20:30+02:00"), Some(date(2024, 3, 15)));
}

#[test]
fn test_parse_date_rejects_garbage() {
    assert_eq!(parse_date(""), None);
    assert_eq!(parse_date("not a date"), None);
    assert_eq!(parse_date("2024-13-40"), None);
    assert_eq!(SqlValue::Int(20240315).as_date(), None);
}

#[test]
fn test_datetime_reads_as_date() {
    let dt = date(2023, 12, 31).and_hms_opt(23, 59, 0).unwrap();
    assert_eq!(SqlValue::DateTime(dt).as_date(), Some(date(2023, 12, 31)));
}

#[test]
fn test_option_conversion() {
    assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
    assert_eq!(SqlValue::from(Some(7_i64)), SqlValue::Int(7));
}

#[test]
fn test_push_row_checks_width() {
    let mut table = Table::new("t", vec!["a".into(), "b".into()]);
    table.push_row(vec![1_i64.into(), 2_i64.into()]).unwrap();
    let err = table.push_row(vec![1_i64.into()]).unwrap_err();
    assert!(err.to_string().contains("[C004]"));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_row_lookup_is_case_insensitive() {
    let table = Table::with_rows(
        "projects",
        vec!["Project_Id".into(), "name".into()],
        vec![vec![SqlValue::Int(1), SqlValue::Text("Alpha".into())]],
    )
    .unwrap();
    let row = table.iter().next().unwrap();
    assert_eq!(row.get("project_id"), Some(&SqlValue::Int(1)));
    assert_eq!(row.get("NAME").and_then(SqlValue::as_str), Some("Alpha"));
    assert!(row.get("missing").is_none());
}

struct Pair {
    id: i64,
    label: Option<String>,
}

impl Record for Pair {
    const COLUMNS: &'static [&'static str] = &["id", "label"];

    fn to_row(&self) -> Vec<SqlValue> {
        vec![self.id.into(), self.label.clone().into()]
    }
}

#[test]
fn test_from_records() {
    let table = Table::from_records(
        "pairs",
        &[
            Pair {
                id: 1,
                label: Some("x".into()),
            },
            Pair { id: 2, label: None },
        ],
    );
    assert_eq!(table.name(), "pairs");
    assert_eq!(table.columns(), &["id".to_string(), "label".to_string()]);
    assert_eq!(table.rows()[1], vec![SqlValue::Int(2), SqlValue::Null]);
}
