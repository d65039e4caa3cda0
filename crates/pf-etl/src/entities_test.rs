use super::*;

fn table(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Table {
    Table::with_rows(
        "t",
        columns.iter().map(|c| c.to_string()).collect(),
        rows,
    )
    .unwrap()
}

#[test]
fn test_decode_project_by_column_name() {
    let t = table(
        &["name", "project_id", "plan_start", "actual_end", "planned_hours", "catalog_id"],
        vec![vec![
            SqlValue::Text("Portal".into()),
            SqlValue::Int(1),
            SqlValue::Text("2024-01-10".into()),
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
            SqlValue::Int(120),
            SqlValue::Int(1),
        ]],
    );
    let projects: Vec<Project> = decode_all(&t).unwrap();
    assert_eq!(projects.len(), 1);
    let p = &projects[0];
    assert_eq!(p.project_id, 1);
    assert_eq!(p.name.as_deref(), Some("Portal"));
    assert_eq!(p.plan_start, NaiveDate::from_ymd_opt(2024, 1, 10));
    assert_eq!(p.actual_end, NaiveDate::from_ymd_opt(2024, 3, 15));
    assert_eq!(p.planned_hours, Some(120.0));
    assert_eq!(p.catalog_id, Some(1));
    // Columns not selected read as None.
    assert_eq!(p.description, None);
    assert_eq!(p.state_id, None);
}

#[test]
fn test_unparseable_date_reads_as_none() {
    let t = table(
        &["task_id", "due_date", "completed"],
        vec![vec![
            SqlValue::Int(5),
            SqlValue::Text("not a date".into()),
            SqlValue::Int(1),
        ]],
    );
    let tasks: Vec<Task> = decode_all(&t).unwrap();
    assert_eq!(tasks[0].due_date, None);
    assert!(tasks[0].completed);
}

#[test]
fn test_missing_key_column_is_an_error() {
    let t = table(&["state_name"], vec![vec![SqlValue::Text("Completado".into())]]);
    let err = decode_all::<State>(&t).unwrap_err();
    assert!(err.to_string().contains("[T004]"));
    assert!(err.to_string().contains("missing column 'state_id'"));
}

#[test]
fn test_null_key_reports_row_index() {
    let t = table(
        &["defect_id"],
        vec![vec![SqlValue::Int(1)], vec![SqlValue::Null]],
    );
    match decode_all::<Defect>(&t) {
        Err(EtlError::Decode { entity, row, .. }) => {
            assert_eq!(entity, Entity::Defects);
            assert_eq!(row, 1);
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn test_float_key_with_integral_value_is_accepted() {
    let t = table(&["finance_id", "revenue"], vec![vec![SqlValue::Float(3.0), SqlValue::Float(f64::NAN)]]);
    let finances: Vec<Finance> = decode_all(&t).unwrap();
    assert_eq!(finances[0].finance_id, 3);
    assert_eq!(finances[0].revenue, None);
}

#[test]
fn test_defect_type_display_name() {
    let dt = DefectType {
        defect_type_id: 1,
        category: Some("Funcional".into()),
        subtype: Some("Lógica".into()),
    };
    assert_eq!(dt.display_name().as_deref(), Some("Funcional - Lógica"));

    let partial = DefectType {
        subtype: None,
        ..dt
    };
    assert_eq!(partial.display_name(), None);
}
