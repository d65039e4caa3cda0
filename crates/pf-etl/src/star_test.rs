use super::*;

#[test]
fn test_tables_follow_load_order() {
    let names: Vec<String> = StarSchema::default()
        .tables()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(names, LOAD_ORDER);
}

#[test]
fn test_column_counts_match_target_schema() {
    assert_eq!(column_count(DIM_YEAR), Some(2));
    assert_eq!(column_count(DIM_MONTH), Some(5));
    assert_eq!(column_count(DIM_DAY), Some(4));
    assert_eq!(column_count(DIM_TIME), Some(3));
    assert_eq!(column_count(DIM_CLIENT), Some(4));
    assert_eq!(column_count(FACT_PROJECT), Some(22));
    assert_eq!(column_count(FACT_DEFECT), Some(5));
    assert_eq!(column_count("dim_unknown"), None);
}

#[test]
fn test_fact_project_row_matches_header() {
    let fact = FactProject {
        fact_id: 1,
        project_id: 1,
        name: Some("Portal".into()),
        description: None,
        planned_hours: 100.0,
        worked_hours: 90.0,
        planned_amount: 10000.0,
        actual_amount: 8000.0,
        profit: 2000.0,
        tasks_planned: 3,
        tasks_completed: 2,
        tasks_delayed: 1,
        employees_assigned: 4,
        roi: 25.0,
        cycle_time: 65.0,
        plan_start_time_id: Some(20240110),
        plan_end_time_id: Some(20240310),
        actual_start_time_id: None,
        actual_end_time_id: Some(20240315),
        state_id: Some(2),
        type_id: Some(1),
        client_id: Some(7),
    };
    let row = fact.to_row();
    assert_eq!(row.len(), FactProject::COLUMNS.len());
    assert_eq!(row[3], SqlValue::Null);
    assert_eq!(row[13], SqlValue::Float(25.0));
    assert_eq!(row[18], SqlValue::Int(20240315));
}

#[test]
fn test_counts_pair_tables_with_rows() {
    let schema = StarSchema {
        years: vec![DimYear { year_id: 1, year: 2024 }],
        ..Default::default()
    };
    let counts = schema.counts();
    assert_eq!(counts.len(), LOAD_ORDER.len());
    assert_eq!(counts[0], TableCount { table: DIM_YEAR, rows: 1 });
    assert!(schema.has_no_projects());
}

#[test]
fn test_template_name() {
    assert_eq!(load_template_name(DIM_TIME), "load_dim_time");
}
