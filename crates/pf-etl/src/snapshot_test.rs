use super::*;
use pf_core::SqlValue;

fn ids_table(column: &str, ids: &[i64]) -> Table {
    Table::with_rows(
        "t",
        vec![column.to_string()],
        ids.iter().map(|&id| vec![SqlValue::Int(id)]).collect(),
    )
    .unwrap()
}

#[test]
fn test_insert_table_clears_missing_flag() {
    let mut snapshot = SourceSnapshot::default();
    snapshot.mark_missing(Entity::Tasks);
    assert!(snapshot.is_missing(Entity::Tasks));

    snapshot
        .insert_table(Entity::Tasks, &ids_table("task_id", &[4, 5]))
        .unwrap();
    assert!(!snapshot.is_missing(Entity::Tasks));
    assert_eq!(snapshot.len(Entity::Tasks), 2);
}

#[test]
fn test_ids_follow_extraction_order() {
    let mut snapshot = SourceSnapshot::default();
    snapshot
        .insert_table(Entity::Finances, &ids_table("finance_id", &[9, 2, 7]))
        .unwrap();
    assert_eq!(snapshot.ids(Entity::Finances), Some(vec![9, 2, 7]));
    assert_eq!(snapshot.ids(Entity::Projects), Some(vec![]));
    assert_eq!(snapshot.ids(Entity::ProjectEmployees), None);
}

#[test]
fn test_counts_cover_every_entity() {
    let mut snapshot = SourceSnapshot::default();
    snapshot.mark_missing(Entity::Phases);
    snapshot
        .insert_table(Entity::Projects, &ids_table("project_id", &[1]))
        .unwrap();

    let counts = snapshot.counts();
    assert_eq!(counts.len(), Entity::ALL.len());
    assert_eq!(counts[0].entity, Entity::Projects);
    assert_eq!(counts[0].rows, 1);
    let phases = counts.iter().find(|c| c.entity == Entity::Phases).unwrap();
    assert!(phases.missing);
}
