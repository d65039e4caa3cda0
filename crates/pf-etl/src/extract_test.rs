use super::*;
use crate::error::EtlError;
use pf_db::{DbError, DuckDbBackend};

async fn source() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE estado (estado_id INTEGER, nombre_estado VARCHAR);
         INSERT INTO estado VALUES (1, 'En curso'), (2, 'Completado');
         CREATE TABLE fase_sdlc (fase_id INTEGER, nombre_fase VARCHAR);
         INSERT INTO fase_sdlc VALUES (1, 'Pruebas');",
    )
    .await
    .unwrap();
    db
}

#[tokio::test]
async fn test_missing_queries_are_skipped() {
    let db = source().await;
    let queries = QuerySet::parse(
        "-- extract_states
SELECT estado_id AS state_id, nombre_estado AS state_name FROM estado;
-- extract_phases
SELECT fase_id AS phase_id, nombre_fase AS phase_name FROM fase_sdlc;
",
    );

    let snapshot = extract(&db, &queries).await.unwrap();
    assert_eq!(snapshot.states.len(), 2);
    assert_eq!(snapshot.states[1].state_name.as_deref(), Some("Completado"));
    assert_eq!(snapshot.phases.len(), 1);

    assert!(!snapshot.is_missing(Entity::States));
    assert!(snapshot.is_missing(Entity::Projects));
    assert!(snapshot.projects.is_empty());
    assert_eq!(snapshot.missing.len(), Entity::ALL.len() - 2);
}

#[tokio::test]
async fn test_failing_query_aborts_extraction() {
    let db = source().await;
    let queries = QuerySet::parse("-- extract_projects\nSELECT * FROM proyecto;\n");

    let err = extract(&db, &queries).await.unwrap_err();
    assert!(matches!(err, EtlError::Db(DbError::TableNotFound(_))), "got {err:?}");
}

#[tokio::test]
async fn test_undecodable_rows_abort_extraction() {
    let db = source().await;
    let queries = QuerySet::parse("-- extract_states\nSELECT nombre_estado AS state_name FROM estado;\n");

    let err = extract(&db, &queries).await.unwrap_err();
    assert!(matches!(err, EtlError::Decode { entity: Entity::States, .. }));
}
