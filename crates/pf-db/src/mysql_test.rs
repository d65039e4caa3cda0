use super::*;

fn mysql_config() -> DatabaseConfig {
    DatabaseConfig {
        db_type: DbType::MySql,
        path: None,
        host: Some("db.internal".to_string()),
        port: 3307,
        user: Some("etl".to_string()),
        password: Some("secret".to_string()),
        password_env: None,
        database: Some("pmo".to_string()),
    }
}

#[test]
fn test_connect_options_from_config() {
    assert!(connect_options(&mysql_config()).is_ok());
}

#[test]
fn test_connect_options_requires_host() {
    let mut config = mysql_config();
    config.host = None;
    let err = connect_options(&config).unwrap_err();
    assert!(matches!(err, DbError::Config(_)), "got {err:?}");
}

#[test]
fn test_connect_options_missing_password_env() {
    let mut config = mysql_config();
    config.password = None;
    config.password_env = Some("PF_TEST_UNSET_MYSQL_PASSWORD".to_string());
    let err = connect_options(&config).unwrap_err();
    assert!(err.to_string().contains("PF_TEST_UNSET_MYSQL_PASSWORD"));
}
