//! Configuration types and parsing for pmoflow.yml

use crate::entity::Entity;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File name looked up by [`Config::load_from_dir`].
pub const CONFIG_FILE_NAME: &str = "pmoflow.yml";

/// Environment variable consulted when no `--target` flag is given.
pub const TARGET_ENV_VAR: &str = "PF_TARGET";

/// Main pipeline configuration from pmoflow.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Deployment name, used in console output
    pub name: String,

    /// Operational store the pipeline extracts from and marks
    #[serde(default = "default_source")]
    pub source: DatabaseConfig,

    /// Reporting store the star schema is loaded into
    #[serde(default = "default_warehouse")]
    pub warehouse: DatabaseConfig,

    /// Locations of the named-query files
    #[serde(default)]
    pub queries: QueryPaths,

    /// Load strategy settings
    #[serde(default)]
    pub load: LoadConfig,

    /// Transformation settings
    #[serde(default)]
    pub transform: TransformConfig,

    /// Incremental marking settings
    #[serde(default)]
    pub marking: MarkingConfig,

    /// Named target configurations (e.g., dev, prod)
    /// Each target can override the source and warehouse connections
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Source connection override
    #[serde(default)]
    pub source: Option<DatabaseConfig>,

    /// Warehouse connection override
    #[serde(default)]
    pub warehouse: Option<DatabaseConfig>,
}

/// Database engine selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB, embedded and file based (default)
    #[default]
    DuckDb,
    /// MySQL over the network
    MySql,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
            DbType::MySql => write!(f, "mysql"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type (duckdb or mysql)
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database file (DuckDB only; `:memory:` for a throwaway database)
    #[serde(default)]
    pub path: Option<String>,

    /// Server host (MySQL only)
    #[serde(default)]
    pub host: Option<String>,

    /// Server port (MySQL only)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Login user (MySQL only)
    #[serde(default)]
    pub user: Option<String>,

    /// Literal password (MySQL only)
    #[serde(default)]
    pub password: Option<String>,

    /// Environment variable holding the password, read before the run starts
    #[serde(default)]
    pub password_env: Option<String>,

    /// Schema/database name (MySQL only)
    #[serde(default)]
    pub database: Option<String>,
}

impl DatabaseConfig {
    /// DuckDB configuration for the given file.
    pub fn duckdb(path: impl Into<String>) -> Self {
        Self {
            db_type: DbType::DuckDb,
            path: Some(path.into()),
            host: None,
            port: default_port(),
            user: None,
            password: None,
            password_env: None,
            database: None,
        }
    }

    /// Check that the fields required by the engine are present.
    pub fn validate(&self, role: &str) -> CoreResult<()> {
        let missing = |field: &str| CoreError::ConfigInvalid {
            message: format!("{role}: '{field}' is required for {} connections", self.db_type),
        };
        match self.db_type {
            DbType::DuckDb => {
                if self.path.as_deref().map_or(true, str::is_empty) {
                    return Err(missing("path"));
                }
            }
            DbType::MySql => {
                if self.host.as_deref().map_or(true, str::is_empty) {
                    return Err(missing("host"));
                }
                if self.user.as_deref().map_or(true, str::is_empty) {
                    return Err(missing("user"));
                }
                if self.database.as_deref().map_or(true, str::is_empty) {
                    return Err(missing("database"));
                }
            }
        }
        Ok(())
    }

    /// Resolve the password: the literal value wins, then `password_env`.
    pub fn resolve_password(&self) -> CoreResult<Option<String>> {
        if let Some(password) = &self.password {
            return Ok(Some(password.clone()));
        }
        match &self.password_env {
            Some(name) => std::env::var(name)
                .map(Some)
                .map_err(|_| CoreError::MissingEnvVar { name: name.clone() }),
            None => Ok(None),
        }
    }

    /// Copy with the password read now, so a missing variable fails before
    /// any connection is opened.
    pub fn with_resolved_password(mut self) -> CoreResult<Self> {
        self.password = self.resolve_password()?;
        self.password_env = None;
        Ok(self)
    }

    /// Human-readable location, never including credentials.
    pub fn describe(&self) -> String {
        match self.db_type {
            DbType::DuckDb => format!("duckdb:{}", self.path.as_deref().unwrap_or("?")),
            DbType::MySql => format!(
                "mysql://{}@{}:{}/{}",
                self.user.as_deref().unwrap_or("?"),
                self.host.as_deref().unwrap_or("?"),
                self.port,
                self.database.as_deref().unwrap_or("?")
            ),
        }
    }
}

/// Paths of the named-query files, relative to the project directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryPaths {
    /// Extraction queries (`-- extract_*` blocks)
    #[serde(default = "default_extraction_queries")]
    pub extraction: String,

    /// Load templates (`-- load_*` blocks)
    #[serde(default = "default_load_queries")]
    pub load: String,
}

impl Default for QueryPaths {
    fn default() -> Self {
        Self {
            extraction: default_extraction_queries(),
            load: default_load_queries(),
        }
    }
}

/// How the warehouse is prepared before inserting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadStrategy {
    /// Empty every target table, then insert the run's full dataset (default)
    #[default]
    Clean,
    /// Keep existing rows; duplicates are ignored on insert
    Incremental,
}

impl std::fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStrategy::Clean => write!(f, "clean"),
            LoadStrategy::Incremental => write!(f, "incremental"),
        }
    }
}

/// Load settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadConfig {
    #[serde(default)]
    pub strategy: LoadStrategy,
}

/// Which projects reach the fact tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectScope {
    /// Every extracted project (default)
    #[default]
    All,
    /// Only projects whose state is listed in `terminal_states`
    Terminal,
}

/// Language used for weekday and month names in the calendar dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

/// Transformation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformConfig {
    #[serde(default)]
    pub project_scope: ProjectScope,

    /// State names treated as terminal when `project_scope` is `terminal`
    #[serde(default = "default_terminal_states")]
    pub terminal_states: Vec<String>,

    #[serde(default)]
    pub locale: Locale,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            project_scope: ProjectScope::default(),
            terminal_states: default_terminal_states(),
            locale: Locale::default(),
        }
    }
}

/// One source table flagged after a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkTable {
    /// Entity whose extracted ids are marked
    pub entity: Entity,
    /// Source table name
    pub table: String,
    /// Integer key column
    pub id_column: String,
}

impl MarkTable {
    fn new(entity: Entity, table: &str, id_column: &str) -> Self {
        Self {
            entity,
            table: table.to_string(),
            id_column: id_column.to_string(),
        }
    }
}

/// Incremental marking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Column set to 1 on extracted rows
    #[serde(default = "default_flag_column")]
    pub flag_column: String,

    /// Maximum ids per UPDATE statement
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_mark_tables")]
    pub tables: Vec<MarkTable>,
}

impl Default for MarkingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            flag_column: default_flag_column(),
            chunk_size: default_chunk_size(),
            tables: default_mark_tables(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_source() -> DatabaseConfig {
    DatabaseConfig::duckdb("pmo_db.duckdb")
}

fn default_warehouse() -> DatabaseConfig {
    DatabaseConfig::duckdb("ssd_db.duckdb")
}

fn default_port() -> u16 {
    3306
}

fn default_extraction_queries() -> String {
    "sql/extraction_queries.sql".to_string()
}

fn default_load_queries() -> String {
    "sql/load_queries.sql".to_string()
}

fn default_terminal_states() -> Vec<String> {
    vec!["Completado".to_string(), "Cancelado".to_string()]
}

fn default_flag_column() -> String {
    "metadata_extraccion".to_string()
}

fn default_chunk_size() -> usize {
    500
}

fn default_mark_tables() -> Vec<MarkTable> {
    vec![
        MarkTable::new(Entity::Projects, "proyecto", "proyecto_id"),
        MarkTable::new(Entity::Tasks, "tarea", "tarea_id"),
        MarkTable::new(Entity::Finances, "finanzas_proyecto", "id"),
        MarkTable::new(Entity::Defects, "defecto", "defecto_id"),
    ]
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !s.starts_with(|c: char| c.is_ascii_digit())
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        Self::load(&dir.join(CONFIG_FILE_NAME))
    }

    /// Validate configuration values that serde cannot express
    pub fn validate(&self) -> CoreResult<()> {
        self.source.validate("source")?;
        self.warehouse.validate("warehouse")?;
        for (name, target) in &self.targets {
            if let Some(source) = &target.source {
                source.validate(&format!("targets.{name}.source"))?;
            }
            if let Some(warehouse) = &target.warehouse {
                warehouse.validate(&format!("targets.{name}.warehouse"))?;
            }
        }

        if self.transform.project_scope == ProjectScope::Terminal
            && self.transform.terminal_states.is_empty()
        {
            return Err(CoreError::ConfigInvalid {
                message: "transform.terminal_states must not be empty when project_scope is 'terminal'"
                    .to_string(),
            });
        }

        if self.marking.chunk_size == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "marking.chunk_size must be greater than zero".to_string(),
            });
        }
        if !is_identifier(&self.marking.flag_column) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "marking.flag_column '{}' is not a plain identifier",
                    self.marking.flag_column
                ),
            });
        }
        for mark in &self.marking.tables {
            if !mark.entity.has_single_key() {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "marking.tables: '{}' has a composite key and cannot be marked",
                        mark.entity
                    ),
                });
            }
            if !is_identifier(&mark.table) || !is_identifier(&mark.id_column) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "marking.tables: '{}.{}' is not a plain identifier",
                        mark.table, mark.id_column
                    ),
                });
            }
        }
        Ok(())
    }

    /// Names of all configured targets, sorted
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn target(&self, name: &str) -> CoreResult<&TargetConfig> {
        self.targets
            .get(name)
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: format!(
                    "Target '{}' not found. Available targets: {}",
                    name,
                    self.available_targets().join(", ")
                ),
            })
    }

    /// Source connection, optionally applying target overrides
    pub fn source_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => Ok(self
                .target(name)?
                .source
                .clone()
                .unwrap_or_else(|| self.source.clone())),
            None => Ok(self.source.clone()),
        }
    }

    /// Warehouse connection, optionally applying target overrides
    pub fn warehouse_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => Ok(self
                .target(name)?
                .warehouse
                .clone()
                .unwrap_or_else(|| self.warehouse.clone())),
            None => Ok(self.warehouse.clone()),
        }
    }

    /// Absolute path of the extraction query file
    pub fn extraction_queries_path(&self, root: &Path) -> PathBuf {
        root.join(&self.queries.extraction)
    }

    /// Absolute path of the load query file
    pub fn load_queries_path(&self, root: &Path) -> PathBuf {
        root.join(&self.queries.load)
    }

    /// Resolve target from CLI flag or PF_TARGET environment variable
    ///
    /// Priority: CLI flag > PF_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var(TARGET_ENV_VAR).ok())
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
