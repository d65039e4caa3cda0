//! Runtime context for CLI commands

use anyhow::{Context, Result};
use pf_core::{Config, DatabaseConfig};
use pf_etl::PipelineOptions;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Loaded configuration plus the resolved target
pub(crate) struct RuntimeContext {
    /// Project directory; query file paths are relative to it
    pub root: PathBuf,

    pub config: Config,

    /// Active target from `--target` or `PF_TARGET`
    pub target: Option<String>,

    /// Verbose output enabled
    pub verbose: bool,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&args.project_dir);

        let config = if let Some(config_path) = &args.config {
            Config::load(Path::new(config_path)).context("Failed to load configuration file")?
        } else {
            Config::load_from_dir(&root).context("Failed to load project configuration")?
        };

        Ok(Self {
            root,
            config,
            target: Config::resolve_target(args.target.as_deref()),
            verbose: args.verbose,
        })
    }

    pub fn source(&self) -> Result<DatabaseConfig> {
        self.config
            .source_config(self.target.as_deref())
            .context("Failed to resolve source connection")
    }

    pub fn warehouse(&self) -> Result<DatabaseConfig> {
        self.config
            .warehouse_config(self.target.as_deref())
            .context("Failed to resolve warehouse connection")
    }

    /// Resolve everything a pipeline run needs, reading both query files
    pub fn pipeline_options(&self) -> Result<PipelineOptions> {
        PipelineOptions::from_config(&self.config, &self.root, self.target.as_deref())
            .context("Failed to prepare pipeline")
    }

    /// Print verbose output if enabled
    pub fn verbose(&self, msg: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", msg);
        }
    }
}
