//! CLI Tooling
//!
//! Command-line entry points: run the HTTP server or print the effective
//! configuration.

use crate::api::{self, AppState};
use crate::config::{AinoConfig, ConfigLoader};
use crate::error::ApiError;
use crate::logging::init_logging;
use crate::store::Database;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Aino - low-code directories, field schemas and records
#[derive(Debug, Parser)]
#[command(name = "aino")]
#[command(about = "Low-code backend serving directories, field schemas and dynamic records")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Database directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Socket address to listen on
        #[arg(long)]
        bind: Option<String>,

        /// Use an in-memory database
        #[arg(long, default_value = "false")]
        temporary: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    /// Load configuration and fold the command-line overrides into it.
    pub fn resolve_config(&self) -> Result<AinoConfig, ApiError> {
        let mut config = ConfigLoader::load(self.config.as_deref())?;

        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = Some(dir.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Commands::Serve { bind, temporary } = &self.command {
            if let Some(bind) = bind {
                config.server.bind = bind.clone();
            }
            if *temporary {
                config.storage.temporary = true;
            }
        }
        Ok(config)
    }
}

/// Execute `cli` to completion.
pub async fn run(cli: Cli) -> Result<(), ApiError> {
    let config = cli.resolve_config()?;

    match cli.command {
        Commands::Config => {
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| ApiError::ConfigError(e.to_string()))?;
            println!("{}", rendered);
            Ok(())
        }
        Commands::Serve { .. } => {
            init_logging(Some(&config.logging))?;
            let database = Database::from_config(&config.storage)?;
            let state = AppState::new(config, database)?;
            api::serve(state)
                .await
                .map_err(|e| ApiError::Internal(format!("server failed: {}", e)))
        }
    }
}
