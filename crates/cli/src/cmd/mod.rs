//! Subcommands. Each one is a [`Command`] object handed to [`dispatch`].

mod create;
mod doctor;
mod new;
mod output;
mod update;

pub use output::Report;

use color_eyre::eyre::{Result, eyre};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use wpmd_core::config::{
    ConfigError, ConfigLoader, LoggingConfig, ResolvedConfig, default_config_path,
};
use wpmd_core::publish::PublishError;
use wpmd_core::store::SqliteStore;

use crate::logging;

pub trait Command {
    /// Name printed in the `OK` / `FAIL` status line.
    fn name(&self) -> &'static str;

    fn execute(&self, ctx: &Context) -> Result<Report>;
}

/// Global flags shared by every command.
#[derive(Debug)]
pub struct Context {
    config_path: Option<PathBuf>,
    profile: Option<String>,
    json: bool,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>, profile: Option<String>, json: bool) -> Self {
        Self { config_path, profile, json }
    }

    /// The file that is (or would be) read for configuration.
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }

    pub fn load_config(&self) -> Result<ResolvedConfig, ConfigError> {
        ConfigLoader::load(self.config_path.as_deref(), self.profile.as_deref())
    }

    /// Resolved configuration, with a hint about the default location when
    /// no `--config` was given.
    pub fn config(&self) -> Result<ResolvedConfig> {
        self.load_config().map_err(|e| match self.config_path {
            Some(_) => eyre!("{e}"),
            None => eyre!("{e}\nlooked for: {}", default_config_path().display()),
        })
    }

    /// Logging settings of the active profile, or the defaults when the
    /// configuration cannot be loaded.
    pub fn logging(&self) -> LoggingConfig {
        self.load_config().map(|rc| rc.logging).unwrap_or_default()
    }

    /// Open the post store of the active profile, creating its directory.
    pub fn open_store(&self) -> Result<SqliteStore> {
        let rc = self.config()?;
        if let Some(parent) = rc.database.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| eyre!("failed to create {}: {e}", parent.display()))?;
        }
        debug!("opening post store {}", rc.database.display());
        Ok(SqliteStore::open(&rc.database)?)
    }
}

/// The file argument, checked to exist before the store is touched.
pub fn required_file(file: Option<&Path>) -> Result<&Path, PublishError> {
    let file = file.ok_or(PublishError::MissingFileArgument)?;
    if !file.is_file() {
        return Err(PublishError::FileNotFound(file.to_path_buf()));
    }
    Ok(file)
}

/// Run `command` and print its status line; failures exit with status 1.
pub fn dispatch(ctx: &Context, command: Box<dyn Command>) -> ExitCode {
    let name = command.name();
    let code = match command.execute(ctx) {
        Ok(report) => {
            if ctx.json {
                output::print_json(&report);
            } else {
                println!("OK   wpmd {name}");
                for line in report.lines() {
                    println!("{line}");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("wpmd {name} failed: {e:?}");
            println!("FAIL wpmd {name}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    };
    logging::flush();
    code
}
