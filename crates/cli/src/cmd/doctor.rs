use color_eyre::eyre::Result;
use wpmd_core::store::SqliteStore;

use super::output::DoctorOutput;
use super::{Command, Context, Report};
use crate::DoctorArgs;

impl Command for DoctorArgs {
    fn name(&self) -> &'static str {
        "doctor"
    }

    /// Report the resolved configuration without creating anything.
    fn execute(&self, ctx: &Context) -> Result<Report> {
        let rc = ctx.config()?;

        let database_exists = rc.database.is_file();
        let posts = if database_exists {
            Some(SqliteStore::open(&rc.database)?.count_posts()?)
        } else {
            None
        };

        Ok(Report::Doctor(DoctorOutput {
            path: ctx.config_path().display().to_string(),
            profile: rc.active_profile,
            database: rc.database.display().to_string(),
            database_exists,
            posts,
            log_level: rc.logging.level,
            log_file_level: rc.logging.file_level,
            log_file: rc.logging.file.map(|p| p.display().to_string()),
        }))
    }
}
