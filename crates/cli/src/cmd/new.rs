use chrono::Local;
use color_eyre::eyre::Result;
use wpmd_core::publish::{PublishError, new_post_file};

use super::output::FileOutput;
use super::{Command, Context, Report};
use crate::NewArgs;

/// Needs no configuration; the template is written relative to the
/// working directory.
impl Command for NewArgs {
    fn name(&self) -> &'static str {
        "new"
    }

    fn execute(&self, _ctx: &Context) -> Result<Report> {
        let name = self.name.as_deref().ok_or(PublishError::MissingFileArgument)?;
        let path = new_post_file(name, self.force, Local::now().naive_local())?;
        Ok(Report::File(FileOutput::new(&path)))
    }
}
