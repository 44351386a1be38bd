use color_eyre::eyre::Result;
use wpmd_core::publish::prepare_create;

use super::{Command, Context, Report, required_file};
use crate::CreateArgs;

impl Command for CreateArgs {
    fn name(&self) -> &'static str {
        "create"
    }

    fn execute(&self, ctx: &Context) -> Result<Report> {
        let file = required_file(self.file.as_deref())?;
        // The store is only opened for a file that can be published.
        let pending = prepare_create(file, self.force)?;
        let mut store = ctx.open_store()?;
        Ok(Report::Post(pending.submit(&mut store)?))
    }
}
