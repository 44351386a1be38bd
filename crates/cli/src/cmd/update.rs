use color_eyre::eyre::Result;
use wpmd_core::publish::update_post;

use super::{Command, Context, Report, required_file};
use crate::UpdateArgs;

impl Command for UpdateArgs {
    fn name(&self) -> &'static str {
        "update"
    }

    fn execute(&self, ctx: &Context) -> Result<Report> {
        let file = required_file(self.file.as_deref())?;
        let mut store = ctx.open_store()?;
        Ok(Report::Post(update_post(&mut store, file)?))
    }
}
