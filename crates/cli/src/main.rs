mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use cmd::{Command, Context};

#[derive(Debug, Parser)]
#[command(
    name = "wpmd",
    version,
    about = "Publish and update posts from markdown files with YAML front matter"
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Publish a markdown file as a new post and write its ID back
    Create(CreateArgs),

    /// Update the content of the post whose ID is in the file
    Update(UpdateArgs),

    /// Create a markdown file with every supported front matter key
    New(NewArgs),

    /// Validate configuration and print resolved paths
    Doctor(DoctorArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Markdown file to publish
    pub file: Option<PathBuf>,

    /// Republish a file that already has an ID
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Markdown file holding the post ID and the new content
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// File name; ".md" is appended when missing
    pub name: Option<String>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct DoctorArgs {}

impl Commands {
    fn into_command(self) -> Box<dyn Command> {
        match self {
            Commands::Create(args) => Box::new(args),
            Commands::Update(args) => Box::new(args),
            Commands::New(args) => Box::new(args),
            Commands::Doctor(args) => Box::new(args),
        }
    }
}

fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporting: {e}");
    }

    let cli = Cli::parse();
    let ctx = Context::new(cli.config, cli.profile, cli.json);
    logging::init(&ctx.logging());

    cmd::dispatch(&ctx, cli.command.into_command())
}
