use anyhow::{Context, Result};
use clap::Args;

use super::ProjectArgs;
use crate::output::format::format_remove_report;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// File path as recorded in the group
    pub path: String,

    /// Group id or slash-separated group path holding the file
    #[arg(short, long)]
    pub group: String,

    /// Print the report without writing the manifest
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &RemoveArgs, format: OutputFormat) -> Result<()> {
    let mut project = args.project.open()?;
    let report = project
        .remove_file(&args.group, &args.path)
        .with_context(|| format!("Failed to remove '{}'", args.path))?;

    if !args.dry_run {
        project
            .save()
            .with_context(|| format!("Failed to write {}", project.path().display()))?;
    }

    println!("{}", format_remove_report(&report, args.dry_run, format));
    Ok(())
}
