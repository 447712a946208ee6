use anyhow::{Context, Result};
use clap::Args;

use super::ProjectArgs;
use crate::output::format::format_repair_report;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct RepairArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Keep groups that were already empty
    #[arg(long)]
    pub keep_empty_groups: bool,

    /// Print the fixes without writing the manifest
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &RepairArgs, format: OutputFormat) -> Result<()> {
    let mut opts = args.project.config()?.repair_options();
    if args.keep_empty_groups {
        opts.prune_empty_groups = false;
    }

    let mut project = args.project.open()?;
    let report = project
        .repair(&opts)
        .with_context(|| format!("Failed to repair {}", project.path().display()))?;

    if !args.dry_run {
        project
            .save()
            .with_context(|| format!("Failed to write {}", project.path().display()))?;
    }

    println!("{}", format_repair_report(&report, args.dry_run, format));
    Ok(())
}
