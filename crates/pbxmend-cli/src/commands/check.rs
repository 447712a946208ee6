use anyhow::{Context, Result};
use clap::Args;
use pbxmend_core::CoreError;

use super::ProjectArgs;
use crate::output::format::format_repair_report;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Do not count already-empty groups as problems
    #[arg(long)]
    pub keep_empty_groups: bool,
}

pub fn run(args: &CheckArgs, format: OutputFormat) -> Result<()> {
    let mut opts = args.project.config()?.repair_options();
    if args.keep_empty_groups {
        opts.prune_empty_groups = false;
    }

    // never saved
    let mut project = args.project.open()?;
    let report = project
        .repair(&opts)
        .with_context(|| format!("Failed to check {}", project.path().display()))?;

    println!("{}", format_repair_report(&report, true, format));
    if !report.is_clean() {
        return Err(CoreError::IntegrityViolation(format!(
            "{} problem(s) found; run `pbxmend repair`",
            report.fixes.len()
        ))
        .into());
    }
    Ok(())
}
