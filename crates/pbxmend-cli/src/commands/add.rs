use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pbxmend_core::{FileDescriptor, FileKind, IdStrategy, OnExisting};

use super::ProjectArgs;
use crate::output::format::format_add_report;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// File paths, relative to the group
    pub paths: Vec<String>,

    /// Group id or slash-separated group path from the main group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Target name or build phase id (repeatable; inferred when omitted)
    #[arg(short, long = "target")]
    pub targets: Vec<String>,

    /// The files belong to the unit-test target
    #[arg(long)]
    pub test: bool,

    /// Label written next to each reference instead of the file name
    #[arg(long)]
    pub comment: Option<String>,

    /// Read descriptors from a JSON array instead of the command line
    #[arg(long, conflicts_with_all = ["paths", "group", "targets", "test", "comment"])]
    pub from: Option<PathBuf>,

    /// Identifier strategy: random or deterministic
    #[arg(long)]
    pub id_strategy: Option<IdStrategy>,

    /// Create missing groups along the group path
    #[arg(long)]
    pub create_groups: bool,

    /// Skip files already in their group instead of failing
    #[arg(long)]
    pub skip_existing: bool,

    /// Print the report without writing the manifest
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &AddArgs, format: OutputFormat) -> Result<()> {
    let descriptors = descriptors(args)?;
    if descriptors.is_empty() {
        anyhow::bail!("Nothing to add. Pass file paths with --group, or --from <file>.");
    }

    let config = args.project.config()?;
    let mut opts = config.add_options();
    if let Some(strategy) = args.id_strategy {
        opts.strategy = strategy;
    }
    if args.create_groups {
        opts.create_groups = true;
    }
    if args.skip_existing {
        opts.on_existing = OnExisting::Skip;
    }

    let mut project = args.project.open()?;
    let report = project
        .add_files(&descriptors, &opts)
        .with_context(|| format!("Failed to add files to {}", project.path().display()))?;

    if !args.dry_run {
        project
            .save()
            .with_context(|| format!("Failed to write {}", project.path().display()))?;
    }

    println!("{}", format_add_report(&report, args.dry_run, format));
    Ok(())
}

fn descriptors(args: &AddArgs) -> Result<Vec<FileDescriptor>> {
    if let Some(path) = &args.from {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read descriptors from {}", path.display()))?;
        return serde_json::from_str(&json)
            .with_context(|| format!("Invalid descriptor file {}", path.display()));
    }

    if args.paths.is_empty() {
        return Ok(Vec::new());
    }
    let Some(group) = &args.group else {
        anyhow::bail!("--group is required when adding paths");
    };
    if args.comment.is_some() && args.paths.len() > 1 {
        anyhow::bail!("--comment applies to a single path");
    }

    let kind = if args.test { FileKind::Test } else { FileKind::Source };
    Ok(args
        .paths
        .iter()
        .map(|path| {
            let mut desc = FileDescriptor::new(path.as_str(), group.as_str()).kind(kind);
            desc.targets = args.targets.clone();
            desc.comment = args.comment.clone();
            desc
        })
        .collect())
}
