use anyhow::{Context, Result};
use clap::Args;
use pbxmend_core::{IdStrategy, PbxConfig};

#[derive(Args)]
pub struct InitArgs {
    /// Default identifier strategy: random or deterministic
    #[arg(long, default_value = "random")]
    pub id_strategy: IdStrategy,

    /// Create missing groups by default
    #[arg(long)]
    pub create_groups: bool,

    /// Skip files already in their group by default
    #[arg(long)]
    pub skip_existing: bool,

    /// Keep already-empty groups during repair
    #[arg(long)]
    pub keep_empty_groups: bool,
}

pub fn run(args: &InitArgs) -> Result<()> {
    let config = PbxConfig {
        id_strategy: args.id_strategy,
        create_groups: args.create_groups,
        skip_existing: args.skip_existing,
        prune_empty_groups: !args.keep_empty_groups,
    };
    config
        .save_to_repository(std::path::Path::new("."))
        .context("Failed to write pbxmend config. Run inside a Git repository.")?;

    println!("pbxmend defaults written to the repository's git config.");
    println!();
    println!("Next steps:");
    println!("  pbxmend check                       Look for manifest damage");
    println!("  pbxmend add -g <group> <file>...    Add files to the project");
    Ok(())
}
