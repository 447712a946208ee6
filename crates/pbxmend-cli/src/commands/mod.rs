pub mod add;
pub mod check;
pub mod init;
pub mod remove;
pub mod repair;
pub mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use pbxmend_core::{PbxConfig, Project};

#[derive(Subcommand)]
pub enum Commands {
    /// Store pbxmend defaults in the current repository's git config
    Init(init::InitArgs),
    /// Add files to a group and to their targets' build phases
    Add(add::AddArgs),
    /// Remove a file and every build file and membership pointing at it
    Remove(remove::RemoveArgs),
    /// Fix duplicates, dangling references, broken lists and empty groups
    Repair(repair::RepairArgs),
    /// Report what `repair` would change and fail if anything
    Check(check::CheckArgs),
    /// Show an object and everything that references it
    Show(show::ShowArgs),
}

/// Which manifest to operate on.
#[derive(Args)]
pub struct ProjectArgs {
    /// Manifest, .xcodeproj bundle, or directory containing one
    #[arg(short, long, env = "PBXMEND_PROJECT", default_value = ".")]
    pub project: PathBuf,
}

impl ProjectArgs {
    pub fn open(&self) -> Result<Project> {
        Project::discover(&self.project)
            .with_context(|| format!("Failed to open project at {}", self.project.display()))
    }

    /// Git config of the repository holding the project.
    pub fn config(&self) -> Result<PbxConfig> {
        let start: &Path = if self.project.is_file() {
            self.project
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
        } else {
            &self.project
        };
        PbxConfig::discover(start).context("Failed to read pbxmend config")
    }
}
