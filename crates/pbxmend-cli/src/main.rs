use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use pbxmend_core::{CoreError, ErrorKind};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "pbxmend",
    version,
    about = "Add, remove and repair file entries in Xcode project manifests"
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: output::OutputFormat,

    #[command(subcommand)]
    command: commands::Commands,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        commands::Commands::Init(args) => commands::init::run(args),
        commands::Commands::Add(args) => commands::add::run(args, cli.format),
        commands::Commands::Remove(args) => commands::remove::run(args, cli.format),
        commands::Commands::Repair(args) => commands::repair::run(args, cli.format),
        commands::Commands::Check(args) => commands::check::run(args, cli.format),
        commands::Commands::Show(args) => commands::show::run(args, cli.format),
    }
}

/// Process exit status for a failed command, keyed by the library error kind.
fn exit_code(err: &anyhow::Error) -> u8 {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<CoreError>())
        .map(CoreError::kind);
    match kind {
        Some(ErrorKind::Structural) => 2,
        Some(ErrorKind::DuplicatePath) => 3,
        Some(ErrorKind::IdentifierExhausted) => 4,
        Some(ErrorKind::Integrity) => 5,
        Some(ErrorKind::FileNotFound) | Some(ErrorKind::Io) => 6,
        Some(ErrorKind::Other) | None => 1,
    }
}
