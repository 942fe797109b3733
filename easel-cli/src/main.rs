//! Easel: artwork provider registry CLI.
//!
//! # Usage
//!
//! ```text
//! easel provider register <component> --authority <a> [--disabled]
//! easel provider list [--json]
//! easel provider enable|disable|remove <component>
//! easel uri  (<component> | --authority <a>)
//! easel last (<component> | --authority <a>) [--json]
//! easel list (<component> | --authority <a>) [--json]
//! easel add  (<component> | --authority <a>) [--token ..] [--title ..] ...
//! easel set  (<component> | --authority <a>) [--token ..] [--title ..] ...
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    artwork::{ReadArgs, WriteArgs},
    provider::ProviderCommand,
    target::TargetArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "easel",
    version,
    about = "Register artwork providers and manage their artwork collections",
    long_about = None,
)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage registered artwork providers.
    Provider {
        #[command(subcommand)]
        command: ProviderCommand,
    },

    /// Print the content address of a provider's collection.
    Uri(TargetArgs),

    /// Show the most recently added artwork.
    Last(ReadArgs),

    /// List every artwork, newest first.
    List(ReadArgs),

    /// Add one artwork, or update the artwork with the same token.
    Add(WriteArgs),

    /// Replace the whole collection with a single artwork.
    Set(WriteArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Provider { command } => commands::provider::run(command),
        Commands::Uri(target) => commands::artwork::uri(target),
        Commands::Last(args) => commands::artwork::last(args),
        Commands::List(args) => commands::artwork::list(args),
        Commands::Add(args) => commands::artwork::add(args),
        Commands::Set(args) => commands::artwork::set(args),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
    log::debug!("logging initialised at {default_level}");
}
