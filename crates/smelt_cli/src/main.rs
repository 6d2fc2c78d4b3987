//! Smelt CLI — a minimal incremental build driver for C/C++ projects.
//!
//! Provides `smelt build` for recompiling stale translation units and
//! relinking, `smelt clean` for removing build outputs, and `smelt deps` for
//! inspecting a file's local include tree. Running `smelt` with no
//! subcommand builds.

#![warn(missing_docs)]

mod build;
mod clean;
mod deps;
mod pipeline;
mod progress;
mod toolchain;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Smelt — rebuild only what changed.
#[derive(Parser, Debug)]
#[command(name = "smelt", version, about = "Smelt incremental C/C++ build driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `smelt.toml` configuration file or project directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run (defaults to `build`).
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recompile stale translation units and relink the executable.
    Build(BuildArgs),
    /// Remove object files and the executable.
    Clean,
    /// Print the local include tree of a source file.
    Deps(DepsArgs),
}

/// Arguments for the `smelt build` subcommand.
#[derive(Parser, Debug, Default)]
pub struct BuildArgs {
    /// Extra glob patterns to exclude from discovery (e.g. `tests/`).
    #[arg(value_name = "EXCLUDE")]
    pub excludes: Vec<String>,
}

/// Arguments for the `smelt deps` subcommand.
#[derive(Parser, Debug)]
pub struct DepsArgs {
    /// File to inspect (default: the configured main file).
    pub path: Option<String>,

    /// Output format for the tree.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Dependency tree output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Indented tree, one line per include.
    Text,
    /// Machine-readable JSON listing.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Some(Command::Build(ref args)) => build::run(args, &global),
        None => build::run(&BuildArgs::default(), &global),
        Some(Command::Clean) => clean::run(&global),
        Some(Command::Deps(ref args)) => deps::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
