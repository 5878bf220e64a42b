//! Weave CLI: the command-line front end of the Weave bindings compiler.
//!
//! Provides `weave generate` for producing bindings from declaration files
//! and `weave backends` for listing the registered backends.

#![warn(missing_docs)]

mod backends;
mod generate;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Weave: a bindings compiler for C, C++ and ArkTS.
#[derive(Parser, Debug)]
#[command(name = "weave", version, about = "Weave bindings compiler")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `weave.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate bindings for every declaration file found.
    Generate(GenerateArgs),
    /// List registered backends and their dependencies.
    Backends,
}

/// Arguments for the `weave generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Directories searched for declaration files.
    #[arg(short = 'I', long = "include", num_args = 1..)]
    pub include: Vec<String>,

    /// Output root directory.
    #[arg(short = 'O', long = "output")]
    pub output: Option<String>,

    /// Generate C++ implementation scaffolding (`cpp-author`).
    #[arg(long)]
    pub author: bool,

    /// Generate C++ call wrappers (`cpp-user`).
    #[arg(long)]
    pub user: bool,

    /// Generate the ArkTS native bridge (`ani-bridge`).
    #[arg(long)]
    pub ani: bool,

    /// Generate C implementation scaffolding (`c-impl`).
    #[arg(long = "c-impl")]
    pub c_impl: bool,

    /// Dump the declaration graph (`pretty-print`).
    #[arg(long)]
    pub debug: bool,

    /// Additional backends to run by name.
    #[arg(long = "backend", num_args = 1..)]
    pub backends: Vec<String>,

    /// Keep declared function names in ArkTS instead of camel-casing them.
    #[arg(long)]
    pub keep_name: bool,
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

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Generate(ref args) => generate::run(args, &global),
        Command::Backends => backends::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Default log level when `RUST_LOG` is unset.
fn default_filter(global: &GlobalArgs) -> &'static str {
    if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    }
}

fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(global)));
    // A subscriber installed by an embedding process wins.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
