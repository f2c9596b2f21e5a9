//! rlqp-build command-line interface
//!
//! Builds the RLQP native extension and stages the codegen source bundle

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process;

/// Display an error with optional backtrace information
fn display_error(err: &anyhow::Error, backtrace_enabled: bool) {
    eprintln!("error: {err}");

    // Show error chain
    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }

    // Show backtrace if enabled
    if backtrace_enabled {
        let backtrace = err.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            eprintln!("\nBacktrace:");
            eprintln!("{backtrace}");
        }
    }
}

#[derive(Parser)]
#[command(name = "rlqp-build")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Build the RLQP native extension",
    long_about = "Build the RLQP native extension.\n\n\
                  Build switches go after the --rlqp marker: --long (64-bit integer \
                  indices) and --debug (debug build). Other arguments after the marker \
                  are forwarded to the packaging tool."
)]
pub(crate) struct Cli {
    /// Project root containing rlqp_sources/ and extension/
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Enable verbose output including CMake logs
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Show backtrace on errors
    #[arg(long, global = true)]
    backtrace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage sources, build the static library and write the package manifest
    Build {
        /// Where to write the package manifest (default: build/rlqp-extension.json)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Arguments forwarded to the packaging tool
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        packaging_args: Vec<String>,
    },

    /// Stage the codegen source bundle only
    Stage,

    /// Show the platform build profile
    Profile {
        /// Operating system to describe instead of the host (windows, linux, macos)
        #[arg(long)]
        os: Option<String>,

        /// Pointer width to describe instead of the host (32 or 64)
        #[arg(long, value_parser = clap::value_parser!(u32).range(32..=64))]
        pointer_width: Option<u32>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the CMake configure flags
    Flags,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let split = rlqp_build::split_marker_args(&args);
    let cli = Cli::parse_from(&split.leading);

    // Initialize debug mode
    rlqp_build::init_debug(cli.verbose);
    rlqp_build::debug!("Build switches: {:?}", split.flags);

    // Only `build` forwards anything to the packaging tool
    if !split.passthrough.is_empty() && !matches!(cli.command, Commands::Build { .. }) {
        rlqp_build::debug::warn(&format!(
            "ignoring arguments after {}: {}",
            rlqp_build::MARKER,
            split.passthrough.join(" ")
        ));
    }

    let options = split.flags.build_options();
    let backtrace = cli.backtrace;

    let result = match cli.command {
        Commands::Build {
            manifest,
            packaging_args,
        } => {
            let mut passthrough = packaging_args;
            passthrough.extend(split.passthrough);
            commands::build::run(&cli.root, options, manifest.as_deref(), passthrough, cli.verbose)
        }
        Commands::Stage => commands::stage::run(&cli.root),
        Commands::Profile {
            os,
            pointer_width,
            json,
        } => commands::profile::run(os.as_deref(), pointer_width, json),
        Commands::Flags => commands::flags::run(&cli.root, options),
        Commands::Completion { shell } => commands::completion::run(shell),
    };

    if let Err(e) = result {
        // Display error with formatting
        display_error(&e, backtrace);
        process::exit(1);
    }
}

mod commands;
