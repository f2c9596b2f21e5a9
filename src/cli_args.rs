//! `--rlqp` marker arguments
//!
//! Build switches ride along with arguments meant for someone else (the
//! packaging tool). They are only recognised after the `--rlqp` marker:
//!
//! ```text
//! rlqp-build build --inplace --rlqp --long --debug
//!                  ^^^^^^^^^ passthrough   ^^^^^^^^^^^^^^ marker flags
//! ```
//!
//! Splitting is done in two stages without touching the process arguments:
//! the vector is cut at the marker, then the tail is partitioned into known
//! flags (parsed with clap) and passthrough arguments.

use crate::build_config::BuildOptions;
use clap::Parser;

/// Marker enabling the flags below
pub const MARKER: &str = "--rlqp";

const MARKER_FLAGS: &[&str] = &["--long", "--debug"];

/// Flags recognised after [`MARKER`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Parser)]
#[command(
    name = MARKER,
    no_binary_name = true,
    disable_help_flag = true,
    args_override_self = true
)]
pub struct MarkerFlags {
    /// Use long integers
    #[arg(long)]
    pub long: bool,

    /// Compile extension in debug mode
    #[arg(long)]
    pub debug: bool,
}

impl MarkerFlags {
    #[must_use]
    pub const fn build_options(self) -> BuildOptions {
        BuildOptions {
            wide_index: self.long,
            debug: self.debug,
        }
    }
}

/// Result of splitting an argument vector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitArgs {
    /// Everything before the marker, unchanged (includes the program name)
    pub leading: Vec<String>,
    /// Build switches found after the marker
    pub flags: MarkerFlags,
    /// Arguments after the marker that are not build switches, in order
    pub passthrough: Vec<String>,
    /// Whether the marker was present
    pub marked: bool,
}

/// Split `args` at the first [`MARKER`].
///
/// Without the marker nothing is interpreted and every argument is leading.
#[must_use]
pub fn split_marker_args(args: &[String]) -> SplitArgs {
    let Some(marker_at) = args.iter().position(|a| a == MARKER) else {
        return SplitArgs {
            leading: args.to_vec(),
            ..SplitArgs::default()
        };
    };

    let (leading, rest) = args.split_at(marker_at);
    let tail = rest.get(1..).unwrap_or_default();

    let (known, passthrough): (Vec<&String>, Vec<&String>) = tail
        .iter()
        .partition(|a| MARKER_FLAGS.contains(&a.as_str()));

    // Only known, value-less flags reach clap, so parsing cannot fail.
    let flags = MarkerFlags::try_parse_from(known).unwrap_or_default();

    SplitArgs {
        leading: leading.to_vec(),
        flags,
        passthrough: passthrough.into_iter().cloned().collect(),
        marked: true,
    }
}
