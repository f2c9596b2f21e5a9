//! Flags command
//!
//! Print the `CMake` configure flags the build would use.

use super::load_project;
use anyhow::{Context, Result};
use rlqp_build::{BuildConfiguration, BuildOptions, PlatformProfile, PythonResolver};
use std::path::Path;

/// Print one configure argument per line, generator included
pub(crate) fn run(root: &Path, options: BuildOptions) -> Result<()> {
    let (config, _layout) = load_project(root)?;
    let resolver = PythonResolver::from_config(&config);
    let profile = PlatformProfile::host();

    let configuration = BuildConfiguration::assemble(options, &resolver)
        .context("Failed to assemble CMake configure flags")?;

    for flag in configuration.flags() {
        println!("{flag}");
    }
    println!("-G");
    println!("{}", profile.generator);

    Ok(())
}
