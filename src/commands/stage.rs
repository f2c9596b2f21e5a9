//! Stage command
//!
//! Copies the codegen source bundle without building anything.

use super::load_project;
use anyhow::{Context, Result};
use rlqp_build::stage_codegen_sources;
use std::path::Path;

/// Stage the codegen bundle and print its fingerprint
pub(crate) fn run(root: &Path) -> Result<()> {
    let (_config, layout) = load_project(root)?;

    let report = stage_codegen_sources(&layout).context("Failed to stage codegen sources")?;

    println!(
        "Staged {} files into {}",
        report.files,
        report.dest.display()
    );
    println!("Fingerprint: {}", report.fingerprint);

    Ok(())
}
