//! Build command
//!
//! Full orchestration: codegen bundle, `CMake` static library, extension
//! descriptor and package manifest.

use super::load_project;
use anyhow::{Context, Result};
use rlqp_build::{
    BuildOptions, CMakeInvoker, Orchestrator, PlatformProfile, PythonResolver,
};
use std::path::Path;

/// Run every build phase and write the package manifest
pub(crate) fn run(
    root: &Path,
    options: BuildOptions,
    manifest_path: Option<&Path>,
    passthrough: Vec<String>,
    verbose: bool,
) -> Result<()> {
    let (config, layout) = load_project(root)?;
    let resolver = PythonResolver::from_config(&config);
    let invoker = CMakeInvoker::locate(config.cmake.as_deref(), config.target(), verbose);
    let orchestrator = Orchestrator::new(layout, config, PlatformProfile::host(), options);

    let report = orchestrator
        .run(&resolver, &invoker, passthrough)
        .context("RLQP build failed")?;

    let manifest_path = manifest_path.map_or_else(
        || root.join("build").join("rlqp-extension.json"),
        Path::to_path_buf,
    );
    report
        .manifest
        .write(&manifest_path)
        .context("Failed to write package manifest")?;

    println!(
        "Staged {} files into {}",
        report.stage.files,
        report.stage.dest.display()
    );
    println!(
        "Built {} with {} in {:.1}s",
        report.outcome.artifact.display(),
        report.tool_version.raw,
        report.outcome.duration.as_secs_f64()
    );
    println!("Wrote {}", manifest_path.display());

    Ok(())
}
