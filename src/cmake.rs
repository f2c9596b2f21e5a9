//! `CMake` static library build
//!
//! Builds the solver's static library out of tree and copies it next to the
//! extension sources:
//! ```bash
//! rm -rf rlqp_sources/build && mkdir rlqp_sources/build
//! cd rlqp_sources/build
//! cmake --version
//! cmake <flags> -G <generator> ..
//! cmake --build . --target rlqpstatic [--config Release]
//! cp out/[Release/]librlqp.a ../../extension/src/
//! ```
//!
//! The build directory is handed to each child process as its working
//! directory; this process never changes its own.

use crate::build_config::BuildConfiguration;
use crate::error::{BuildError, BuildStep, Result};
use crate::platform::PlatformProfile;
use crate::staging::reset_dir;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{Duration, Instant};

/// Result of `cmake --version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersion {
    /// First line of the output, e.g. `cmake version 3.28.3`
    pub raw: String,
    /// Parsed version, when it is valid semver
    pub version: Option<semver::Version>,
}

impl ToolVersion {
    /// Parse `cmake --version` output
    #[must_use]
    pub fn parse(output: &str) -> Self {
        let raw = output.lines().next().unwrap_or("").trim().to_string();
        let version = raw
            .split_whitespace()
            .last()
            .and_then(|v| semver::Version::parse(v).ok());
        Self { raw, version }
    }
}

/// Output of a finished external build
#[derive(Debug)]
pub struct BuildOutcome {
    /// Static library copied into the extension sources
    pub artifact: PathBuf,
    /// Time spent in configure + build
    pub duration: Duration,
    /// Combined stdout + stderr of both steps
    pub output: String,
}

/// `CMake` driver for the solver's static library
#[derive(Debug)]
pub struct CMakeInvoker {
    /// Path to `CMake` executable
    cmake_path: PathBuf,
    /// `CMake` target to build
    target: String,
    /// Echo tool output
    verbose: bool,
}

impl CMakeInvoker {
    /// Invoker for an explicit `CMake` executable
    #[must_use]
    pub fn new(cmake_path: impl Into<PathBuf>, target: impl Into<String>, verbose: bool) -> Self {
        Self {
            cmake_path: cmake_path.into(),
            target: target.into(),
            verbose,
        }
    }

    /// Invoker using the first `CMake` found.
    ///
    /// Priority order:
    /// 1. `explicit` (configuration file or `CMAKE` environment variable)
    /// 2. `cmake` in `PATH`
    /// 3. plain `cmake`, left for [`probe`](Self::probe) to reject
    #[must_use]
    pub fn locate(explicit: Option<&Path>, target: &str, verbose: bool) -> Self {
        let cmake_path = explicit
            .map(Path::to_path_buf)
            .or_else(|| which::which("cmake").ok())
            .unwrap_or_else(|| PathBuf::from("cmake"));

        crate::debug!("Using CMake at {}", cmake_path.display());
        Self::new(cmake_path, target, verbose)
    }

    #[must_use]
    pub fn cmake_path(&self) -> &Path {
        &self.cmake_path
    }

    /// Check that `CMake` can be run at all
    pub fn probe(&self) -> Result<ToolVersion> {
        let output = Command::new(&self.cmake_path)
            .arg("--version")
            .output()
            .map_err(|e| BuildError::ToolUnavailable {
                tool: self.cmake_path.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(BuildError::ToolUnavailable {
                tool: self.cmake_path.clone(),
                reason: format!("`cmake --version` exited with {}", output.status),
            });
        }

        let version = ToolVersion::parse(&String::from_utf8_lossy(&output.stdout));
        crate::debug!("Found {}", version.raw);
        Ok(version)
    }

    /// Delete and recreate the build directory
    pub fn prepare_build_dir(&self, build_dir: &Path) -> Result<()> {
        reset_dir(build_dir)
    }

    /// Configure and build the static library in `build_dir`, then copy it
    /// to `artifact_dest`.
    ///
    /// `build_dir` must be a direct child of the solver source tree and must
    /// already exist (see [`prepare_build_dir`](Self::prepare_build_dir)).
    pub fn build(
        &self,
        build_dir: &Path,
        config: &BuildConfiguration,
        profile: &PlatformProfile,
        artifact_dest: &Path,
    ) -> Result<BuildOutcome> {
        let start_time = Instant::now();
        let mut output_buffer = Vec::new();

        // Step 1: Run cmake to configure
        let mut cmd = Command::new(&self.cmake_path);
        cmd.args(config.flags())
            .arg("-G")
            .arg(&profile.generator)
            .arg("..")
            .current_dir(build_dir);
        self.run_step(BuildStep::Configure, &mut cmd, &mut output_buffer)?;

        // Step 2: Run cmake --build for the static library target
        let mut cmd = Command::new(&self.cmake_path);
        cmd.arg("--build")
            .arg(".")
            .arg("--target")
            .arg(&self.target)
            .args(&profile.build_flags)
            .current_dir(build_dir);
        self.run_step(BuildStep::Build, &mut cmd, &mut output_buffer)?;

        // Step 3: Copy the library next to the extension sources
        let artifact = artifact_source(build_dir, profile);
        if !artifact.is_file() {
            return Err(BuildError::ArtifactMissing { path: artifact });
        }
        if let Some(parent) = artifact_dest.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::staging(parent, e))?;
        }
        fs::copy(&artifact, artifact_dest).map_err(|e| BuildError::staging(artifact_dest, e))?;
        crate::debug!(
            "Copied {} to {}",
            artifact.display(),
            artifact_dest.display()
        );

        Ok(BuildOutcome {
            artifact: artifact_dest.to_path_buf(),
            duration: start_time.elapsed(),
            output: String::from_utf8_lossy(&output_buffer).to_string(),
        })
    }

    fn run_step(&self, step: BuildStep, cmd: &mut Command, output_buffer: &mut Vec<u8>) -> Result<()> {
        crate::debug!("Running CMake {step}: {cmd:?}");

        let output: Output = cmd.output().map_err(|e| BuildError::ToolUnavailable {
            tool: self.cmake_path.clone(),
            reason: format!("failed to execute cmake {step}: {e}"),
        })?;

        if self.verbose {
            print!("{}", String::from_utf8_lossy(&output.stdout));
            eprint!("{}", String::from_utf8_lossy(&output.stderr));
        }
        output_buffer.extend_from_slice(&output.stdout);
        output_buffer.extend_from_slice(&output.stderr);

        if !output.status.success() {
            return Err(BuildError::ExternalBuildFailure {
                step,
                code: output.status.code(),
                output: String::from_utf8_lossy(output_buffer).to_string(),
            });
        }
        Ok(())
    }
}

/// `<build>/out[/<subdir>]/<artifact>`
#[must_use]
pub fn artifact_source(build_dir: &Path, profile: &PlatformProfile) -> PathBuf {
    let mut path = build_dir.join("out");
    if let Some(subdir) = &profile.artifact_subdir {
        path.push(subdir);
    }
    path.join(&profile.artifact_name)
}
