//! `CMake` configure flags
//!
//! The flag list handed to `cmake` before the source directory. The
//! generator is not part of it: it comes from the [`PlatformProfile`] and is
//! merged in only when the configure step runs. Status notices are written
//! to stderr.
//!
//! [`PlatformProfile`]: crate::platform::PlatformProfile

use crate::deps::DependencyResolver;
use crate::error::Result;
use serde::Serialize;

/// Build switches set on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildOptions {
    /// Use 64-bit integer indices (`--long`). Off for numpy compatibility.
    pub wide_index: bool,
    /// Compile in debug mode (`--debug`)
    pub debug: bool,
}

/// Ordered `-D` flags for the configure step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    flags: Vec<String>,
}

impl BuildConfiguration {
    /// Assemble the configure flags.
    ///
    /// Resolves the Python headers and torch, so this fails with
    /// `OptionalDependencyMissing` if either is unavailable.
    pub fn assemble(options: BuildOptions, resolver: &dyn DependencyResolver) -> Result<Self> {
        let mut config = Self::default();
        config.push("-DUNITTESTS=OFF");
        config.push("-DPYTHON=ON");

        if !options.wide_index {
            eprintln!(
                "Disabling LONG\n\
                 Remove long integers for numpy compatibility. See:\n \
                 - https://github.com/numpy/numpy/issues/5906\n \
                 - https://github.com/ContinuumIO/anaconda-issues/issues/3823\n\
                 You can reenable long integers by passing: --rlqp --long argument.\n"
            );
            config.push("-DDLONG=OFF");
        }

        let python_include = resolver.python_include_dir()?;
        config.push(format!("-DPYTHON_INCLUDE_DIRS={}", python_include.display()));

        let torch_dir = resolver.torch_config_dir()?;
        config.push(format!("-DTorch_DIR={}", torch_dir.display()));

        if options.debug {
            eprintln!("Debug mode");
            config.push("-DCMAKE_BUILD_TYPE=Debug");
        } else {
            eprintln!("Release mode");
            config.push("-DCMAKE_BUILD_TYPE=Release");
        }

        Ok(config)
    }

    fn push(&mut self, flag: impl Into<String>) {
        self.flags.push(flag.into());
    }

    #[must_use]
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Check whether a flag is present verbatim
    #[must_use]
    pub fn contains(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}
