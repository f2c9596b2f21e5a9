//! Configuration file management
//!
//! Reads the optional `rlqp-build.toml` from the project root. Every key is
//! optional; missing keys fall back to the layout of the RLQP Python package.
//! Environment variables (see [`crate::env_vars`]) override file values.

use crate::error::{BuildError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the project root
pub const CONFIG_FILE_NAME: &str = "rlqp-build.toml";

/// Build configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Solver source tree, relative to the project root
    #[serde(default)]
    pub sources_dir: Option<PathBuf>,

    /// Python extension sources (`src/`, `include/`)
    #[serde(default)]
    pub extension_dir: Option<PathBuf>,

    /// Destination of the codegen source bundle
    #[serde(default)]
    pub codegen_dir: Option<PathBuf>,

    /// Dotted name of the compiled extension module
    #[serde(default)]
    pub extension_name: Option<String>,

    /// `CMake` target producing the static library
    #[serde(default)]
    pub target: Option<String>,

    /// Python interpreter queried for optional dependencies
    #[serde(default)]
    pub python: Option<PathBuf>,

    /// `CMake` executable
    #[serde(default)]
    pub cmake: Option<PathBuf>,

    /// Explicit `torch.utils.cmake_prefix_path`
    #[serde(default)]
    pub torch_cmake_prefix: Option<PathBuf>,

    /// Explicit numpy header directory
    #[serde(default)]
    pub numpy_include: Option<PathBuf>,

    /// Explicit Python header directory
    #[serde(default)]
    pub python_include: Option<PathBuf>,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| BuildError::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load `rlqp-build.toml` from `root`, or defaults if it does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            crate::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, root.display());
            return Ok(Self::default().with_env_overrides());
        }

        let content = fs::read_to_string(&path).map_err(|e| BuildError::Config {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        crate::debug!("Loaded configuration from {}", path.display());
        Ok(Self::parse(&content, &path)?.with_env_overrides())
    }

    /// Apply environment variable overrides on top of file values
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(cmake) = crate::env_vars::cmake() {
            self.cmake = Some(cmake);
        }
        if let Some(python) = crate::env_vars::python() {
            self.python = Some(python);
        }
        if let Some(prefix) = crate::env_vars::torch_cmake_prefix() {
            self.torch_cmake_prefix = Some(prefix);
        }
        if let Some(dir) = crate::env_vars::numpy_include() {
            self.numpy_include = Some(dir);
        }
        if let Some(dir) = crate::env_vars::python_include() {
            self.python_include = Some(dir);
        }
        self
    }

    /// Extension module name, defaulting to `rlqp._rlqp`
    #[must_use]
    pub fn extension_name(&self) -> &str {
        self.extension_name.as_deref().unwrap_or("rlqp._rlqp")
    }

    /// `CMake` target, defaulting to `rlqpstatic`
    #[must_use]
    pub fn target(&self) -> &str {
        self.target.as_deref().unwrap_or("rlqpstatic")
    }
}
