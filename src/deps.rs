//! Optional native dependency resolution
//!
//! The extension links against torch and compiles against numpy and the
//! Python headers. Locating them means running the Python interpreter, which
//! may not have these packages installed. Nothing here runs until a caller
//! actually asks for a path, so commands that never need them (staging the
//! codegen bundle, printing the platform profile) work without them.

use crate::config::Config;
use crate::error::{BuildError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// Source of optional dependency locations
pub trait DependencyResolver {
    /// `torch.utils.cmake_prefix_path` (e.g. `.../torch/share/cmake`)
    fn torch_cmake_prefix(&self) -> Result<PathBuf>;

    /// numpy's C header directory (`numpy.get_include()`)
    fn numpy_include_dir(&self) -> Result<PathBuf>;

    /// Python's C header directory
    fn python_include_dir(&self) -> Result<PathBuf>;

    /// Directory holding `TorchConfig.cmake`, passed as `Torch_DIR`
    fn torch_config_dir(&self) -> Result<PathBuf> {
        Ok(self.torch_cmake_prefix()?.join("Torch"))
    }

    /// Directory holding `libtorch` and `libc10`
    fn torch_library_dir(&self) -> Result<PathBuf> {
        let prefix = self.torch_cmake_prefix()?;
        torch_library_dir_for(&prefix)
    }
}

/// `<prefix>/../../lib`, i.e. `torch/lib` for `torch/share/cmake`
pub fn torch_library_dir_for(cmake_prefix: &Path) -> Result<PathBuf> {
    cmake_prefix
        .parent()
        .and_then(Path::parent)
        .map(|torch_root| torch_root.join("lib"))
        .ok_or_else(|| {
            BuildError::missing(
                "torch",
                format!(
                    "cmake prefix path {} has no installation root",
                    cmake_prefix.display()
                ),
            )
        })
}

const TORCH_PREFIX_QUERY: &str = "import torch; print(torch.utils.cmake_prefix_path)";
const NUMPY_INCLUDE_QUERY: &str = "import numpy; print(numpy.get_include())";
const PYTHON_INCLUDE_QUERY: &str = "import sysconfig; print(sysconfig.get_paths()['include'])";

/// Resolver asking a Python interpreter, with explicit overrides.
///
/// Each lookup runs at most once; both successes and failures are cached, so
/// a missing package is reported the same way every time it is needed.
#[derive(Debug, Default)]
pub struct PythonResolver {
    /// Interpreter override; otherwise `python3` then `python` on `PATH`
    python: Option<PathBuf>,
    torch_prefix_override: Option<PathBuf>,
    numpy_include_override: Option<PathBuf>,
    python_include_override: Option<PathBuf>,
    torch_prefix: OnceLock<std::result::Result<PathBuf, String>>,
    numpy_include: OnceLock<std::result::Result<PathBuf, String>>,
    python_include: OnceLock<std::result::Result<PathBuf, String>>,
}

impl PythonResolver {
    /// Resolver honoring the interpreter and path overrides of `config`
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            python: config.python.clone(),
            torch_prefix_override: config.torch_cmake_prefix.clone(),
            numpy_include_override: config.numpy_include.clone(),
            python_include_override: config.python_include.clone(),
            ..Self::default()
        }
    }

    fn find_python(&self) -> std::result::Result<PathBuf, String> {
        if let Some(python) = &self.python {
            return Ok(python.clone());
        }

        ["python3", "python"]
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| "no Python interpreter found in PATH (set PYTHON)".to_string())
    }

    fn query(&self, script: &str) -> std::result::Result<PathBuf, String> {
        let python = self.find_python()?;
        crate::debug!("Running {} -c \"{}\"", python.display(), script);

        let output = Command::new(&python)
            .arg("-c")
            .arg(script)
            .output()
            .map_err(|e| format!("failed to run {}: {e}", python.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().last().unwrap_or("").trim().to_string();
            return Err(if last_line.is_empty() {
                format!("{} exited with {}", python.display(), output.status)
            } else {
                last_line
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let value = stdout.trim();
        if value.is_empty() {
            return Err(format!("{} printed no path", python.display()));
        }
        Ok(PathBuf::from(value))
    }

    fn lookup(
        &self,
        name: &str,
        cell: &OnceLock<std::result::Result<PathBuf, String>>,
        overridden: Option<&PathBuf>,
        script: &str,
    ) -> Result<PathBuf> {
        cell.get_or_init(|| {
            overridden.map_or_else(|| self.query(script), |path| Ok(path.clone()))
        })
        .clone()
        .map_err(|reason| BuildError::missing(name, reason))
    }
}

impl DependencyResolver for PythonResolver {
    fn torch_cmake_prefix(&self) -> Result<PathBuf> {
        let first_use = self.torch_prefix.get().is_none();
        let prefix = self.lookup(
            "torch",
            &self.torch_prefix,
            self.torch_prefix_override.as_ref(),
            TORCH_PREFIX_QUERY,
        )?;
        if first_use {
            eprintln!("Using Torch_DIR={}", prefix.join("Torch").display());
        }
        Ok(prefix)
    }

    fn numpy_include_dir(&self) -> Result<PathBuf> {
        self.lookup(
            "numpy",
            &self.numpy_include,
            self.numpy_include_override.as_ref(),
            NUMPY_INCLUDE_QUERY,
        )
    }

    fn python_include_dir(&self) -> Result<PathBuf> {
        self.lookup(
            "Python headers",
            &self.python_include,
            self.python_include_override.as_ref(),
            PYTHON_INCLUDE_QUERY,
        )
    }
}

/// Resolver with fixed answers.
///
/// A `None` field behaves like a dependency that is not installed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedResolver {
    pub torch_cmake_prefix: Option<PathBuf>,
    pub numpy_include: Option<PathBuf>,
    pub python_include: Option<PathBuf>,
}

impl FixedResolver {
    /// Resolver for which every dependency is missing
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    fn get(value: Option<&PathBuf>, name: &str) -> Result<PathBuf> {
        value
            .cloned()
            .ok_or_else(|| BuildError::missing(name, "not installed"))
    }
}

impl DependencyResolver for FixedResolver {
    fn torch_cmake_prefix(&self) -> Result<PathBuf> {
        Self::get(self.torch_cmake_prefix.as_ref(), "torch")
    }

    fn numpy_include_dir(&self) -> Result<PathBuf> {
        Self::get(self.numpy_include.as_ref(), "numpy")
    }

    fn python_include_dir(&self) -> Result<PathBuf> {
        Self::get(self.python_include.as_ref(), "Python headers")
    }
}

/// Dependency paths needed by the extension descriptor, resolved up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependencies {
    pub numpy_include: PathBuf,
    pub torch_library_dir: PathBuf,
}

impl ResolvedDependencies {
    /// Resolve everything the descriptor needs. Fails on the first missing one.
    pub fn resolve(resolver: &dyn DependencyResolver) -> Result<Self> {
        Ok(Self {
            numpy_include: resolver.numpy_include_dir()?,
            torch_library_dir: resolver.torch_library_dir()?,
        })
    }
}
