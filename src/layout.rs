//! Project layout
//!
//! Fixed locations inside the RLQP Python package: the solver sources, the
//! bundled QDLDL linear-system solver, the extension sources and the codegen
//! bundle destination. All paths are rooted at the project directory, so the
//! process working directory never matters.

use crate::config::{CONFIG_FILE_NAME, Config};
use crate::error::{BuildError, Result};
use std::path::{Component, Path, PathBuf};

/// Resolved project paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root (directory holding `rlqp_sources/`, `extension/`, `module/`)
    pub root: PathBuf,
    /// Solver source tree (`rlqp_sources`)
    pub sources_dir: PathBuf,
    /// Python extension tree (`extension`)
    pub extension_dir: PathBuf,
    /// Codegen bundle destination (`module/codegen/sources`)
    pub codegen_dir: PathBuf,
}

impl ProjectLayout {
    /// Default layout rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(root, &Config::default())
    }

    /// Layout rooted at `root` with directory overrides from `config`
    #[must_use]
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Self {
        let root = root.into();
        let pick = |value: Option<&PathBuf>, default: PathBuf| {
            root.join(value.cloned().unwrap_or(default))
        };

        Self {
            sources_dir: pick(config.sources_dir.as_ref(), PathBuf::from("rlqp_sources")),
            extension_dir: pick(config.extension_dir.as_ref(), PathBuf::from("extension")),
            codegen_dir: pick(
                config.codegen_dir.as_ref(),
                Path::new("module").join("codegen").join("sources"),
            ),
            root,
        }
    }

    /// Scratch directory for the external build (`rlqp_sources/build`)
    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.sources_dir.join("build")
    }

    /// Bundled QDLDL interface directory
    #[must_use]
    pub fn qdldl_dir(&self) -> PathBuf {
        self.sources_dir.join("lin_sys").join("direct").join("qdldl")
    }

    /// QDLDL library sources shipped inside the interface directory
    #[must_use]
    pub fn qdldl_sources_dir(&self) -> PathBuf {
        self.qdldl_dir().join("qdldl_sources")
    }

    /// Extension C sources; the static library is copied here as well
    #[must_use]
    pub fn extension_src_dir(&self) -> PathBuf {
        self.extension_dir.join("src")
    }

    /// Auxiliary extension headers
    #[must_use]
    pub fn extension_include_dir(&self) -> PathBuf {
        self.extension_dir.join("include")
    }

    /// Reject a codegen directory that staging would delete along with
    /// project inputs.
    ///
    /// The bundle directory is wiped on every run, so it must not contain the
    /// project root, and must neither contain nor sit inside the solver or
    /// extension trees.
    pub fn check_codegen_dir(&self) -> Result<()> {
        let codegen = lexical_absolute(&self.codegen_dir)?;

        let root = lexical_absolute(&self.root)?;
        if root.starts_with(&codegen) {
            return Err(self.overlap_error("the project root"));
        }

        for (name, dir) in [
            ("sources_dir", &self.sources_dir),
            ("extension_dir", &self.extension_dir),
        ] {
            let dir = lexical_absolute(dir)?;
            if dir.starts_with(&codegen) || codegen.starts_with(&dir) {
                return Err(self.overlap_error(name));
            }
        }
        Ok(())
    }

    fn overlap_error(&self, what: &str) -> BuildError {
        BuildError::Config {
            path: self.root.join(CONFIG_FILE_NAME),
            reason: format!(
                "codegen_dir {} overlaps {what}; staging replaces that directory entirely",
                self.codegen_dir.display()
            ),
        }
    }
}

/// Absolute form of `path` with `.` and `..` folded away, without touching
/// the filesystem
fn lexical_absolute(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| BuildError::staging(path, e))?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
