//! Codegen source bundle staging
//!
//! Copies the subset of solver sources needed to compile a generated solver
//! on its own into `module/codegen/sources`:
//!
//! ```text
//! sources/
//!   src/        solver + QDLDL .c/.cpp files, src/CMakeLists.txt
//!   include/    solver + QDLDL headers, include/CMakeLists.txt
//!   configure/  osqp_configure.h.in, qdldl_types.h.in
//! ```
//!
//! Every run replaces the bundle entirely. Files from different source roots
//! are copied flat into the same destination directory.

use crate::error::{BuildError, Result};
use crate::layout::ProjectLayout;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File names never staged, whatever directory they come from.
///
/// Alternate linear-system backends, the Ctrl-C handler, solution polishing,
/// linear-system dispatch, and the two headers generated from `configure/`
/// templates.
pub const DENY_LIST: &[&str] = &[
    "cs.c",
    "cs.h",
    "ctrlc.c",
    "ctrlc.h",
    "polish.c",
    "polish.h",
    "lin_sys.c",
    "lin_sys.h",
    "qdldl_types.h",
    "osqp_configure.h",
];

/// Check whether a bare file name is excluded from staging
#[must_use]
pub fn is_denied(file_name: &str) -> bool {
    DENY_LIST.contains(&file_name)
}

/// Extension allow-list for one destination subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    extensions: &'static [&'static str],
}

impl FileFilter {
    /// C and C++ translation units
    pub const SOURCES: Self = Self {
        extensions: &["c", "cpp"],
    };

    /// C headers
    pub const HEADERS: Self = Self {
        extensions: &["h"],
    };

    /// Accept a file if its extension is allowed and its name is not denied
    #[must_use]
    pub fn accepts(&self, file_name: &str) -> bool {
        let allowed = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext));

        allowed && !is_denied(file_name)
    }
}

/// One file selected for staging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Directory the file is read from
    pub root: PathBuf,
    /// Bare file name, also its name in the bundle
    pub file_name: String,
}

impl ManifestEntry {
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.file_name)
    }
}

/// Ordered list of files to copy into one destination directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceManifest {
    entries: Vec<ManifestEntry>,
}

impl SourceManifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every file directly inside `root` accepted by `filter`, by name.
    ///
    /// Subdirectories are not descended into.
    pub fn collect(&mut self, root: &Path, filter: FileFilter) -> Result<&mut Self> {
        for file_name in list_files(root)? {
            if filter.accepts(&file_name) {
                self.entries.push(ManifestEntry {
                    root: root.to_path_buf(),
                    file_name,
                });
            } else {
                crate::debug!("Skipping {}", root.join(&file_name).display());
            }
        }
        Ok(self)
    }

    /// Add a single file unconditionally
    pub fn push_file(&mut self, path: &Path) -> Result<&mut Self> {
        let (Some(root), Some(file_name)) = (path.parent(), path.file_name()) else {
            return Err(BuildError::staging(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
            ));
        };

        self.entries.push(ManifestEntry {
            root: root.to_path_buf(),
            file_name: file_name.to_string_lossy().into_owned(),
        });
        Ok(self)
    }

    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sorted names of the regular files directly inside `dir`
fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if entry.file_type().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Files directly inside `dir` with extension `ext`, sorted, as full paths
pub fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    Ok(list_files(dir)?
        .into_iter()
        .filter(|name| Path::new(name).extension().is_some_and(|e| e == std::ffi::OsStr::new(ext)))
        .map(|name| dir.join(name))
        .collect())
}

fn walk_error(dir: &Path, err: walkdir::Error) -> BuildError {
    let path = err.path().unwrap_or(dir).to_path_buf();
    BuildError::staging(path, std::io::Error::from(err))
}

/// Delete `dir` if it exists, then create it empty
pub fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        crate::debug!("Removing {}", dir.display());
        fs::remove_dir_all(dir).map_err(|e| BuildError::staging(dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| BuildError::staging(dir, e))
}

/// Copy every manifest entry into `dest`, flat
fn copy_into(manifest: &SourceManifest, dest: &Path) -> Result<usize> {
    let mut seen = BTreeSet::new();
    for entry in manifest.entries() {
        if !seen.insert(entry.file_name.as_str()) {
            crate::debug!(
                "{} overwrites a file of the same name in {}",
                entry.path().display(),
                dest.display()
            );
        }
        let from = entry.path();
        fs::copy(&from, dest.join(&entry.file_name)).map_err(|e| BuildError::staging(from, e))?;
    }
    Ok(manifest.len())
}

/// Everything that goes into the codegen bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenBundle {
    pub src: SourceManifest,
    pub include: SourceManifest,
    pub configure: SourceManifest,
    /// Copied into `src/` after the filtered files
    pub src_cmake_lists: PathBuf,
    /// Copied into `include/` after the filtered files
    pub include_cmake_lists: PathBuf,
}

impl CodegenBundle {
    /// List the bundle contents for `layout`. Reads directories, writes nothing.
    pub fn plan(layout: &ProjectLayout) -> Result<Self> {
        let solver_src = layout.sources_dir.join("src");
        let solver_include = layout.sources_dir.join("include");
        let qdldl_dir = layout.qdldl_dir();
        let qdldl_sources = layout.qdldl_sources_dir();

        let mut src = SourceManifest::new();
        src.collect(&solver_src, FileFilter::SOURCES)?
            .collect(&qdldl_dir, FileFilter::SOURCES)?
            .collect(&qdldl_sources.join("src"), FileFilter::SOURCES)?;

        let mut include = SourceManifest::new();
        include
            .collect(&solver_include, FileFilter::HEADERS)?
            .collect(&qdldl_dir, FileFilter::HEADERS)?
            .collect(&qdldl_sources.join("include"), FileFilter::HEADERS)?;

        let mut configure = SourceManifest::new();
        configure
            .push_file(&layout.sources_dir.join("configure").join("osqp_configure.h.in"))?
            .push_file(&qdldl_sources.join("configure").join("qdldl_types.h.in"))?;

        let bundle = Self {
            src,
            include,
            configure,
            src_cmake_lists: solver_src.join("CMakeLists.txt"),
            include_cmake_lists: solver_include.join("CMakeLists.txt"),
        };

        // Fixed files are not listed from a directory, so check them here
        for entry in bundle.configure.entries() {
            require_file(&entry.path())?;
        }
        require_file(&bundle.src_cmake_lists)?;
        require_file(&bundle.include_cmake_lists)?;

        Ok(bundle)
    }

    /// Replace `dest` with a fresh copy of the bundle
    pub fn write(&self, dest: &Path) -> Result<StageReport> {
        reset_dir(dest)?;

        let mut files = 0;
        let src_dir = dest.join("src");
        reset_dir(&src_dir)?;
        files += copy_into(&self.src, &src_dir)?;

        let include_dir = dest.join("include");
        reset_dir(&include_dir)?;
        files += copy_into(&self.include, &include_dir)?;

        let configure_dir = dest.join("configure");
        reset_dir(&configure_dir)?;
        files += copy_into(&self.configure, &configure_dir)?;

        for (cmake_lists, dir) in [
            (&self.src_cmake_lists, &src_dir),
            (&self.include_cmake_lists, &include_dir),
        ] {
            fs::copy(cmake_lists, dir.join("CMakeLists.txt"))
                .map_err(|e| BuildError::staging(cmake_lists.as_path(), e))?;
            files += 1;
        }

        Ok(StageReport {
            dest: dest.to_path_buf(),
            files,
            fingerprint: fingerprint(dest)?,
        })
    }
}

fn require_file(path: &Path) -> Result<()> {
    fs::metadata(path)
        .map(|_| ())
        .map_err(|e| BuildError::staging(path, e))
}

/// Summary of a staging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub dest: PathBuf,
    /// Number of copy operations performed
    pub files: usize,
    /// SHA-256 of the staged tree, see [`fingerprint`]
    pub fingerprint: String,
}

/// Stage the codegen bundle of `layout` into its codegen directory.
///
/// The source tree is listed before anything is deleted, so a broken source
/// tree leaves the previous bundle in place. A codegen directory overlapping
/// the project inputs is rejected before anything is touched.
pub fn stage_codegen_sources(layout: &ProjectLayout) -> Result<StageReport> {
    layout.check_codegen_dir()?;
    let bundle = CodegenBundle::plan(layout)?;
    crate::debug!(
        "Staging {} sources, {} headers, {} templates into {}",
        bundle.src.len(),
        bundle.include.len(),
        bundle.configure.len(),
        layout.codegen_dir.display()
    );
    bundle.write(&layout.codegen_dir)
}

/// Hex SHA-256 over the relative paths and contents of every file in `dir`.
///
/// Files are visited in sorted order and paths use `/`, so equal trees give
/// equal fingerprints on every platform.
pub fn fingerprint(dir: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let contents = fs::read(entry.path()).map_err(|e| BuildError::staging(entry.path(), e))?;

        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update((contents.len() as u64).to_le_bytes());
        hasher.update(&contents);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
