//! Environment variable overrides.
//!
//! Anything set here wins over `rlqp-build.toml` and the built-in defaults.

use std::env;
use std::path::PathBuf;

// Helper for boolean environment variables that accept "1", "true", "yes"
fn is_enabled(var: &str) -> bool {
    env::var(var).ok().is_some_and(|s| {
        let s = s.to_lowercase();
        s == "1" || s == "true" || s == "yes"
    })
}

// Empty values are treated as unset
fn non_empty_path(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Check if debug output was requested (`RLQP_BUILD_DEBUG`).
pub fn debug_requested() -> bool {
    is_enabled("RLQP_BUILD_DEBUG")
}

/// Get explicit `CMake` executable (`CMAKE`).
pub fn cmake() -> Option<PathBuf> {
    non_empty_path("CMAKE")
}

/// Get Python interpreter used to locate optional dependencies (`PYTHON`).
pub fn python() -> Option<PathBuf> {
    non_empty_path("PYTHON")
}

/// Get torch's `CMake` prefix path (`TORCH_CMAKE_PREFIX_PATH`).
///
/// Same value as `torch.utils.cmake_prefix_path`.
pub fn torch_cmake_prefix() -> Option<PathBuf> {
    non_empty_path("TORCH_CMAKE_PREFIX_PATH")
}

/// Get numpy header directory (`NUMPY_INCLUDE_DIR`).
pub fn numpy_include() -> Option<PathBuf> {
    non_empty_path("NUMPY_INCLUDE_DIR")
}

/// Get Python header directory (`PYTHON_INCLUDE_DIR`).
pub fn python_include() -> Option<PathBuf> {
    non_empty_path("PYTHON_INCLUDE_DIR")
}
