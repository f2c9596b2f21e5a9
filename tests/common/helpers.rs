//! Shared test helpers and utilities

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get the path to the rlqp-build binary built for this test run
#[allow(dead_code)]
pub(crate) fn get_rlqp_build_binary() -> String {
    env!("CARGO_BIN_EXE_rlqp-build").to_string()
}

/// Files of the fixture source tree, relative to the project root
const FIXTURE_FILES: &[&str] = &[
    "rlqp_sources/src/osqp.c",
    "rlqp_sources/src/auxil.c",
    "rlqp_sources/src/rl_policy.cpp",
    "rlqp_sources/src/cs.c",
    "rlqp_sources/src/ctrlc.c",
    "rlqp_sources/src/polish.c",
    "rlqp_sources/src/lin_sys.c",
    "rlqp_sources/src/CMakeLists.txt",
    "rlqp_sources/src/README.md",
    "rlqp_sources/include/osqp.h",
    "rlqp_sources/include/auxil.h",
    "rlqp_sources/include/cs.h",
    "rlqp_sources/include/ctrlc.h",
    "rlqp_sources/include/polish.h",
    "rlqp_sources/include/lin_sys.h",
    "rlqp_sources/include/qdldl_types.h",
    "rlqp_sources/include/osqp_configure.h",
    "rlqp_sources/include/CMakeLists.txt",
    "rlqp_sources/configure/osqp_configure.h.in",
    "rlqp_sources/lin_sys/direct/qdldl/qdldl_interface.c",
    "rlqp_sources/lin_sys/direct/qdldl/qdldl_interface.h",
    "rlqp_sources/lin_sys/direct/qdldl/polish.c",
    "rlqp_sources/lin_sys/direct/qdldl/qdldl_sources/src/qdldl.c",
    "rlqp_sources/lin_sys/direct/qdldl/qdldl_sources/include/qdldl.h",
    "rlqp_sources/lin_sys/direct/qdldl/qdldl_sources/include/qdldl_types.h",
    "rlqp_sources/lin_sys/direct/qdldl/qdldl_sources/configure/qdldl_types.h.in",
    "extension/src/_rlqpmodule.c",
    "extension/include/osqpobjectpy.h",
];

/// Create a project root with a small solver source tree.
///
/// Every file contains its own relative path, so copies can be traced back.
pub(crate) fn create_fixture_project() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for relative in FIXTURE_FILES {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        fs::write(&path, format!("/* {relative} */\n")).expect("Failed to write fixture file");
    }
    dir
}

/// Sorted relative paths of all files under `dir`, `/`-separated
#[allow(dead_code)]
pub(crate) fn list_tree(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    files.sort();
    files
}

/// Static library location produced by the fake `cmake` for POSIX profiles
#[cfg(unix)]
#[allow(dead_code)]
pub(crate) const POSIX_ARTIFACT: &str = "out/librlqp.a";

/// Static library location produced by the fake `cmake` for Windows profiles
#[cfg(unix)]
#[allow(dead_code)]
pub(crate) const WINDOWS_ARTIFACT: &str = "out/Release/rlqp.lib";

/// Write an executable fake `cmake` into `dir`.
///
/// It answers `--version`, records configure arguments in `configure.args`
/// inside the working directory, and for `--build` records its arguments in
/// `build.args` and writes `artifact` (relative to the build directory).
/// `configure_exit` / `build_exit` select the exit status of each step.
#[cfg(unix)]
#[allow(dead_code)]
pub(crate) fn write_fake_cmake(
    dir: &Path,
    artifact: &str,
    configure_exit: i32,
    build_exit: i32,
) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "--version" ]; then
    echo "cmake version 3.28.3"
    exit 0
fi
if [ "$1" = "--build" ]; then
    echo "$@" > build.args
    if [ {build_exit} -ne 0 ]; then
        echo "make: *** [rlqpstatic] Error {build_exit}" >&2
        exit {build_exit}
    fi
    mkdir -p "$(dirname '{artifact}')"
    echo "static library" > '{artifact}'
    exit 0
fi
for arg in "$@"; do
    echo "$arg" >> configure.args
done
if [ {configure_exit} -ne 0 ]; then
    echo "CMake Error: could not find Torch" >&2
    exit {configure_exit}
fi
echo "-- Configuring done"
"#
    );

    let path = dir.join("fake-cmake");
    fs::write(&path, script).expect("Failed to write fake cmake");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to mark fake cmake executable");
    path
}
