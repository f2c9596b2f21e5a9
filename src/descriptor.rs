//! Extension module descriptor
//!
//! Everything the compile/link step needs to build the Python extension:
//! include and library search paths, libraries, macros, the static solver
//! library produced by `CMake`, compiler flags and interface sources.
//! Assembly is pure; all paths are resolved by earlier phases.

use crate::build_config::BuildOptions;
use crate::deps::ResolvedDependencies;
use crate::layout::ProjectLayout;
use crate::platform::{PlatformProfile, TargetOs};
use serde::Serialize;
use std::path::PathBuf;

/// Preprocessor macro, `-DNAME` or `-DNAME=VALUE`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroDefinition {
    pub name: String,
    pub value: Option<String>,
}

impl MacroDefinition {
    /// Macro defined without a value
    #[must_use]
    pub fn flag(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }
}

/// Inputs of [`ExtensionDescriptor::assemble`]
#[derive(Debug, Clone, Copy)]
pub struct DescriptorInputs<'a> {
    pub name: &'a str,
    pub layout: &'a ProjectLayout,
    pub profile: &'a PlatformProfile,
    pub options: BuildOptions,
    pub dependencies: &'a ResolvedDependencies,
    /// Extension `.c` files to compile
    pub sources: &'a [PathBuf],
}

/// Final compile/link specification of the extension module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionDescriptor {
    /// Dotted module name (`rlqp._rlqp`)
    pub name: String,
    pub include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
    pub libraries: Vec<String>,
    pub define_macros: Vec<MacroDefinition>,
    /// Linked verbatim, in order
    pub extra_objects: Vec<PathBuf>,
    pub extra_compile_args: Vec<String>,
    pub sources: Vec<PathBuf>,
}

impl ExtensionDescriptor {
    /// Aggregate the outputs of the earlier phases
    #[must_use]
    pub fn assemble(inputs: DescriptorInputs<'_>) -> Self {
        let DescriptorInputs {
            name,
            layout,
            profile,
            options,
            dependencies,
            sources,
        } = inputs;

        let qdldl_dir = layout.qdldl_dir();
        let mut include_dirs = Vec::new();
        for dir in [
            layout.sources_dir.join("include"),
            qdldl_dir.clone(),
            qdldl_dir.join("qdldl_sources").join("include"),
            layout.extension_include_dir(),
            dependencies.numpy_include.clone(),
        ] {
            push_unique(&mut include_dirs, dir);
        }

        let mut libraries = Vec::new();
        match profile.os {
            TargetOs::Linux => libraries.push("rt".to_string()),
            // The stdio functions moved out of the default CRT in VS 2015
            TargetOs::Windows => libraries.push("legacy_stdio_definitions".to_string()),
            TargetOs::MacOs | TargetOs::Other(_) => {}
        }
        libraries.extend(["torch".to_string(), "c10".to_string()]);

        let mut extra_compile_args = Vec::new();
        if !profile.os.is_windows() {
            extra_compile_args.push("-O3".to_string());
        }
        if options.debug {
            extra_compile_args.push("-g".to_string());
        }

        let mut unique_sources = Vec::new();
        for source in sources {
            push_unique(&mut unique_sources, source.clone());
        }

        Self {
            name: name.to_string(),
            include_dirs,
            library_dirs: vec![dependencies.torch_library_dir.clone()],
            libraries,
            define_macros: vec![MacroDefinition::flag("PYTHON")],
            extra_objects: vec![artifact_destination(layout, profile)],
            extra_compile_args,
            sources: unique_sources,
        }
    }
}

/// Where the static solver library is copied for linking
#[must_use]
pub fn artifact_destination(layout: &ProjectLayout, profile: &PlatformProfile) -> PathBuf {
    layout.extension_src_dir().join(&profile.artifact_name)
}

fn push_unique(list: &mut Vec<PathBuf>, path: PathBuf) {
    if !list.contains(&path) {
        list.push(path);
    }
}
