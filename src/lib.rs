//! rlqp-build internal library code
//!
//! Builds the RLQP solver's static library with `CMake`, stages the codegen
//! source bundle and describes the Python extension module for packaging.

pub mod build_config;
pub mod cli_args;
pub mod cmake;
pub mod config;
pub mod debug;
pub mod deps;
pub mod descriptor;
pub mod env_vars;
pub mod error;
pub mod layout;
pub mod orchestrator;
pub mod package;
pub mod platform;
pub mod staging;

// Re-export common types for convenience
pub use build_config::{BuildConfiguration, BuildOptions};
pub use cli_args::{MARKER, MarkerFlags, SplitArgs, split_marker_args};
pub use cmake::{BuildOutcome, CMakeInvoker, ToolVersion, artifact_source};
pub use config::{CONFIG_FILE_NAME, Config};
pub use debug::{debug_log, init_debug, is_debug_enabled};
pub use deps::{DependencyResolver, FixedResolver, PythonResolver, ResolvedDependencies};
pub use descriptor::{DescriptorInputs, ExtensionDescriptor, MacroDefinition};
pub use error::{BuildError, BuildStep};
pub use layout::ProjectLayout;
pub use orchestrator::{BuildReport, Orchestrator};
pub use package::PackageManifest;
pub use platform::{PlatformProfile, PointerWidth, TargetOs};
pub use staging::{
    CodegenBundle, DENY_LIST, FileFilter, SourceManifest, StageReport, fingerprint,
    stage_codegen_sources,
};
