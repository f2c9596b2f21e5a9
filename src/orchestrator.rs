//! Build orchestration
//!
//! Runs the phases in order, stopping at the first error:
//!
//! 1. stage the codegen source bundle
//! 2. recreate the `CMake` build directory
//! 3. probe for `CMake`
//! 4. assemble configure flags (first use of the optional dependencies)
//! 5. configure, build, copy the static library
//! 6. assemble the extension descriptor and package manifest

use crate::build_config::{BuildConfiguration, BuildOptions};
use crate::cmake::{BuildOutcome, CMakeInvoker, ToolVersion};
use crate::config::Config;
use crate::deps::{DependencyResolver, ResolvedDependencies};
use crate::descriptor::{DescriptorInputs, ExtensionDescriptor, artifact_destination};
use crate::error::Result;
use crate::layout::ProjectLayout;
use crate::package::PackageManifest;
use crate::platform::PlatformProfile;
use crate::staging::{StageReport, files_with_extension, stage_codegen_sources};

/// Everything produced by a full build
#[derive(Debug)]
pub struct BuildReport {
    pub stage: StageReport,
    pub tool_version: ToolVersion,
    pub configuration: BuildConfiguration,
    pub outcome: BuildOutcome,
    pub manifest: PackageManifest,
}

/// Sequencing of the build phases for one project
#[derive(Debug, Clone)]
pub struct Orchestrator {
    layout: ProjectLayout,
    config: Config,
    profile: PlatformProfile,
    options: BuildOptions,
}

impl Orchestrator {
    #[must_use]
    pub const fn new(
        layout: ProjectLayout,
        config: Config,
        profile: PlatformProfile,
        options: BuildOptions,
    ) -> Self {
        Self {
            layout,
            config,
            profile,
            options,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    #[must_use]
    pub const fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    /// Stage the codegen bundle only. Needs neither `CMake` nor Python.
    pub fn stage(&self) -> Result<StageReport> {
        stage_codegen_sources(&self.layout)
    }

    /// `CMake` configure flags for this build
    pub fn configuration(&self, resolver: &dyn DependencyResolver) -> Result<BuildConfiguration> {
        BuildConfiguration::assemble(self.options, resolver)
    }

    /// Extension descriptor, assuming the static library is (or will be) in place
    pub fn descriptor(&self, resolver: &dyn DependencyResolver) -> Result<ExtensionDescriptor> {
        let dependencies = ResolvedDependencies::resolve(resolver)?;
        let sources = files_with_extension(&self.layout.extension_src_dir(), "c")?;

        Ok(ExtensionDescriptor::assemble(DescriptorInputs {
            name: self.config.extension_name(),
            layout: &self.layout,
            profile: &self.profile,
            options: self.options,
            dependencies: &dependencies,
            sources: &sources,
        }))
    }

    /// Run every phase
    pub fn run(
        &self,
        resolver: &dyn DependencyResolver,
        invoker: &CMakeInvoker,
        passthrough_args: Vec<String>,
    ) -> Result<BuildReport> {
        let stage = self.stage()?;
        crate::debug!(
            "Staged {} files into {} ({})",
            stage.files,
            stage.dest.display(),
            stage.fingerprint
        );

        let build_dir = self.layout.build_dir();
        invoker.prepare_build_dir(&build_dir)?;
        let tool_version = invoker.probe()?;

        let configuration = self.configuration(resolver)?;
        let artifact_dest = artifact_destination(&self.layout, &self.profile);
        let outcome = invoker.build(&build_dir, &configuration, &self.profile, &artifact_dest)?;
        crate::debug::debug_log(&format!(
            "Static library built in {:.1}s",
            outcome.duration.as_secs_f64()
        ));

        let descriptor = self.descriptor(resolver)?;
        let manifest = PackageManifest::new(descriptor, passthrough_args);

        Ok(BuildReport {
            stage,
            tool_version,
            configuration,
            outcome,
            manifest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::FixedResolver;
    use crate::error::BuildError;
    use crate::platform::{PointerWidth, TargetOs};
    use std::fs;
    use tempfile::TempDir;

    fn orchestrator(root: &std::path::Path) -> Orchestrator {
        Orchestrator::new(
            ProjectLayout::new(root),
            Config::default(),
            PlatformProfile::new(TargetOs::Linux, PointerWidth::Bits64),
            BuildOptions::default(),
        )
    }

    #[test]
    fn missing_sources_fail_before_build_dir_exists() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(dir.path());
        let invoker = CMakeInvoker::new(dir.path().join("no-cmake"), "rlqpstatic", false);

        let err = orch
            .run(&FixedResolver::none(), &invoker, vec![])
            .unwrap_err();

        assert!(matches!(err, BuildError::FilesystemStaging { .. }));
        assert!(!orch.layout().build_dir().exists());
    }

    #[test]
    fn descriptor_lists_extension_sources() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(dir.path());
        let src = orch.layout().extension_src_dir();
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("_rlqpmodule.c"), "").unwrap();
        fs::write(src.join("librlqp.a"), "").unwrap();

        let resolver = FixedResolver {
            torch_cmake_prefix: Some("/site/torch/share/cmake".into()),
            numpy_include: Some("/site/numpy/include".into()),
            python_include: None,
        };
        let descriptor = orch.descriptor(&resolver).unwrap();

        assert_eq!(descriptor.sources, [src.join("_rlqpmodule.c")]);
        assert_eq!(descriptor.extra_objects, [src.join("librlqp.a")]);
    }
}
