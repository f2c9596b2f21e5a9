mod common;

use common::helpers::create_fixture_project;
use rlqp_build::{
    BuildError, BuildOptions, CMakeInvoker, Config, FixedResolver, Orchestrator,
    PlatformProfile, PointerWidth, ProjectLayout, TargetOs,
};
use std::path::Path;

fn linux_orchestrator(root: &Path, options: BuildOptions) -> Orchestrator {
    Orchestrator::new(
        ProjectLayout::new(root),
        Config::default(),
        PlatformProfile::new(TargetOs::Linux, PointerWidth::Bits64),
        options,
    )
}

#[test]
fn missing_cmake_stops_after_build_dir_reset() {
    let project = create_fixture_project();
    let orch = linux_orchestrator(project.path(), BuildOptions::default());
    let invoker = CMakeInvoker::new(project.path().join("no-cmake"), "rlqpstatic", false);

    // No dependencies installed: the tool check must come first
    let err = orch
        .run(&FixedResolver::none(), &invoker, vec![])
        .unwrap_err();

    assert!(matches!(err, BuildError::ToolUnavailable { .. }));
    assert!(err.to_string().contains("CMake must be installed"));

    let build_dir = orch.layout().build_dir();
    assert!(build_dir.is_dir());
    assert_eq!(std::fs::read_dir(&build_dir).unwrap().count(), 0);
    assert!(orch.layout().codegen_dir.join("src").join("osqp.c").exists());
    assert!(!orch.layout().extension_src_dir().join("librlqp.a").exists());
}

#[test]
fn staging_never_touches_dependencies() {
    let project = create_fixture_project();
    let orch = linux_orchestrator(project.path(), BuildOptions::default());

    let report = orch.stage().unwrap();
    assert!(report.files > 0);
}

#[cfg(unix)]
mod with_fake_cmake {
    use super::*;
    use crate::common::helpers::{POSIX_ARTIFACT, WINDOWS_ARTIFACT, write_fake_cmake};
    use rlqp_build::BuildStep;
    use std::fs;
    use std::path::PathBuf;

    fn installed() -> FixedResolver {
        FixedResolver {
            torch_cmake_prefix: Some(PathBuf::from("/site/torch/share/cmake")),
            numpy_include: Some(PathBuf::from("/site/numpy/include")),
            python_include: Some(PathBuf::from("/usr/include/python3.11")),
        }
    }

    #[test]
    fn builds_and_copies_artifact() {
        let project = create_fixture_project();
        let cmake = write_fake_cmake(project.path(), POSIX_ARTIFACT, 0, 0);
        let orch = linux_orchestrator(project.path(), BuildOptions::default());
        let invoker = CMakeInvoker::new(&cmake, "rlqpstatic", false);

        let report = orch
            .run(&installed(), &invoker, vec!["--inplace".to_string()])
            .unwrap();

        let artifact = orch.layout().extension_src_dir().join("librlqp.a");
        assert_eq!(report.outcome.artifact, artifact);
        assert_eq!(fs::read_to_string(&artifact).unwrap(), "static library\n");
        assert_eq!(report.tool_version.raw, "cmake version 3.28.3");

        // The build keeps its own copy for cached rebuilds
        assert!(orch.layout().build_dir().join("out").join("librlqp.a").exists());

        let extension = report.manifest.ext_modules.first().unwrap();
        assert_eq!(extension.extra_objects, [artifact]);
        assert_eq!(report.manifest.passthrough_args, ["--inplace"]);
    }

    #[test]
    fn configure_receives_flags_generator_and_parent_dir() {
        let project = create_fixture_project();
        let cmake = write_fake_cmake(project.path(), POSIX_ARTIFACT, 0, 0);
        let orch = linux_orchestrator(project.path(), BuildOptions::default());
        let invoker = CMakeInvoker::new(&cmake, "rlqpstatic", false);

        orch.run(&installed(), &invoker, vec![]).unwrap();

        let build_dir = orch.layout().build_dir();
        let configure_args = fs::read_to_string(build_dir.join("configure.args")).unwrap();
        let configure_args: Vec<&str> = configure_args.lines().collect();
        assert_eq!(
            configure_args,
            [
                "-DUNITTESTS=OFF",
                "-DPYTHON=ON",
                "-DDLONG=OFF",
                "-DPYTHON_INCLUDE_DIRS=/usr/include/python3.11",
                "-DTorch_DIR=/site/torch/share/cmake/Torch",
                "-DCMAKE_BUILD_TYPE=Release",
                "-G",
                "Unix Makefiles",
                "..",
            ]
        );

        let build_args = fs::read_to_string(build_dir.join("build.args")).unwrap();
        assert_eq!(build_args.trim(), "--build . --target rlqpstatic");
    }

    #[test]
    fn failing_configure_is_fatal() {
        let project = create_fixture_project();
        let cmake = write_fake_cmake(project.path(), POSIX_ARTIFACT, 1, 0);
        let orch = linux_orchestrator(project.path(), BuildOptions::default());
        let invoker = CMakeInvoker::new(&cmake, "rlqpstatic", false);

        let err = orch.run(&installed(), &invoker, vec![]).unwrap_err();

        assert!(matches!(
            err,
            BuildError::ExternalBuildFailure {
                step: BuildStep::Configure,
                code: Some(1),
                ..
            }
        ));
        assert!(err.to_string().contains("could not find Torch"));
        assert!(!orch.layout().build_dir().join("build.args").exists());
        assert!(!orch.layout().extension_src_dir().join("librlqp.a").exists());
    }

    #[test]
    fn failing_build_does_not_copy_stale_artifact() {
        let project = create_fixture_project();
        let cmake = write_fake_cmake(project.path(), POSIX_ARTIFACT, 0, 2);
        let orch = linux_orchestrator(project.path(), BuildOptions::default());
        let invoker = CMakeInvoker::new(&cmake, "rlqpstatic", false);

        let stale = orch.layout().extension_src_dir().join("librlqp.a");
        fs::write(&stale, "previous build").unwrap();

        let err = orch.run(&installed(), &invoker, vec![]).unwrap_err();

        assert!(matches!(
            err,
            BuildError::ExternalBuildFailure {
                step: BuildStep::Build,
                code: Some(2),
                ..
            }
        ));
        assert_eq!(fs::read_to_string(&stale).unwrap(), "previous build");
    }

    #[test]
    fn missing_torch_fails_after_tool_probe() {
        let project = create_fixture_project();
        let cmake = write_fake_cmake(project.path(), POSIX_ARTIFACT, 0, 0);
        let orch = linux_orchestrator(project.path(), BuildOptions::default());
        let invoker = CMakeInvoker::new(&cmake, "rlqpstatic", false);

        let resolver = FixedResolver {
            torch_cmake_prefix: None,
            ..installed()
        };
        let err = orch.run(&resolver, &invoker, vec![]).unwrap_err();

        assert!(matches!(err, BuildError::OptionalDependencyMissing { .. }));
        assert!(!orch.layout().build_dir().join("configure.args").exists());
    }

    #[test]
    fn debug_build_type_and_symbols() {
        let project = create_fixture_project();
        let cmake = write_fake_cmake(project.path(), POSIX_ARTIFACT, 0, 0);
        let options = BuildOptions {
            wide_index: false,
            debug: true,
        };
        let orch = linux_orchestrator(project.path(), options);
        let invoker = CMakeInvoker::new(&cmake, "rlqpstatic", false);

        let report = orch.run(&installed(), &invoker, vec![]).unwrap();

        assert!(report.configuration.contains("-DCMAKE_BUILD_TYPE=Debug"));
        let extension = report.manifest.ext_modules.first().unwrap();
        assert_eq!(extension.extra_compile_args, ["-O3", "-g"]);
    }

    #[test]
    fn windows_profile_builds_release_config_and_copies_lib() {
        let project = create_fixture_project();
        let cmake = write_fake_cmake(project.path(), WINDOWS_ARTIFACT, 0, 0);
        let orch = Orchestrator::new(
            ProjectLayout::new(project.path()),
            Config::default(),
            PlatformProfile::new(TargetOs::Windows, PointerWidth::Bits64),
            BuildOptions::default(),
        );
        let invoker = CMakeInvoker::new(&cmake, "rlqpstatic", false);

        let report = orch.run(&installed(), &invoker, vec![]).unwrap();

        let build_dir = orch.layout().build_dir();
        let build_args = fs::read_to_string(build_dir.join("build.args")).unwrap();
        assert_eq!(
            build_args.trim(),
            "--build . --target rlqpstatic --config Release"
        );

        let configure_args = fs::read_to_string(build_dir.join("configure.args")).unwrap();
        let configure_args: Vec<&str> = configure_args.lines().collect();
        assert!(configure_args.ends_with(&["-G", "Visual Studio 14 2015 Win64", ".."]));

        let artifact = orch.layout().extension_src_dir().join("rlqp.lib");
        assert_eq!(report.outcome.artifact, artifact);
        assert_eq!(fs::read_to_string(&artifact).unwrap(), "static library\n");
        assert!(!orch.layout().extension_src_dir().join("librlqp.a").exists());

        let extension = report.manifest.ext_modules.first().unwrap();
        assert_eq!(extension.extra_objects, [artifact]);
        assert!(extension.extra_compile_args.is_empty());
    }

    #[test]
    fn artifact_in_wrong_place_is_missing() {
        let project = create_fixture_project();
        // POSIX output location while building with the Windows profile
        let cmake = write_fake_cmake(project.path(), POSIX_ARTIFACT, 0, 0);
        let orch = Orchestrator::new(
            ProjectLayout::new(project.path()),
            Config::default(),
            PlatformProfile::new(TargetOs::Windows, PointerWidth::Bits32),
            BuildOptions::default(),
        );
        let invoker = CMakeInvoker::new(&cmake, "rlqpstatic", false);

        let err = orch.run(&installed(), &invoker, vec![]).unwrap_err();

        match err {
            BuildError::ArtifactMissing { path } => {
                assert!(path.ends_with("out/Release/rlqp.lib"));
            }
            other => unreachable!("unexpected error: {other}"),
        }
    }
}
