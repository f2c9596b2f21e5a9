//! Platform detection and build profiles
//!
//! Maps the host operating system and pointer width to everything the
//! external build needs to know about the platform: the `CMake` generator,
//! extra `cmake --build` flags, and where the static library ends up.

use serde::Serialize;
use std::env;
use std::fmt;

/// Operating systems with a distinct build policy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Windows,
    Linux,
    #[serde(rename = "macos")]
    MacOs,
    /// Anything else. Built like Linux/macOS.
    Other(String),
}

impl TargetOs {
    /// Map an OS name (as in `std::env::consts::OS`) to a target.
    ///
    /// Matching is case-insensitive; `darwin` is accepted for macOS.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            "macos" | "darwin" => Self::MacOs,
            other => Self::Other(other.to_string()),
        }
    }

    /// Host operating system.
    ///
    /// Prints a warning when the host is not one of the known systems, since
    /// the POSIX profile is then assumed rather than known to work.
    #[must_use]
    pub fn host() -> Self {
        let os = Self::from_name(env::consts::OS);
        if let Self::Other(name) = &os {
            crate::debug::warn(&format!(
                "unrecognized operating system '{name}', assuming a Unix Makefiles toolchain"
            ));
        }
        os
    }

    #[must_use]
    pub const fn is_windows(&self) -> bool {
        matches!(self, Self::Windows)
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => f.write_str("windows"),
            Self::Linux => f.write_str("linux"),
            Self::MacOs => f.write_str("macos"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Pointer width of the Python interpreter the extension is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PointerWidth {
    #[serde(rename = "32")]
    Bits32,
    #[serde(rename = "64")]
    Bits64,
}

impl PointerWidth {
    /// Pointer width of the running binary
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(target_pointer_width = "64") {
            Self::Bits64
        } else {
            Self::Bits32
        }
    }

    /// Parse `32` or `64`
    #[must_use]
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            32 => Some(Self::Bits32),
            64 => Some(Self::Bits64),
            _ => None,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }
}

/// Platform-dependent part of the external build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformProfile {
    pub os: TargetOs,
    pub pointer_width: PointerWidth,
    /// Value for `cmake -G`
    pub generator: String,
    /// Extra arguments for `cmake --build`
    pub build_flags: Vec<String>,
    /// File name of the static library produced by the build
    pub artifact_name: String,
    /// Subdirectory of `<build>/out` holding the library, if any
    pub artifact_subdir: Option<String>,
}

impl PlatformProfile {
    /// Profile for `os` and `pointer_width`. Pure; no detection happens here.
    #[must_use]
    pub fn new(os: TargetOs, pointer_width: PointerWidth) -> Self {
        if os.is_windows() {
            let generator = match pointer_width {
                PointerWidth::Bits64 => "Visual Studio 14 2015 Win64",
                PointerWidth::Bits32 => "Visual Studio 14 2015",
            };
            return Self {
                os,
                pointer_width,
                generator: generator.to_string(),
                build_flags: vec!["--config".to_string(), "Release".to_string()],
                artifact_name: "rlqp.lib".to_string(),
                artifact_subdir: Some("Release".to_string()),
            };
        }

        Self {
            os,
            pointer_width,
            generator: "Unix Makefiles".to_string(),
            build_flags: Vec::new(),
            artifact_name: "librlqp.a".to_string(),
            artifact_subdir: None,
        }
    }

    /// Profile of the machine we are running on
    #[must_use]
    pub fn host() -> Self {
        Self::new(TargetOs::host(), PointerWidth::host())
    }
}
