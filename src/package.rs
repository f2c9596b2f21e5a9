//! Package manifest
//!
//! The hand-off to the packaging tool: package metadata, the list of Python
//! packages and their directories, the extension descriptor and whatever
//! arguments the user meant for the packaging tool.

use crate::descriptor::ExtensionDescriptor;
use crate::error::{BuildError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Distribution name
pub const PACKAGE_NAME: &str = "rlqp";

/// Distribution version
pub const PACKAGE_VERSION: &str = "0.6.2.post0.alpha0";

/// Python packages shipped in the distribution
pub const PACKAGES: &[&str] = &["rlqp", "rlqp.codegen", "rlqp.tests", "rlqppurepy"];

/// Everything the packaging step consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub license: String,
    pub packages: Vec<String>,
    /// Package name to source directory
    pub package_dir: BTreeMap<String, String>,
    pub ext_modules: Vec<ExtensionDescriptor>,
    /// Arguments forwarded unmodified to the packaging tool
    pub passthrough_args: Vec<String>,
}

impl PackageManifest {
    /// Manifest for the RLQP distribution around `extension`
    #[must_use]
    pub fn new(extension: ExtensionDescriptor, passthrough_args: Vec<String>) -> Self {
        let package_dir = [("rlqp", "module"), ("rlqppurepy", "modulepurepy")]
            .into_iter()
            .map(|(name, dir)| (name.to_string(), dir.to_string()))
            .collect();

        Self {
            name: PACKAGE_NAME.to_string(),
            version: PACKAGE_VERSION.to_string(),
            license: "Apache 2.0".to_string(),
            packages: PACKAGES.iter().map(ToString::to_string).collect(),
            package_dir,
            ext_modules: vec![extension],
            passthrough_args,
        }
    }

    /// Pretty JSON rendering
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the manifest as JSON, creating parent directories
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::staging(parent, e))?;
        }
        fs::write(path, json + "\n").map_err(|e| BuildError::staging(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MacroDefinition;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn descriptor() -> ExtensionDescriptor {
        ExtensionDescriptor {
            name: "rlqp._rlqp".to_string(),
            include_dirs: vec![PathBuf::from("rlqp_sources/include")],
            library_dirs: vec![],
            libraries: vec!["torch".to_string()],
            define_macros: vec![MacroDefinition::flag("PYTHON")],
            extra_objects: vec![PathBuf::from("extension/src/librlqp.a")],
            extra_compile_args: vec!["-O3".to_string()],
            sources: vec![],
        }
    }

    #[test]
    fn lists_packages_and_dirs() {
        let manifest = PackageManifest::new(descriptor(), vec![]);
        assert_eq!(manifest.packages, PACKAGES);
        assert_eq!(
            manifest.package_dir.get("rlqppurepy").map(String::as_str),
            Some("modulepurepy")
        );
    }

    #[test]
    fn json_contains_extension_and_passthrough() {
        let manifest = PackageManifest::new(descriptor(), vec!["--inplace".to_string()]);
        let json: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();

        assert_eq!(json["ext_modules"][0]["name"], "rlqp._rlqp");
        assert_eq!(json["ext_modules"][0]["define_macros"][0]["name"], "PYTHON");
        assert!(json["ext_modules"][0]["define_macros"][0]["value"].is_null());
        assert_eq!(json["passthrough_args"][0], "--inplace");
    }

    #[test]
    fn writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build").join("rlqp-extension.json");
        PackageManifest::new(descriptor(), vec![]).write(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"version\": \"0.6.2.post0.alpha0\""));
    }
}
