//! Subcommand implementations

pub(crate) mod build;
pub(crate) mod completion;
pub(crate) mod flags;
pub(crate) mod profile;
pub(crate) mod stage;

use anyhow::{Context, Result};
use rlqp_build::{Config, ProjectLayout};
use std::path::Path;

/// Load `rlqp-build.toml` and resolve the project layout under `root`
pub(crate) fn load_project(root: &Path) -> Result<(Config, ProjectLayout)> {
    let config = Config::load(root)
        .with_context(|| format!("Failed to load configuration from {}", root.display()))?;
    let layout = ProjectLayout::from_config(root, &config);
    Ok((config, layout))
}
