//! Profile command
//!
//! Display the platform build profile

use anyhow::{Context, Result};
use rlqp_build::{PlatformProfile, PointerWidth, TargetOs};

/// Display the build profile for the host, or for an explicit platform
pub(crate) fn run(os: Option<&str>, pointer_width: Option<u32>, json: bool) -> Result<()> {
    let os = os.map_or_else(TargetOs::host, TargetOs::from_name);
    let pointer_width = match pointer_width {
        Some(bits) => PointerWidth::from_bits(bits)
            .with_context(|| format!("Unsupported pointer width {bits}, expected 32 or 64"))?,
        None => PointerWidth::host(),
    };

    let profile = PlatformProfile::new(os, pointer_width);

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("Platform Profile:");
    println!();
    println!("  OS:            {}", profile.os);
    println!("  Pointer width: {}-bit", profile.pointer_width.bits());
    println!("  Generator:     {}", profile.generator);
    println!(
        "  Build flags:   {}",
        if profile.build_flags.is_empty() {
            "(none)".to_string()
        } else {
            profile.build_flags.join(" ")
        }
    );
    println!("  Artifact:      {}", profile.artifact_name);
    println!(
        "  Output subdir: {}",
        profile.artifact_subdir.as_deref().unwrap_or("(none)")
    );

    Ok(())
}
