//! Common test utilities and helpers
//!
//! This module provides shared functionality used across integration tests:
//! - Binary path resolution (via `get_rlqp_build_binary`)
//! - Fixture source trees and a fake `cmake` (via `helpers`)

pub(crate) mod helpers;

// Re-export get_rlqp_build_binary for convenient access
#[allow(unused_imports)]
pub(crate) use helpers::get_rlqp_build_binary;
