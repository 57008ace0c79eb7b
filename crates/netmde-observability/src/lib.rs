// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # netmde-observability
//!
//! Logging setup shared by the netmde crates, with per-crate debug flags.
//!
//! ## Features
//! - `file-logging`: per-run log folders with one JSON file per crate

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known netmde crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "netmde",
    "netmde-config",
    "netmde-embedding",
    "netmde-graph",
    "netmde-observability",
];

/// Tracing target of a crate: its module path root (`netmde-graph` -> `netmde_graph`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
