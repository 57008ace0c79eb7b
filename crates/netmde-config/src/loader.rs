// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones winning:
//! 1. TOML file (base values, defaults for anything missing)
//! 2. Environment variables (`NETMDE_*`)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, NetmdeConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable pointing at an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "NETMDE_CONFIG_PATH";

/// Find the netmde configuration file
///
/// Search order:
/// 1. `NETMDE_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|path| path.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::FileNotFound(format!(
        "netmde configuration file '{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is separate, see [`validate_config`](crate::validate_config).
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NetmdeConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NetmdeConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

fn set_parsed<T: FromStr>(slot: &mut T, value: &str) {
    if let Ok(parsed) = value.parse::<T>() {
        *slot = parsed;
    }
}

/// Apply one `key = value` override; unknown keys and unparsable values are ignored
fn apply_override(config: &mut NetmdeConfig, key: &str, value: &str) {
    match key {
        "log_level" => config.system.log_level = value.to_string(),
        "debug_crates" => {
            config.system.debug_crates = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        "repr_dim" => set_parsed(&mut config.embedding.repr_dim, value),
        "n_iterations" => set_parsed(&mut config.embedding.n_iterations, value),
        "attraction_step" => set_parsed(&mut config.embedding.attraction_step, value),
        "repulsion_step" => set_parsed(&mut config.embedding.repulsion_step, value),
        "max_repulsion_iterations" => {
            set_parsed(&mut config.embedding.max_repulsion_iterations, value)
        }
        "negative_step" => set_parsed(&mut config.embedding.negative_step, value),
        "negative_fraction" => set_parsed(&mut config.embedding.negative_fraction, value),
        "seed" => {
            if let Ok(seed) = value.parse::<u64>() {
                config.embedding.seed = Some(seed);
            }
        }
        "connection_probability" => {
            set_parsed(&mut config.random_network.connection_probability, value)
        }
        "max_dist" => set_parsed(&mut config.random_network.max_dist, value),
        "log_format" => config.logging.format = value.to_string(),
        "file_logging" => config.logging.file_logging = parse_flag(value),
        "log_dir" => config.logging.log_dir = value.to_string(),
        _ => {}
    }
}

/// Keys accepted by both override tiers (environment name is `NETMDE_<KEY>`)
pub const OVERRIDE_KEYS: &[&str] = &[
    "log_level",
    "debug_crates",
    "repr_dim",
    "n_iterations",
    "attraction_step",
    "repulsion_step",
    "max_repulsion_iterations",
    "negative_step",
    "negative_fraction",
    "seed",
    "connection_probability",
    "max_dist",
    "log_format",
    "file_logging",
    "log_dir",
];

/// Apply environment variable overrides to configuration
///
/// Each key of [`OVERRIDE_KEYS`] is read from `NETMDE_<KEY>`, e.g.
/// `NETMDE_REPR_DIM=3` or `NETMDE_SEED=42`.
pub fn apply_environment_overrides(config: &mut NetmdeConfig) {
    for key in OVERRIDE_KEYS {
        if let Ok(value) = env::var(format!("NETMDE_{}", key.to_uppercase())) {
            apply_override(config, key, &value);
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of override keys to values (e.g., `{"repr_dim": "3", "seed": "7"}`)
pub fn apply_cli_overrides(config: &mut NetmdeConfig, cli_args: &HashMap<String, String>) {
    for key in OVERRIDE_KEYS {
        if let Some(value) = cli_args.get(*key) {
            apply_override(config, key, value);
        }
    }
}
