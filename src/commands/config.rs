// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - read or write keys in the config file

use anyhow::{anyhow, Result};
use std::path::Path;

use crate::config::{self, KEYS};

/// Get a key (no value) or set it
pub fn run(config_file: Option<&Path>, key: &str, value: Option<String>) -> Result<()> {
    let path = config::config_path(config_file)
        .ok_or_else(|| anyhow!("No config directory available; pass --config"))?;

    match value {
        Some(v) => {
            tracing::info!("Setting {} = {}", key, v);
            config::set_value(&path, key, &v)?;
            println!("{key} = {v}");
        }
        None => {
            tracing::debug!("Getting {} from {}", key, path.display());
            match config::get_value(&path, key)? {
                Some(v) => println!("{v}"),
                None => println!("{key} is not set in {} (known keys: {})", path.display(), KEYS.join(", ")),
            }
        }
    }
    Ok(())
}
