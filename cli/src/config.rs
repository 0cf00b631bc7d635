/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ConfigKey {
    Server,
    OidcDomain,
    OidcClientId,
    OidcAudience,
    SentryDsn,
}

pub type Config = BTreeMap<ConfigKey, String>;

fn get_config_file() -> Result<PathBuf> {
    let mut config_dir =
        dirs::config_dir().ok_or_else(|| anyhow!("Could not find configuration directory"))?;
    config_dir.push("jobbergate");
    config_dir.push("config.toml");
    Ok(config_dir)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).context("Failed to parse configuration file")
}

pub fn load_config() -> Result<Config> {
    let config_file = get_config_file()?;
    if !config_file.exists() {
        return Ok(Config::new());
    }

    let contents = fs::read_to_string(&config_file).with_context(|| {
        format!(
            "Failed to read configuration file {}",
            config_file.display()
        )
    })?;

    parse_config(&contents)
}

pub fn save_config(config: &Config) -> Result<()> {
    let config_file = get_config_file()?;
    if let Some(config_dir) = config_file.parent() {
        fs::create_dir_all(config_dir).context("Failed to create configuration directory")?;
    }

    let contents = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    fs::write(&config_file, contents).context("Failed to write configuration file")
}

pub fn get_value(key: ConfigKey) -> Result<Option<String>> {
    Ok(load_config()?.get(&key).cloned())
}

/// Prints the current value when `value` is `None`, otherwise stores it.
pub fn set_get_value_from_string(key: &str, value: Option<String>) -> Result<()> {
    let config_key = key.parse::<ConfigKey>().map_err(|_| {
        let valid = ConfigKey::iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        anyhow!("Invalid key: {}. Valid keys are: {}", key, valid)
    })?;

    let mut config = load_config()?;

    match value {
        Some(value) if value.is_empty() => {
            config.remove(&config_key);
            save_config(&config)?;
            println!("{} unset", config_key);
        }
        Some(value) => {
            println!("{} set to \"{}\"", config_key, value);
            config.insert(config_key, value);
            save_config(&config)?;
        }
        None => match config.get(&config_key) {
            Some(value) => println!("{}", value),
            None => println!("[unset]"),
        },
    }

    Ok(())
}
