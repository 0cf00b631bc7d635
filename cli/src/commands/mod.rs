/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod applications;
pub mod base;
pub mod job_scripts;
pub mod job_submissions;
pub mod job_templates;

use anyhow::{Context, Result};
use clap::{Args, arg};
use connector::ListParams;
use std::fs;
use std::path::Path;

/// Paging and filtering shared by every `list` command.
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Show only resources owned by you.
    #[arg(long)]
    pub user_only: bool,
    /// Include resources without an identifier.
    #[arg(long)]
    pub all: bool,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub sort_field: Option<String>,
    #[arg(long)]
    pub descending: bool,
    #[arg(long, default_value_t = 0)]
    pub start: u64,
    #[arg(long, default_value_t = 50)]
    pub limit: u64,
}

impl From<ListArgs> for ListParams {
    fn from(args: ListArgs) -> Self {
        ListParams {
            user_only: args.user_only,
            include_null_identifier: args.all,
            search: args.search,
            sort_field: args.sort_field,
            sort_ascending: args.descending.then_some(false),
            start: Some(args.start),
            limit: Some(args.limit),
        }
    }
}

pub(crate) fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let content =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .with_context(|| format!("{} has no file name", path.display()))?;

    Ok((filename, content))
}

/// Writes a downloaded file, or prints it when no target is given.
pub(crate) fn write_download(content: Vec<u8>, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved {}", path.display());
        }
        None => print!("{}", String::from_utf8_lossy(&content)),
    }

    Ok(())
}
