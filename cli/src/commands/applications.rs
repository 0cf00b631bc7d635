/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::{ListArgs, read_upload};
use crate::config::load_config;
use crate::input::*;
use crate::output::{OutputFormat, render_list, render_single};
use anyhow::{Context, Result};
use clap::{Subcommand, arg};
use connector::applications::{self, MakeApplicationRequest, PatchApplicationRequest};
use std::fs;
use std::path::PathBuf;

const COLUMNS: &[&str] = &[
    "id",
    "application_name",
    "application_identifier",
    "application_description",
    "application_owner_email",
    "application_uploaded",
];

#[derive(Subcommand, Debug)]
pub enum Commands {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one application by id or identifier.
    Get { application: String },
    Create {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        identifier: Option<String>,
        #[arg(short = 'c', long, default_value = "")]
        description: String,
        /// Python source of the application.
        #[arg(short = 'f', long)]
        application_file: Option<PathBuf>,
        /// YAML configuration of the application.
        #[arg(short = 'C', long)]
        application_config: Option<PathBuf>,
    },
    Update {
        id: i32,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        identifier: Option<String>,
        #[arg(short = 'c', long)]
        description: Option<String>,
        #[arg(short = 'f', long)]
        application_file: Option<PathBuf>,
        #[arg(short = 'C', long)]
        application_config: Option<PathBuf>,
    },
    Delete { id: i32 },
    /// Upload the application archive.
    Upload { id: i32, archive: PathBuf },
    DeleteUpload { id: i32 },
}

fn read_text(path: Option<PathBuf>) -> Result<Option<String>> {
    path.map(|path| {
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    })
    .transpose()
}

pub async fn handle(cmd: Commands, format: OutputFormat) -> Result<()> {
    let config = get_request_config(&load_config()?).await?;

    match cmd {
        Commands::List { list } => {
            let page = applications::get(&config, &list.into()).await?;
            render_list(&page, COLUMNS, format)
        }

        Commands::Get { application } => {
            let application = applications::get_application(&config, &application).await?;
            render_single(&application, COLUMNS, format)
        }

        Commands::Create {
            name,
            identifier,
            description,
            application_file,
            application_config,
        } => {
            let application_name = match name {
                Some(name) => name,
                None => ask_for_input("Name")?,
            };

            let req = MakeApplicationRequest {
                application_name,
                application_identifier: identifier,
                application_description: description,
                application_file: read_text(application_file)?.unwrap_or_default(),
                application_config: read_text(application_config)?.unwrap_or_default(),
            };

            let application = applications::post(&config, &req).await?;
            tracing::info!(id = application.id, "Application created");
            render_single(&application, COLUMNS, format)
        }

        Commands::Update {
            id,
            name,
            identifier,
            description,
            application_file,
            application_config,
        } => {
            let req = PatchApplicationRequest {
                application_name: name,
                application_identifier: identifier,
                application_description: description,
                application_file: read_text(application_file)?,
                application_config: read_text(application_config)?,
            };

            let application = applications::put_application(&config, id, &req).await?;
            render_single(&application, COLUMNS, format)
        }

        Commands::Delete { id } => {
            let message = applications::delete_application(&config, id).await?;
            println!("{}", message);
            Ok(())
        }

        Commands::Upload { id, archive } => {
            let (filename, content) = read_upload(&archive)?;
            let application =
                applications::post_application_upload(&config, id, &filename, content).await?;
            render_single(&application, COLUMNS, format)
        }

        Commands::DeleteUpload { id } => {
            let application = applications::delete_application_upload(&config, id).await?;
            render_single(&application, COLUMNS, format)
        }
    }
}
