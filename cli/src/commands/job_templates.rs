/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::{ListArgs, read_upload, write_download};
use crate::config::load_config;
use crate::input::*;
use crate::output::{OutputFormat, render_list, render_single};
use crate::render::load_param_file;
use anyhow::{Context, Result};
use clap::{Subcommand, arg};
use connector::job_templates::{self, MakeJobTemplateRequest, PatchJobTemplateRequest};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

const COLUMNS: &[&str] = &["id", "name", "identifier", "description", "owner_email"];
const FILE_COLUMNS: &[&str] = &["id", "filename", "file_type", "updated_at"];

#[derive(Subcommand, Debug)]
pub enum Commands {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one template by id or identifier.
    Get { template: String },
    Create {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        identifier: Option<String>,
        #[arg(short = 'c', long)]
        description: Option<String>,
        /// JSON file with the default template variables.
        #[arg(short, long)]
        template_vars: Option<PathBuf>,
    },
    Update {
        template: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        identifier: Option<String>,
        #[arg(short = 'c', long)]
        description: Option<String>,
        #[arg(short, long)]
        template_vars: Option<PathBuf>,
    },
    Delete { template: String },
    /// Attach a template file (ENTRYPOINT or SUPPORT).
    UploadFile {
        template: String,
        file: PathBuf,
        #[arg(short = 't', long, default_value = "ENTRYPOINT")]
        file_type: String,
    },
    GetFile {
        template: String,
        filename: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    DeleteFile { template: String, filename: String },
    UploadWorkflow {
        template: String,
        file: PathBuf,
        /// JSON file with the runtime configuration.
        #[arg(short, long)]
        runtime_config: Option<PathBuf>,
    },
}

pub async fn handle(cmd: Commands, format: OutputFormat) -> Result<()> {
    let config = get_request_config(&load_config()?).await?;

    match cmd {
        Commands::List { list } => {
            let page = job_templates::get(&config, &list.into()).await?;
            render_list(&page, COLUMNS, format)
        }

        Commands::Get { template } => {
            let template = job_templates::get_template(&config, &template).await?;
            render_single(&template, COLUMNS, format)?;

            if !format.raw {
                for file in &template.template_files {
                    render_single(file, FILE_COLUMNS, format)?;
                }
            }

            Ok(())
        }

        Commands::Create {
            name,
            identifier,
            description,
            template_vars,
        } => {
            let name = match name {
                Some(name) => name,
                None => ask_for_input("Name")?,
            };

            let req = MakeJobTemplateRequest {
                name,
                identifier,
                description,
                template_vars: template_vars
                    .map(|path| load_param_file(&path))
                    .transpose()?
                    .unwrap_or_default(),
            };

            let template = job_templates::post(&config, &req).await?;
            tracing::info!(id = template.id, "Job script template created");
            render_single(&template, COLUMNS, format)
        }

        Commands::Update {
            template,
            name,
            identifier,
            description,
            template_vars,
        } => {
            let req = PatchJobTemplateRequest {
                name,
                identifier,
                description,
                template_vars: template_vars
                    .map(|path| load_param_file(&path))
                    .transpose()?,
            };

            let template = job_templates::put_template(&config, &template, &req).await?;
            render_single(&template, COLUMNS, format)
        }

        Commands::Delete { template } => {
            let message = job_templates::delete_template(&config, &template).await?;
            println!("{}", message);
            Ok(())
        }

        Commands::UploadFile {
            template,
            file,
            file_type,
        } => {
            let (filename, content) = read_upload(&file)?;
            let file = job_templates::put_template_file(
                &config,
                &template,
                &file_type.to_uppercase(),
                &filename,
                content,
            )
            .await?;
            render_single(&file, FILE_COLUMNS, format)
        }

        Commands::GetFile {
            template,
            filename,
            output,
        } => {
            let content = job_templates::get_template_file(&config, &template, &filename).await?;
            write_download(content, output.as_deref())
        }

        Commands::DeleteFile { template, filename } => {
            let message =
                job_templates::delete_template_file(&config, &template, &filename).await?;
            println!("{}", message);
            Ok(())
        }

        Commands::UploadWorkflow {
            template,
            file,
            runtime_config,
        } => {
            let runtime_config = runtime_config
                .map(|path| -> Result<Value> {
                    let raw = fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    serde_json::from_str(&raw)
                        .with_context(|| format!("{} is not valid JSON", path.display()))
                })
                .transpose()?;

            let (filename, content) = read_upload(&file)?;
            let workflow = job_templates::put_workflow_file(
                &config,
                &template,
                &filename,
                content,
                runtime_config.as_ref(),
            )
            .await?;
            render_single(&workflow, &["id", "runtime_config", "updated_at"], format)
        }
    }
}
