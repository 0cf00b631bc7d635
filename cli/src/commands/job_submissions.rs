/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::ListArgs;
use crate::config::load_config;
use crate::input::*;
use crate::output::{OutputFormat, render_list, render_single};
use crate::render::load_param_file;
use anyhow::Result;
use clap::{Subcommand, arg};
use connector::job_submissions::{
    self, JobSubmissionFilter, MakeJobSubmissionRequest, PatchJobSubmissionRequest,
};
use std::path::PathBuf;

const COLUMNS: &[&str] = &[
    "id",
    "name",
    "job_script_id",
    "slurm_job_id",
    "client_id",
    "status",
    "owner_email",
];

#[derive(Subcommand, Debug)]
pub enum Commands {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        from_job_script_id: Option<i32>,
        /// Comma separated slurm job ids.
        #[arg(long)]
        slurm_job_ids: Option<String>,
    },
    Get { id: i32 },
    /// Submit a job script to a cluster.
    Create {
        job_script_id: i32,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short = 'c', long)]
        description: Option<String>,
        #[arg(short, long)]
        execution_directory: Option<String>,
        /// Cluster client id; defaults to the one in your token.
        #[arg(long)]
        client_id: Option<String>,
        /// JSON file with execution parameters.
        #[arg(short = 'p', long)]
        execution_parameters: Option<PathBuf>,
    },
    Update {
        id: i32,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short = 'c', long)]
        description: Option<String>,
        #[arg(short, long)]
        execution_directory: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
    },
    Delete { id: i32 },
}

pub async fn handle(cmd: Commands, format: OutputFormat) -> Result<()> {
    let config = get_request_config(&load_config()?).await?;

    match cmd {
        Commands::List {
            list,
            status,
            from_job_script_id,
            slurm_job_ids,
        } => {
            let filter = JobSubmissionFilter {
                status: status.map(|s| s.to_uppercase()),
                from_job_script_id,
                slurm_job_ids,
            };
            let page = job_submissions::get(&config, &list.into(), &filter).await?;
            render_list(&page, COLUMNS, format)
        }

        Commands::Get { id } => {
            let submission = job_submissions::get_submission(&config, id).await?;
            render_single(&submission, COLUMNS, format)
        }

        Commands::Create {
            job_script_id,
            name,
            description,
            execution_directory,
            client_id,
            execution_parameters,
        } => {
            let name = match name {
                Some(name) => name,
                None => ask_for_input("Name")?,
            };

            let req = MakeJobSubmissionRequest {
                name,
                description,
                job_script_id,
                execution_directory,
                client_id,
                execution_parameters: execution_parameters
                    .map(|path| load_param_file(&path))
                    .transpose()?
                    .unwrap_or_default(),
            };

            let submission = job_submissions::post(&config, &req).await?;
            tracing::info!(id = submission.id, "Job submission created");
            render_single(&submission, COLUMNS, format)
        }

        Commands::Update {
            id,
            name,
            description,
            execution_directory,
            status,
        } => {
            let req = PatchJobSubmissionRequest {
                name,
                description,
                execution_directory,
                status: status.map(|s| s.to_uppercase()),
            };

            let submission = job_submissions::put_submission(&config, id, &req).await?;
            render_single(&submission, COLUMNS, format)
        }

        Commands::Delete { id } => {
            let message = job_submissions::delete_submission(&config, id).await?;
            println!("{}", message);
            Ok(())
        }
    }
}
