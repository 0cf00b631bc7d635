/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::{ListArgs, read_upload, write_download};
use crate::config::load_config;
use crate::input::*;
use crate::output::{OutputFormat, render_list, render_single};
use crate::render::*;
use anyhow::{Result, anyhow};
use clap::{Subcommand, arg};
use connector::job_scripts::{
    self, JobScriptFilter, MakeJobScriptRequest, PatchJobScriptRequest, RenderFromTemplateRequest,
    RenderRequest,
};
use connector::job_templates;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;

const COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "owner_email",
    "parent_template_id",
    "application_id",
];
const FILE_COLUMNS: &[&str] = &["id", "filename", "file_type", "updated_at"];

#[derive(Subcommand, Debug)]
pub enum Commands {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        from_template_id: Option<i32>,
    },
    Get { id: i32 },
    /// Create an empty job script; attach files with `upload-file`.
    Create {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short = 'c', long)]
        description: Option<String>,
        #[arg(short, long)]
        application_id: Option<i32>,
    },
    /// Render a job script from a template.
    Render {
        /// Template id or identifier.
        template: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short = 'c', long)]
        description: Option<String>,
        /// JSON file whose values override the template defaults.
        #[arg(short, long)]
        param_file: Option<PathBuf>,
        /// Extra `#SBATCH` parameters, e.g. `--partition=debug`.
        #[arg(short, long, allow_hyphen_values = true)]
        sbatch_params: Vec<String>,
        /// Accept the defaults without prompting.
        #[arg(short, long)]
        fast: bool,
    },
    Update {
        id: i32,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short = 'c', long)]
        description: Option<String>,
    },
    Delete { id: i32 },
    UploadFile {
        id: i32,
        file: PathBuf,
        #[arg(short = 't', long, default_value = "ENTRYPOINT")]
        file_type: String,
    },
    GetFile {
        id: i32,
        filename: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    DeleteFile { id: i32, filename: String },
}

fn ask_params(
    defaults: &Map<String, Value>,
    file: &Map<String, Value>,
    fast: bool,
) -> Result<Map<String, Value>> {
    let mut answers = Map::new();

    if fast {
        return Ok(answers);
    }

    for (key, default) in questions(defaults, file) {
        let answer = ask_with_default(key, Some(&display_default(default)))?;
        answers.insert(key.clone(), answer_value(&answer, default));
    }

    Ok(answers)
}

pub async fn handle(cmd: Commands, format: OutputFormat) -> Result<()> {
    let config = get_request_config(&load_config()?).await?;

    match cmd {
        Commands::List {
            list,
            from_template_id,
        } => {
            let filter = JobScriptFilter { from_template_id };
            let page = job_scripts::get(&config, &list.into(), &filter).await?;
            render_list(&page, COLUMNS, format)
        }

        Commands::Get { id } => {
            let job_script = job_scripts::get_job_script(&config, id).await?;
            render_single(&job_script, COLUMNS, format)?;

            if !format.raw {
                for file in &job_script.files {
                    render_single(file, FILE_COLUMNS, format)?;
                }
            }

            Ok(())
        }

        Commands::Create {
            name,
            description,
            application_id,
        } => {
            let name = match name {
                Some(name) => name,
                None => ask_for_input("Name")?,
            };

            let req = MakeJobScriptRequest {
                name,
                description,
                application_id,
            };

            let job_script = job_scripts::post(&config, &req).await?;
            tracing::info!(id = job_script.id, "Job script created");
            render_single(&job_script, COLUMNS, format)
        }

        Commands::Render {
            template,
            name,
            description,
            param_file,
            sbatch_params,
            fast,
        } => {
            let job_template = job_templates::get_template(&config, &template).await?;

            let defaults = match &job_template.template_vars {
                Value::Object(vars) => vars.clone(),
                Value::Null => Map::new(),
                _ => return Err(anyhow!("Template variables of {} are not an object", template)),
            };
            let file = match &param_file {
                Some(path) => load_param_file(path)?,
                None => Map::new(),
            };

            let answers = ask_params(&defaults, &file, fast)?;
            let param_dict = merge_params(&defaults, &file, answers);

            let req = RenderFromTemplateRequest {
                create_request: MakeJobScriptRequest {
                    name: name.unwrap_or_else(|| job_template.name.clone()),
                    description,
                    application_id: None,
                },
                render_request: RenderRequest {
                    template_output_name_mapping: HashMap::new(),
                    sbatch_params,
                    param_dict,
                },
            };

            let job_script =
                job_scripts::post_render_from_template(&config, &template, &req).await?;
            tracing::info!(
                id = job_script.id,
                template = job_template.id,
                "Job script rendered"
            );
            render_single(&job_script, COLUMNS, format)
        }

        Commands::Update {
            id,
            name,
            description,
        } => {
            let req = PatchJobScriptRequest { name, description };
            let job_script = job_scripts::put_job_script(&config, id, &req).await?;
            render_single(&job_script, COLUMNS, format)
        }

        Commands::Delete { id } => {
            let message = job_scripts::delete_job_script(&config, id).await?;
            println!("{}", message);
            Ok(())
        }

        Commands::UploadFile {
            id,
            file,
            file_type,
        } => {
            let (filename, content) = read_upload(&file)?;
            let file = job_scripts::put_job_script_file(
                &config,
                id,
                &file_type.to_uppercase(),
                &filename,
                content,
            )
            .await?;
            render_single(&file, FILE_COLUMNS, format)
        }

        Commands::GetFile {
            id,
            filename,
            output,
        } => {
            let content = job_scripts::get_job_script_file(&config, id, &filename).await?;
            write_download(content, output.as_deref())
        }

        Commands::DeleteFile { id, filename } => {
            let message = job_scripts::delete_job_script_file(&config, id, &filename).await?;
            println!("{}", message);
            Ok(())
        }
    }
}
