/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::file_response;
use crate::authorization::require_permission;
use crate::error::{WebError, WebResult};
use crate::upload::read_upload;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::{Extension, Json};
use chrono::{NaiveDateTime, Utc};
use entity::FileType;
use jobbergate_core::files;
use jobbergate_core::input::{IdOrIdentifier, InputError};
use jobbergate_core::permission::{Identity, Permission};
use jobbergate_core::render::{self, RenderError};
use jobbergate_core::service;
use jobbergate_core::types::*;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MakeJobScriptRequest {
    pub name: String,
    pub description: Option<String>,
    pub application_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RenderRequest {
    #[serde(default)]
    pub template_output_name_mapping: HashMap<String, String>,
    #[serde(default)]
    pub sbatch_params: Vec<String>,
    #[serde(default)]
    pub param_dict: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RenderFromTemplateRequest {
    pub create_request: MakeJobScriptRequest,
    #[serde(default)]
    pub render_request: RenderRequest,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PatchJobScriptRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl PatchJobScriptRequest {
    pub fn apply(self, job_script: MJobScript, now: NaiveDateTime) -> AJobScript {
        let mut ajob_script: AJobScript = job_script.into();

        if let Some(name) = self.name {
            ajob_script.name = Set(name);
        }

        if let Some(description) = self.description {
            ajob_script.description = Set(Some(description));
        }

        ajob_script.updated_at = Set(now);
        ajob_script
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct JobScriptFilter {
    pub from_template_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct JobScriptResponse {
    #[serde(flatten)]
    pub job_script: MJobScript,
    pub files: Vec<MJobScriptFile>,
}

/// A rendered file waiting to be stored.
#[derive(Debug, PartialEq)]
pub struct RenderedFile {
    pub filename: String,
    pub file_type: FileType,
    pub content: String,
}

/// Renders every template file, injecting the sbatch parameters into the entrypoint.
pub fn render_files(
    templates: Vec<(MTemplateFile, Vec<u8>)>,
    request: &RenderRequest,
) -> Result<Vec<RenderedFile>, RenderError> {
    if !templates
        .iter()
        .any(|(file, _)| file.file_type == FileType::Entrypoint)
    {
        return Err(RenderError::MissingEntrypoint);
    }

    let mut output_names = HashSet::new();

    for (file, _) in &templates {
        let name = render::output_name(&request.template_output_name_mapping, &file.filename);

        if !output_names.insert(name.clone()) {
            return Err(RenderError::DuplicateOutput(name));
        }
    }

    templates
        .into_iter()
        .map(|(file, content)| {
            let source = String::from_utf8(content)
                .map_err(|_| RenderError::InvalidUtf8(file.filename.clone()))?;
            let mut rendered =
                render::render_template(&file.filename, &source, &request.param_dict)?;

            if file.file_type == FileType::Entrypoint {
                rendered = render::inject_sbatch_params(&rendered, &request.sbatch_params);
            }

            Ok(RenderedFile {
                filename: render::output_name(
                    &request.template_output_name_mapping,
                    &file.filename,
                ),
                file_type: file.file_type,
                content: rendered,
            })
        })
        .collect()
}

fn new_job_script(
    request: MakeJobScriptRequest,
    owner_email: &str,
    parent_template_id: Option<i32>,
) -> AJobScript {
    let now = Utc::now().naive_utc();

    AJobScript {
        name: Set(request.name),
        description: Set(request.description),
        owner_email: Set(owner_email.to_string()),
        application_id: Set(request.application_id),
        parent_template_id: Set(parent_template_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
    Query(filter): Query<JobScriptFilter>,
) -> WebResult<Json<BaseResponse<Page<MJobScript>>>> {
    require_permission(&identity, Permission::JobScriptsView)?;

    let mut condition = service::list_condition::<EJobScript>(&params, &identity.email);

    if let Some(template_id) = filter.from_template_id {
        condition = condition.add(CJobScript::ParentTemplateId.eq(template_id));
    }

    let page = service::list::<EJobScript, _>(&state.db, &params, condition).await?;

    let res = BaseResponse {
        error: false,
        message: page,
    };

    Ok(Json(res))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<MakeJobScriptRequest>,
) -> WebResult<(StatusCode, Json<BaseResponse<JobScriptResponse>>)> {
    require_permission(&identity, Permission::JobScriptsEdit)?;

    if let Some(application_id) = body.application_id {
        service::get_by_id::<EApplication, _>(&state.db, application_id).await?;
    }

    let job_script = service::create::<EJobScript, _, _>(
        &state.db,
        new_job_script(body, &identity.email, None),
    )
    .await?;

    tracing::info!(id = job_script.id, owner = %identity.email, "Created job script");

    let res = BaseResponse {
        error: false,
        message: JobScriptResponse {
            job_script,
            files: Vec::new(),
        },
    };

    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn post_render_from_template(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id_or_identifier): Path<String>,
    Json(body): Json<RenderFromTemplateRequest>,
) -> WebResult<(StatusCode, Json<BaseResponse<JobScriptResponse>>)> {
    require_permission(&identity, Permission::JobScriptsEdit)?;

    let template = service::get_one::<EJobScriptTemplate, _>(
        &state.db,
        &IdOrIdentifier::coerce(&id_or_identifier),
    )
    .await?;

    let mut templates = Vec::new();

    for file in files::list_template_files(&state.db, template.id).await? {
        let (file, content) =
            files::get_template_file(&state.db, state.store.as_ref(), template.id, &file.filename)
                .await?;
        templates.push((file, content));
    }

    // render everything before touching the database so a failure leaves nothing behind
    let rendered = render_files(templates, &body.render_request)?;

    let txn = state.db.begin().await?;

    let job_script = service::create::<EJobScript, _, _>(
        &txn,
        new_job_script(body.create_request, &identity.email, Some(template.id)),
    )
    .await?;

    let mut job_script_files = Vec::new();

    for file in rendered {
        job_script_files.push(
            files::upsert_job_script_file(
                &txn,
                state.store.as_ref(),
                job_script.id,
                &file.filename,
                file.file_type,
                file.content.into_bytes(),
            )
            .await?,
        );
    }

    txn.commit().await?;

    tracing::info!(
        id = job_script.id,
        template_id = template.id,
        files = job_script_files.len(),
        "Rendered job script from template"
    );

    let res = BaseResponse {
        error: false,
        message: JobScriptResponse {
            job_script,
            files: job_script_files,
        },
    };

    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn get_job_script(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> WebResult<Json<BaseResponse<JobScriptResponse>>> {
    require_permission(&identity, Permission::JobScriptsView)?;

    let job_script = service::get_by_id::<EJobScript, _>(&state.db, id).await?;
    let files = files::list_job_script_files(&state.db, id).await?;

    let res = BaseResponse {
        error: false,
        message: JobScriptResponse { job_script, files },
    };

    Ok(Json(res))
}

pub async fn put_job_script(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(body): Json<PatchJobScriptRequest>,
) -> WebResult<Json<BaseResponse<JobScriptResponse>>> {
    require_permission(&identity, Permission::JobScriptsEdit)?;

    let job_script = service::get_by_id::<EJobScript, _>(&state.db, id).await?;
    let ajob_script = body.apply(job_script, Utc::now().naive_utc());
    let job_script = service::update::<EJobScript, _, _>(&state.db, id, ajob_script).await?;
    let files = files::list_job_script_files(&state.db, id).await?;

    let res = BaseResponse {
        error: false,
        message: JobScriptResponse { job_script, files },
    };

    Ok(Json(res))
}

pub async fn delete_job_script(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_permission(&identity, Permission::JobScriptsEdit)?;

    service::get_by_id::<EJobScript, _>(&state.db, id).await?;
    service::ensure_unreferenced::<EJobSubmission, _>(&state.db, CJobSubmission::JobScriptId, id)
        .await?;

    let job_script_files = files::list_job_script_files(&state.db, id).await?;
    service::delete::<EJobScript, _>(&state.db, id).await?;
    files::discard_job_script_blobs(state.store.as_ref(), id, &job_script_files).await?;

    tracing::info!(id, "Deleted job script");

    let res = BaseResponse {
        error: false,
        message: "Job script deleted".to_string(),
    };

    Ok(Json(res))
}

pub async fn put_job_script_file(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path((id, file_type)): Path<(i32, String)>,
    headers: HeaderMap,
    multipart: Multipart,
) -> WebResult<Json<BaseResponse<MJobScriptFile>>> {
    require_permission(&identity, Permission::JobScriptsEdit)?;

    let file_type = file_type
        .parse::<FileType>()
        .map_err(InputError::InvalidFileType)?;
    service::get_by_id::<EJobScript, _>(&state.db, id).await?;

    let (file, _) = read_upload(&headers, multipart, state.cli.max_upload_file_size)
        .await?
        .require_file()?;
    let filename = file
        .filename
        .ok_or_else(|| WebError::BadRequest("Uploaded file has no file name".to_string()))?;

    if file_type == FileType::Entrypoint {
        let existing = files::list_job_script_files(&state.db, id).await?;

        if existing
            .iter()
            .any(|f| f.file_type == FileType::Entrypoint && f.filename != filename)
        {
            return Err(WebError::BadRequest(format!(
                "Job script {} already has an entrypoint file",
                id
            )));
        }
    }

    let job_script_file = files::upsert_job_script_file(
        &state.db,
        state.store.as_ref(),
        id,
        &filename,
        file_type,
        file.content,
    )
    .await?;

    let res = BaseResponse {
        error: false,
        message: job_script_file,
    };

    Ok(Json(res))
}

pub async fn get_job_script_file(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path((id, filename)): Path<(i32, String)>,
) -> WebResult<Response> {
    require_permission(&identity, Permission::JobScriptsView)?;

    let (file, content) =
        files::get_job_script_file(&state.db, state.store.as_ref(), id, &filename).await?;

    Ok(file_response(&file.filename, content))
}

pub async fn delete_job_script_file(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path((id, filename)): Path<(i32, String)>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_permission(&identity, Permission::JobScriptsEdit)?;

    files::delete_job_script_file(&state.db, state.store.as_ref(), id, &filename).await?;

    let res = BaseResponse {
        error: false,
        message: format!("Job script file {} deleted", filename),
    };

    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template_file(filename: &str, file_type: FileType) -> MTemplateFile {
        MTemplateFile {
            id: 1,
            filename: filename.to_string(),
            file_type,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_render_files() {
        let request: RenderRequest = serde_json::from_value(json!({
            "template_output_name_mapping": {"entrypoint.sh.j2": "run.sh"},
            "sbatch_params": ["--partition=debug"],
            "param_dict": {"jobbergate_config": {"job_name": "rats"}}
        }))
        .unwrap();

        let rendered = render_files(
            vec![
                (
                    template_file("entrypoint.sh.j2", FileType::Entrypoint),
                    b"#!/bin/bash\n#SBATCH --job-name={{ job_name }}\n".to_vec(),
                ),
                (
                    template_file("helper.py.jinja2", FileType::Support),
                    b"print('{{ data.job_name }}')\n".to_vec(),
                ),
            ],
            &request,
        )
        .unwrap();

        assert_eq!(
            rendered,
            vec![
                RenderedFile {
                    filename: "run.sh".to_string(),
                    file_type: FileType::Entrypoint,
                    content: "#!/bin/bash\n#SBATCH --job-name=rats\n#SBATCH --partition=debug\n"
                        .to_string(),
                },
                RenderedFile {
                    filename: "helper.py".to_string(),
                    file_type: FileType::Support,
                    content: "print('rats')\n".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_render_files_requires_entrypoint() {
        let result = render_files(
            vec![(
                template_file("helper.py", FileType::Support),
                b"print()".to_vec(),
            )],
            &RenderRequest::default(),
        );

        assert!(matches!(result, Err(RenderError::MissingEntrypoint)));
    }

    #[test]
    fn test_render_files_duplicate_output() {
        let result = render_files(
            vec![
                (
                    template_file("run.sh.j2", FileType::Entrypoint),
                    b"#!/bin/bash\n".to_vec(),
                ),
                (
                    template_file("run.sh", FileType::Support),
                    b"echo\n".to_vec(),
                ),
            ],
            &RenderRequest::default(),
        );

        assert!(matches!(result, Err(RenderError::DuplicateOutput(name)) if name == "run.sh"));

        let request: RenderRequest = serde_json::from_value(json!({
            "template_output_name_mapping": {"entrypoint.sh.j2": "helper.sh"}
        }))
        .unwrap();
        let result = render_files(
            vec![
                (
                    template_file("entrypoint.sh.j2", FileType::Entrypoint),
                    b"#!/bin/bash\n".to_vec(),
                ),
                (
                    template_file("helper.sh", FileType::Support),
                    b"echo\n".to_vec(),
                ),
            ],
            &request,
        );

        assert!(matches!(result, Err(RenderError::DuplicateOutput(name)) if name == "helper.sh"));
    }
}
