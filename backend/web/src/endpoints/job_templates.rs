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
use jobbergate_core::consts::WORKFLOW_FILE_NAME;
use jobbergate_core::files;
use jobbergate_core::input::{IdOrIdentifier, InputError};
use jobbergate_core::permission::{Identity, Permission};
use jobbergate_core::service;
use jobbergate_core::types::*;
use sea_orm::ActiveValue::Set;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Serialize, Deserialize, Debug)]
pub struct MakeJobTemplateRequest {
    pub name: String,
    pub identifier: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub template_vars: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PatchJobTemplateRequest {
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub template_vars: Option<Map<String, Value>>,
}

impl PatchJobTemplateRequest {
    pub fn apply(self, template: MJobScriptTemplate, now: NaiveDateTime) -> AJobScriptTemplate {
        let mut atemplate: AJobScriptTemplate = template.into();

        if let Some(name) = self.name {
            atemplate.name = Set(name);
        }

        if let Some(identifier) = self.identifier {
            atemplate.identifier = Set(Some(identifier));
        }

        if let Some(description) = self.description {
            atemplate.description = Set(Some(description));
        }

        if let Some(template_vars) = self.template_vars {
            atemplate.template_vars = Set(Value::Object(template_vars));
        }

        atemplate.updated_at = Set(now);
        atemplate
    }
}

/// A template together with the files attached to it.
#[derive(Serialize, Deserialize, Debug)]
pub struct JobTemplateResponse {
    #[serde(flatten)]
    pub template: MJobScriptTemplate,
    pub template_files: Vec<MTemplateFile>,
    pub workflow_files: Vec<MWorkflowFile>,
}

async fn load_template(
    state: &ServerState,
    id_or_identifier: &str,
) -> WebResult<MJobScriptTemplate> {
    Ok(service::get_one::<EJobScriptTemplate, _>(
        &state.db,
        &IdOrIdentifier::coerce(id_or_identifier),
    )
    .await?)
}

async fn with_files(
    state: &ServerState,
    template: MJobScriptTemplate,
) -> WebResult<JobTemplateResponse> {
    let template_files = files::list_template_files(&state.db, template.id).await?;
    let workflow_files = EWorkflowFile::find_by_id(template.id)
        .one(&state.db)
        .await?
        .into_iter()
        .collect();

    Ok(JobTemplateResponse {
        template,
        template_files,
        workflow_files,
    })
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> WebResult<Json<BaseResponse<Page<MJobScriptTemplate>>>> {
    require_permission(&identity, Permission::JobTemplatesView)?;

    let condition = service::list_condition::<EJobScriptTemplate>(&params, &identity.email);
    let page = service::list::<EJobScriptTemplate, _>(&state.db, &params, condition).await?;

    let res = BaseResponse {
        error: false,
        message: page,
    };

    Ok(Json(res))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<MakeJobTemplateRequest>,
) -> WebResult<(StatusCode, Json<BaseResponse<JobTemplateResponse>>)> {
    require_permission(&identity, Permission::JobTemplatesEdit)?;

    if let Some(identifier) = &body.identifier {
        service::ensure_identifier_available::<EJobScriptTemplate, _>(&state.db, identifier, None)
            .await?;
    }

    let now = Utc::now().naive_utc();
    let atemplate = AJobScriptTemplate {
        name: Set(body.name),
        identifier: Set(body.identifier),
        description: Set(body.description),
        owner_email: Set(identity.email.clone()),
        template_vars: Set(Value::Object(body.template_vars)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let template = service::create::<EJobScriptTemplate, _, _>(&state.db, atemplate).await?;

    tracing::info!(id = template.id, owner = %identity.email, "Created job script template");

    let res = BaseResponse {
        error: false,
        message: JobTemplateResponse {
            template,
            template_files: Vec::new(),
            workflow_files: Vec::new(),
        },
    };

    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn get_template(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id_or_identifier): Path<String>,
) -> WebResult<Json<BaseResponse<JobTemplateResponse>>> {
    require_permission(&identity, Permission::JobTemplatesView)?;

    let template = load_template(&state, &id_or_identifier).await?;

    let res = BaseResponse {
        error: false,
        message: with_files(&state, template).await?,
    };

    Ok(Json(res))
}

pub async fn put_template(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id_or_identifier): Path<String>,
    Json(body): Json<PatchJobTemplateRequest>,
) -> WebResult<Json<BaseResponse<JobTemplateResponse>>> {
    require_permission(&identity, Permission::JobTemplatesEdit)?;

    let template = load_template(&state, &id_or_identifier).await?;
    let id = template.id;

    if let Some(identifier) = &body.identifier {
        service::ensure_identifier_available::<EJobScriptTemplate, _>(
            &state.db,
            identifier,
            Some(id),
        )
        .await?;
    }

    let atemplate = body.apply(template, Utc::now().naive_utc());
    let template = service::update::<EJobScriptTemplate, _, _>(&state.db, id, atemplate).await?;

    let res = BaseResponse {
        error: false,
        message: with_files(&state, template).await?,
    };

    Ok(Json(res))
}

pub async fn delete_template(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id_or_identifier): Path<String>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_permission(&identity, Permission::JobTemplatesEdit)?;

    let template = load_template(&state, &id_or_identifier).await?;
    let id = template.id;

    service::ensure_unreferenced::<EJobScript, _>(&state.db, CJobScript::ParentTemplateId, id)
        .await?;

    let template = with_files(&state, template).await?;
    service::delete::<EJobScriptTemplate, _>(&state.db, id).await?;

    files::discard_template_blobs(
        state.store.as_ref(),
        id,
        &template.template_files,
        !template.workflow_files.is_empty(),
    )
    .await?;

    tracing::info!(id, "Deleted job script template");

    let res = BaseResponse {
        error: false,
        message: "Job script template deleted".to_string(),
    };

    Ok(Json(res))
}

/// `file_type` names the kind of the uploaded file, the file name comes from the form.
pub async fn put_template_file(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path((id_or_identifier, file_type)): Path<(String, String)>,
    headers: HeaderMap,
    multipart: Multipart,
) -> WebResult<Json<BaseResponse<MTemplateFile>>> {
    require_permission(&identity, Permission::JobTemplatesEdit)?;

    let file_type = file_type
        .parse::<FileType>()
        .map_err(InputError::InvalidFileType)?;
    let template = load_template(&state, &id_or_identifier).await?;

    let (file, _) = read_upload(&headers, multipart, state.cli.max_upload_file_size)
        .await?
        .require_file()?;
    let filename = file
        .filename
        .ok_or_else(|| WebError::BadRequest("Uploaded file has no file name".to_string()))?;

    let template_file = files::upsert_template_file(
        &state.db,
        state.store.as_ref(),
        template.id,
        &filename,
        file_type,
        file.content,
    )
    .await?;

    let res = BaseResponse {
        error: false,
        message: template_file,
    };

    Ok(Json(res))
}

pub async fn get_template_file(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path((id_or_identifier, filename)): Path<(String, String)>,
) -> WebResult<Response> {
    require_permission(&identity, Permission::JobTemplatesView)?;

    let template = load_template(&state, &id_or_identifier).await?;
    let (file, content) =
        files::get_template_file(&state.db, state.store.as_ref(), template.id, &filename).await?;

    Ok(file_response(&file.filename, content))
}

pub async fn delete_template_file(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path((id_or_identifier, filename)): Path<(String, String)>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_permission(&identity, Permission::JobTemplatesEdit)?;

    let template = load_template(&state, &id_or_identifier).await?;
    files::delete_template_file(&state.db, state.store.as_ref(), template.id, &filename).await?;

    let res = BaseResponse {
        error: false,
        message: format!("Template file {} deleted", filename),
    };

    Ok(Json(res))
}

pub async fn put_workflow_file(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id_or_identifier): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> WebResult<Json<BaseResponse<MWorkflowFile>>> {
    require_permission(&identity, Permission::JobTemplatesEdit)?;

    let template = load_template(&state, &id_or_identifier).await?;

    let (file, runtime_config) = read_upload(&headers, multipart, state.cli.max_upload_file_size)
        .await?
        .require_file()?;

    let runtime_config = match runtime_config {
        Some(raw) => serde_json::from_str::<Value>(&raw).map_err(|e| {
            WebError::UnprocessableEntity(format!("Invalid runtime_config: {}", e))
        })?,
        None => Value::Object(Map::new()),
    };

    let workflow_file = files::upsert_workflow_file(
        &state.db,
        state.store.as_ref(),
        template.id,
        runtime_config,
        file.content,
    )
    .await?;

    let res = BaseResponse {
        error: false,
        message: workflow_file,
    };

    Ok(Json(res))
}

pub async fn get_workflow_file(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id_or_identifier): Path<String>,
) -> WebResult<Response> {
    require_permission(&identity, Permission::JobTemplatesView)?;

    let template = load_template(&state, &id_or_identifier).await?;
    let (_, content) =
        files::get_workflow_file(&state.db, state.store.as_ref(), template.id).await?;

    Ok(file_response(WORKFLOW_FILE_NAME, content))
}

pub async fn delete_workflow_file(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id_or_identifier): Path<String>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_permission(&identity, Permission::JobTemplatesEdit)?;

    let template = load_template(&state, &id_or_identifier).await?;
    files::delete_workflow_file(&state.db, state.store.as_ref(), template.id).await?;

    let res = BaseResponse {
        error: false,
        message: "Workflow file deleted".to_string(),
    };

    Ok(Json(res))
}
