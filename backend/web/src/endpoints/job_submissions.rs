/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::authorization::require_permission;
use crate::error::{WebError, WebResult};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{NaiveDateTime, Utc};
use entity::SubmissionStatus;
use jobbergate_core::files;
use jobbergate_core::input::{InputError, parse_slurm_job_ids};
use jobbergate_core::permission::{Identity, Permission};
use jobbergate_core::render::parse_sbatch_params;
use jobbergate_core::service;
use jobbergate_core::types::*;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Serialize, Deserialize, Debug)]
pub struct MakeJobSubmissionRequest {
    pub name: String,
    pub description: Option<String>,
    pub job_script_id: i32,
    pub execution_directory: Option<String>,
    pub client_id: Option<String>,
    pub slurm_job_id: Option<i32>,
    #[serde(default)]
    pub execution_parameters: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PatchJobSubmissionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub execution_directory: Option<String>,
    pub status: Option<SubmissionStatus>,
}

impl PatchJobSubmissionRequest {
    pub fn apply(self, submission: MJobSubmission, now: NaiveDateTime) -> AJobSubmission {
        let mut asubmission: AJobSubmission = submission.into();

        if let Some(name) = self.name {
            asubmission.name = Set(name);
        }

        if let Some(description) = self.description {
            asubmission.description = Set(Some(description));
        }

        if let Some(execution_directory) = self.execution_directory {
            asubmission.execution_directory = Set(Some(execution_directory));
        }

        if let Some(status) = self.status {
            asubmission.status = Set(status);
        }

        asubmission.updated_at = Set(now);
        asubmission
    }
}

/// Status report sent by the cluster agent.
#[derive(Serialize, Deserialize, Debug)]
pub struct AgentUpdateRequest {
    pub status: SubmissionStatus,
    pub slurm_job_id: Option<i32>,
    pub report_message: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct JobSubmissionFilter {
    pub status: Option<String>,
    pub from_job_script_id: Option<i32>,
    pub slurm_job_ids: Option<String>,
}

impl JobSubmissionFilter {
    pub fn condition(&self, condition: Condition) -> Result<Condition, InputError> {
        let mut condition = condition;

        if let Some(status) = &self.status {
            let status = status
                .parse::<SubmissionStatus>()
                .map_err(InputError::InvalidStatus)?;
            condition = condition.add(CJobSubmission::Status.eq(status));
        }

        if let Some(job_script_id) = self.from_job_script_id {
            condition = condition.add(CJobSubmission::JobScriptId.eq(job_script_id));
        }

        if let Some(slurm_job_ids) = &self.slurm_job_ids {
            let ids = parse_slurm_job_ids(slurm_job_ids)?;

            if !ids.is_empty() {
                condition = condition.add(CJobSubmission::SlurmJobId.is_in(ids));
            }
        }

        Ok(condition)
    }
}

/// Parameters read from the entrypoint's `#SBATCH` lines, overridden by the request.
pub fn merge_execution_parameters(
    entrypoint: &str,
    requested: Map<String, Value>,
) -> Map<String, Value> {
    let mut parameters = parse_sbatch_params(entrypoint);
    parameters.extend(requested);
    parameters
}

fn agent_client_id(identity: &Identity) -> WebResult<&str> {
    identity
        .client_id
        .as_deref()
        .ok_or_else(|| WebError::BadRequest("Access token does not carry a client_id".to_string()))
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
    Query(filter): Query<JobSubmissionFilter>,
) -> WebResult<Json<BaseResponse<Page<MJobSubmission>>>> {
    require_permission(&identity, Permission::JobSubmissionsView)?;

    let condition = filter.condition(service::list_condition::<EJobSubmission>(
        &params,
        &identity.email,
    ))?;
    let page = service::list::<EJobSubmission, _>(&state.db, &params, condition).await?;

    let res = BaseResponse {
        error: false,
        message: page,
    };

    Ok(Json(res))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<MakeJobSubmissionRequest>,
) -> WebResult<(StatusCode, Json<BaseResponse<MJobSubmission>>)> {
    require_permission(&identity, Permission::JobSubmissionsEdit)?;

    let client_id = body
        .client_id
        .or_else(|| identity.client_id.clone())
        .ok_or_else(WebError::missing_client_id)?;

    let job_script = service::get_by_id::<EJobScript, _>(&state.db, body.job_script_id).await?;
    let job_script_files = files::list_job_script_files(&state.db, job_script.id).await?;

    let entrypoint = files::single_entrypoint(&job_script_files).ok_or_else(|| {
        WebError::BadRequest(format!(
            "Job script {} must have exactly one entrypoint file",
            job_script.id
        ))
    })?;

    let (_, content) = files::get_job_script_file(
        &state.db,
        state.store.as_ref(),
        job_script.id,
        &entrypoint.filename,
    )
    .await?;

    let execution_parameters = merge_execution_parameters(
        &String::from_utf8_lossy(&content),
        body.execution_parameters,
    );

    let now = Utc::now().naive_utc();
    let asubmission = AJobSubmission {
        name: Set(body.name),
        description: Set(body.description),
        owner_email: Set(identity.email.clone()),
        job_script_id: Set(job_script.id),
        execution_directory: Set(body.execution_directory),
        slurm_job_id: Set(body.slurm_job_id),
        client_id: Set(Some(client_id)),
        status: Set(SubmissionStatus::Created),
        report_message: Set(None),
        execution_parameters: Set(Value::Object(execution_parameters)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let submission = service::create::<EJobSubmission, _, _>(&state.db, asubmission).await?;

    tracing::info!(
        id = submission.id,
        job_script_id = job_script.id,
        owner = %identity.email,
        "Created job submission"
    );

    let res = BaseResponse {
        error: false,
        message: submission,
    };

    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn get_submission(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> WebResult<Json<BaseResponse<MJobSubmission>>> {
    require_permission(&identity, Permission::JobSubmissionsView)?;

    let submission = service::get_by_id::<EJobSubmission, _>(&state.db, id).await?;

    let res = BaseResponse {
        error: false,
        message: submission,
    };

    Ok(Json(res))
}

pub async fn put_submission(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(body): Json<PatchJobSubmissionRequest>,
) -> WebResult<Json<BaseResponse<MJobSubmission>>> {
    require_permission(&identity, Permission::JobSubmissionsEdit)?;

    let submission = service::get_by_id::<EJobSubmission, _>(&state.db, id).await?;
    let asubmission = body.apply(submission, Utc::now().naive_utc());
    let submission = service::update::<EJobSubmission, _, _>(&state.db, id, asubmission).await?;

    let res = BaseResponse {
        error: false,
        message: submission,
    };

    Ok(Json(res))
}

pub async fn delete_submission(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_permission(&identity, Permission::JobSubmissionsEdit)?;

    service::delete::<EJobSubmission, _>(&state.db, id).await?;

    tracing::info!(id, "Deleted job submission");

    let res = BaseResponse {
        error: false,
        message: "Job submission deleted".to_string(),
    };

    Ok(Json(res))
}

async fn agent_submissions(
    state: &ServerState,
    client_id: &str,
    status: SubmissionStatus,
) -> WebResult<Vec<MJobSubmission>> {
    Ok(EJobSubmission::find()
        .filter(
            Condition::all()
                .add(CJobSubmission::ClientId.eq(client_id))
                .add(CJobSubmission::Status.eq(status)),
        )
        .order_by_asc(CJobSubmission::Id)
        .all(&state.db)
        .await?)
}

pub async fn get_pending(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
) -> WebResult<Json<BaseResponse<Vec<MJobSubmission>>>> {
    require_permission(&identity, Permission::JobSubmissionsView)?;

    let client_id = agent_client_id(&identity)?;
    let submissions = agent_submissions(&state, client_id, SubmissionStatus::Created).await?;

    let res = BaseResponse {
        error: false,
        message: submissions,
    };

    Ok(Json(res))
}

pub async fn get_active(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
) -> WebResult<Json<BaseResponse<Vec<MJobSubmission>>>> {
    require_permission(&identity, Permission::JobSubmissionsView)?;

    let client_id = agent_client_id(&identity)?;
    let submissions = agent_submissions(&state, client_id, SubmissionStatus::Submitted).await?;

    let res = BaseResponse {
        error: false,
        message: submissions,
    };

    Ok(Json(res))
}

pub async fn put_agent_submission(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(body): Json<AgentUpdateRequest>,
) -> WebResult<Json<BaseResponse<MJobSubmission>>> {
    require_permission(&identity, Permission::JobSubmissionsEdit)?;

    let client_id = agent_client_id(&identity)?;

    let submission = EJobSubmission::find()
        .filter(
            Condition::all()
                .add(CJobSubmission::Id.eq(id))
                .add(CJobSubmission::ClientId.eq(client_id)),
        )
        .one(&state.db)
        .await?
        .ok_or_else(|| WebError::not_found("Job submission"))?;

    let mut asubmission: AJobSubmission = submission.into();
    asubmission.status = Set(body.status);

    if let Some(slurm_job_id) = body.slurm_job_id {
        asubmission.slurm_job_id = Set(Some(slurm_job_id));
    }

    if let Some(report_message) = body.report_message {
        asubmission.report_message = Set(Some(report_message));
    }

    asubmission.updated_at = Set(Utc::now().naive_utc());

    let submission = service::update::<EJobSubmission, _, _>(&state.db, id, asubmission).await?;

    tracing::info!(
        id,
        client_id = %client_id,
        status = %body.status,
        "Agent updated job submission"
    );

    let res = BaseResponse {
        error: false,
        message: submission,
    };

    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};
    use serde_json::json;

    #[test]
    fn test_merge_execution_parameters() {
        let requested = match json!({"partition": "gpu", "nodes": 2}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let merged = merge_execution_parameters(
            "#!/bin/bash\n#SBATCH --job-name=rats\n#SBATCH --partition=debug\n",
            requested,
        );

        assert_eq!(
            Value::Object(merged),
            json!({"job_name": "rats", "partition": "gpu", "nodes": 2})
        );
    }

    #[test]
    fn test_filter_condition() {
        let filter = JobSubmissionFilter {
            status: Some("submitted".to_string()),
            from_job_script_id: Some(4),
            slurm_job_ids: Some("11, 12".to_string()),
        };

        let query = EJobSubmission::find()
            .filter(filter.condition(Condition::all()).unwrap())
            .build(DbBackend::Postgres)
            .to_string();

        assert!(query.contains(r#""job_submissions"."status" = 1"#));
        assert!(query.contains(r#""job_submissions"."job_script_id" = 4"#));
        assert!(query.contains(r#""job_submissions"."slurm_job_id" IN (11, 12)"#));
    }

    #[test]
    fn test_filter_rejects_bad_input() {
        let filter = JobSubmissionFilter {
            slurm_job_ids: Some("11,abc".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filter.condition(Condition::all()).unwrap_err(),
            InputError::InvalidSlurmJobId("abc".to_string())
        );

        let filter = JobSubmissionFilter {
            status: Some("LOST".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            filter.condition(Condition::all()),
            Err(InputError::InvalidStatus(_))
        ));
    }
}
