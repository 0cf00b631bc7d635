/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::*;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JobSubmissionResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub owner_email: String,
    pub job_script_id: i32,
    pub execution_directory: Option<String>,
    pub slurm_job_id: Option<i32>,
    pub client_id: Option<String>,
    pub status: String,
    pub report_message: Option<String>,
    pub execution_parameters: Value,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MakeJobSubmissionRequest {
    pub name: String,
    pub description: Option<String>,
    pub job_script_id: i32,
    pub execution_directory: Option<String>,
    pub client_id: Option<String>,
    pub execution_parameters: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PatchJobSubmissionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Serialize, Debug, Default)]
pub struct JobSubmissionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_job_script_id: Option<i32>,
    /// Comma separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slurm_job_ids: Option<String>,
}

pub async fn get(
    config: &RequestConfig,
    params: &ListParams,
    filter: &JobSubmissionFilter,
) -> Result<Page<JobSubmissionResponse>> {
    let res = get_client(config, "job-submissions".to_string(), RequestType::GET)?
        .query(params)
        .query(filter)
        .send()
        .await?;

    parse_response(res).await
}

pub async fn post(
    config: &RequestConfig,
    req: &MakeJobSubmissionRequest,
) -> Result<JobSubmissionResponse> {
    let res = get_client(config, "job-submissions".to_string(), RequestType::POST)?
        .json(req)
        .send()
        .await?;

    parse_response(res).await
}

pub async fn get_submission(config: &RequestConfig, id: i32) -> Result<JobSubmissionResponse> {
    let res = get_client(config, format!("job-submissions/{}", id), RequestType::GET)?
        .send()
        .await?;

    parse_response(res).await
}

pub async fn put_submission(
    config: &RequestConfig,
    id: i32,
    req: &PatchJobSubmissionRequest,
) -> Result<JobSubmissionResponse> {
    let res = get_client(config, format!("job-submissions/{}", id), RequestType::PUT)?
        .json(req)
        .send()
        .await?;

    parse_response(res).await
}

pub async fn delete_submission(config: &RequestConfig, id: i32) -> Result<String> {
    let res = get_client(
        config,
        format!("job-submissions/{}", id),
        RequestType::DELETE,
    )?
    .send()
    .await?;

    parse_response(res).await
}
