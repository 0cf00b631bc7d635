/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::*;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JobScriptFileResponse {
    pub id: i32,
    pub filename: String,
    pub file_type: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JobScriptResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub owner_email: String,
    pub application_id: Option<i32>,
    pub parent_template_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub files: Vec<JobScriptFileResponse>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MakeJobScriptRequest {
    pub name: String,
    pub description: Option<String>,
    pub application_id: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RenderRequest {
    pub template_output_name_mapping: HashMap<String, String>,
    pub sbatch_params: Vec<String>,
    pub param_dict: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RenderFromTemplateRequest {
    pub create_request: MakeJobScriptRequest,
    pub render_request: RenderRequest,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PatchJobScriptRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Debug, Default)]
pub struct JobScriptFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_template_id: Option<i32>,
}

pub async fn get(
    config: &RequestConfig,
    params: &ListParams,
    filter: &JobScriptFilter,
) -> Result<Page<JobScriptResponse>> {
    let res = get_client(config, "job-scripts".to_string(), RequestType::GET)?
        .query(params)
        .query(filter)
        .send()
        .await?;

    parse_response(res).await
}

pub async fn post(config: &RequestConfig, req: &MakeJobScriptRequest) -> Result<JobScriptResponse> {
    let res = get_client(config, "job-scripts".to_string(), RequestType::POST)?
        .json(req)
        .send()
        .await?;

    parse_response(res).await
}

pub async fn post_render_from_template(
    config: &RequestConfig,
    template: &str,
    req: &RenderFromTemplateRequest,
) -> Result<JobScriptResponse> {
    let res = get_client(
        config,
        format!("job-scripts/render-from-template/{}", template),
        RequestType::POST,
    )?
    .json(req)
    .send()
    .await?;

    parse_response(res).await
}

pub async fn get_job_script(config: &RequestConfig, id: i32) -> Result<JobScriptResponse> {
    let res = get_client(config, format!("job-scripts/{}", id), RequestType::GET)?
        .send()
        .await?;

    parse_response(res).await
}

pub async fn put_job_script(
    config: &RequestConfig,
    id: i32,
    req: &PatchJobScriptRequest,
) -> Result<JobScriptResponse> {
    let res = get_client(config, format!("job-scripts/{}", id), RequestType::PUT)?
        .json(req)
        .send()
        .await?;

    parse_response(res).await
}

pub async fn delete_job_script(config: &RequestConfig, id: i32) -> Result<String> {
    let res = get_client(config, format!("job-scripts/{}", id), RequestType::DELETE)?
        .send()
        .await?;

    parse_response(res).await
}

pub async fn put_job_script_file(
    config: &RequestConfig,
    id: i32,
    file_type: &str,
    filename: &str,
    content: Vec<u8>,
) -> Result<JobScriptFileResponse> {
    let form = reqwest::multipart::Form::new().part("upload_file", file_part(filename, content));

    let res = get_client(
        config,
        format!("job-scripts/{}/upload/{}", id, file_type),
        RequestType::PUT,
    )?
    .multipart(form)
    .send()
    .await?;

    parse_response(res).await
}

pub async fn get_job_script_file(
    config: &RequestConfig,
    id: i32,
    filename: &str,
) -> Result<Vec<u8>> {
    let res = get_client(
        config,
        format!("job-scripts/{}/upload/{}", id, filename),
        RequestType::GET,
    )?
    .send()
    .await?;

    parse_file_response(res).await
}

pub async fn delete_job_script_file(
    config: &RequestConfig,
    id: i32,
    filename: &str,
) -> Result<String> {
    let res = get_client(
        config,
        format!("job-scripts/{}/upload/{}", id, filename),
        RequestType::DELETE,
    )?
    .send()
    .await?;

    parse_response(res).await
}
