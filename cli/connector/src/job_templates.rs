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
pub struct TemplateFileResponse {
    pub id: i32,
    pub filename: String,
    pub file_type: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorkflowFileResponse {
    pub id: i32,
    pub runtime_config: Value,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JobTemplateResponse {
    pub id: i32,
    pub identifier: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub owner_email: String,
    pub template_vars: Value,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub template_files: Vec<TemplateFileResponse>,
    #[serde(default)]
    pub workflow_files: Vec<WorkflowFileResponse>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MakeJobTemplateRequest {
    pub name: String,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub template_vars: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PatchJobTemplateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_vars: Option<Map<String, Value>>,
}

pub async fn get(
    config: &RequestConfig,
    params: &ListParams,
) -> Result<Page<JobTemplateResponse>> {
    let res = get_client(config, "job-script-templates".to_string(), RequestType::GET)?
        .query(params)
        .send()
        .await?;

    parse_response(res).await
}

pub async fn post(
    config: &RequestConfig,
    req: &MakeJobTemplateRequest,
) -> Result<JobTemplateResponse> {
    let res = get_client(config, "job-script-templates".to_string(), RequestType::POST)?
        .json(req)
        .send()
        .await?;

    parse_response(res).await
}

pub async fn get_template(config: &RequestConfig, template: &str) -> Result<JobTemplateResponse> {
    let res = get_client(
        config,
        format!("job-script-templates/{}", template),
        RequestType::GET,
    )?
    .send()
    .await?;

    parse_response(res).await
}

pub async fn put_template(
    config: &RequestConfig,
    template: &str,
    req: &PatchJobTemplateRequest,
) -> Result<JobTemplateResponse> {
    let res = get_client(
        config,
        format!("job-script-templates/{}", template),
        RequestType::PUT,
    )?
    .json(req)
    .send()
    .await?;

    parse_response(res).await
}

pub async fn delete_template(config: &RequestConfig, template: &str) -> Result<String> {
    let res = get_client(
        config,
        format!("job-script-templates/{}", template),
        RequestType::DELETE,
    )?
    .send()
    .await?;

    parse_response(res).await
}

pub async fn put_template_file(
    config: &RequestConfig,
    template: &str,
    file_type: &str,
    filename: &str,
    content: Vec<u8>,
) -> Result<TemplateFileResponse> {
    let form = reqwest::multipart::Form::new().part("upload_file", file_part(filename, content));

    let res = get_client(
        config,
        format!("job-script-templates/{}/upload/template/{}", template, file_type),
        RequestType::PUT,
    )?
    .multipart(form)
    .send()
    .await?;

    parse_response(res).await
}

pub async fn get_template_file(
    config: &RequestConfig,
    template: &str,
    filename: &str,
) -> Result<Vec<u8>> {
    let res = get_client(
        config,
        format!("job-script-templates/{}/upload/template/{}", template, filename),
        RequestType::GET,
    )?
    .send()
    .await?;

    parse_file_response(res).await
}

pub async fn delete_template_file(
    config: &RequestConfig,
    template: &str,
    filename: &str,
) -> Result<String> {
    let res = get_client(
        config,
        format!("job-script-templates/{}/upload/template/{}", template, filename),
        RequestType::DELETE,
    )?
    .send()
    .await?;

    parse_response(res).await
}

pub async fn put_workflow_file(
    config: &RequestConfig,
    template: &str,
    filename: &str,
    content: Vec<u8>,
    runtime_config: Option<&Value>,
) -> Result<WorkflowFileResponse> {
    let mut form =
        reqwest::multipart::Form::new().part("upload_file", file_part(filename, content));

    if let Some(runtime_config) = runtime_config {
        form = form.text("runtime_config", runtime_config.to_string());
    }

    let res = get_client(
        config,
        format!("job-script-templates/{}/upload/workflow", template),
        RequestType::PUT,
    )?
    .multipart(form)
    .send()
    .await?;

    parse_response(res).await
}
