/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::*;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApplicationResponse {
    pub id: i32,
    pub application_name: String,
    pub application_identifier: Option<String>,
    pub application_description: String,
    pub application_owner_email: String,
    pub application_file: String,
    pub application_config: String,
    pub application_uploaded: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MakeApplicationRequest {
    pub application_name: String,
    pub application_identifier: Option<String>,
    pub application_description: String,
    pub application_file: String,
    pub application_config: String,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PatchApplicationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_config: Option<String>,
}

pub async fn get(
    config: &RequestConfig,
    params: &ListParams,
) -> Result<Page<ApplicationResponse>> {
    let res = get_client(config, "applications".to_string(), RequestType::GET)?
        .query(params)
        .send()
        .await?;

    parse_response(res).await
}

pub async fn post(
    config: &RequestConfig,
    req: &MakeApplicationRequest,
) -> Result<ApplicationResponse> {
    let res = get_client(config, "applications".to_string(), RequestType::POST)?
        .json(req)
        .send()
        .await?;

    parse_response(res).await
}

/// Accepts a numeric id or an identifier.
pub async fn get_application(
    config: &RequestConfig,
    application: &str,
) -> Result<ApplicationResponse> {
    let res = get_client(
        config,
        format!("applications/{}", application),
        RequestType::GET,
    )?
    .send()
    .await?;

    parse_response(res).await
}

pub async fn put_application(
    config: &RequestConfig,
    id: i32,
    req: &PatchApplicationRequest,
) -> Result<ApplicationResponse> {
    let res = get_client(config, format!("applications/{}", id), RequestType::PUT)?
        .json(req)
        .send()
        .await?;

    parse_response(res).await
}

pub async fn delete_application(config: &RequestConfig, id: i32) -> Result<String> {
    let res = get_client(config, format!("applications/{}", id), RequestType::DELETE)?
        .send()
        .await?;

    parse_response(res).await
}

pub async fn post_application_upload(
    config: &RequestConfig,
    id: i32,
    filename: &str,
    content: Vec<u8>,
) -> Result<ApplicationResponse> {
    let form = reqwest::multipart::Form::new().part("upload_file", file_part(filename, content));

    let res = get_client(
        config,
        format!("applications/{}/upload", id),
        RequestType::POST,
    )?
    .multipart(form)
    .send()
    .await?;

    parse_response(res).await
}

pub async fn delete_application_upload(
    config: &RequestConfig,
    id: i32,
) -> Result<ApplicationResponse> {
    let res = get_client(
        config,
        format!("applications/{}/upload", id),
        RequestType::DELETE,
    )?
    .send()
    .await?;

    parse_response(res).await
}
