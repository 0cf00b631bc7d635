/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod applications;
pub mod auth;
pub mod job_scripts;
pub mod job_submissions;
pub mod job_templates;

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub server_url: String,
    pub token: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BaseResponse<T> {
    pub error: bool,
    pub message: T,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub total: u64,
    pub start: u64,
    pub limit: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub pagination: Pagination,
}

/// Query parameters accepted by every list endpoint.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ListParams {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub user_only: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub include_null_identifier: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_ascending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

pub type RequestType = reqwest::Method;

/// Unwraps the envelope, turning `error: true` and non-JSON bodies into errors.
async fn parse_response<T: DeserializeOwned>(res: reqwest::Response) -> Result<T> {
    let status = res.status();
    let bytes = res
        .bytes()
        .await
        .context("Failed to read response body")?;

    match serde_json::from_slice::<BaseResponse<T>>(&bytes) {
        Ok(parsed) if !parsed.error => Ok(parsed.message),
        _ => match serde_json::from_slice::<BaseResponse<Value>>(&bytes) {
            Ok(error_res) => Err(anyhow!(
                "Request failed ({}): {}",
                status,
                error_message(&error_res.message)
            )),
            Err(_) => Err(anyhow!(
                "Request failed ({}): {}",
                status,
                String::from_utf8_lossy(&bytes)
            )),
        },
    }
}

fn error_message(message: &Value) -> String {
    match message {
        Value::String(message) => message.clone(),
        Value::Object(fields) => match (fields.get("message"), fields.get("table")) {
            (Some(Value::String(message)), Some(Value::String(table))) => {
                format!("{} (referenced by {})", message, table)
            }
            _ => message.to_string(),
        },
        other => other.to_string(),
    }
}

/// Downloads a raw file body; the server only uses the envelope for failures.
async fn parse_file_response(res: reqwest::Response) -> Result<Vec<u8>> {
    if res.status().is_success() {
        return Ok(res.bytes().await.context("Failed to read file")?.to_vec());
    }

    parse_response::<Value>(res).await.map(|_| Vec::new())
}

fn get_client(
    config: &RequestConfig,
    endpoint: String,
    request_type: RequestType,
) -> Result<reqwest::RequestBuilder> {
    let token = config
        .token
        .as_ref()
        .ok_or_else(|| anyhow!("Not logged in. Use `jobbergate login` first."))?;

    let client = reqwest::Client::new()
        .request(
            request_type,
            format!(
                "{}/jobbergate/{}",
                config.server_url.trim_end_matches('/'),
                endpoint
            ),
        )
        .header("Authorization", format!("Bearer {}", token));

    Ok(client)
}

fn file_part(filename: &str, content: Vec<u8>) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(content).file_name(filename.to_string())
}

pub async fn health(config: &RequestConfig) -> Result<String> {
    let res = reqwest::Client::new()
        .get(format!(
            "{}/jobbergate/health",
            config.server_url.trim_end_matches('/')
        ))
        .send()
        .await
        .context("Server unreachable")?;

    parse_response(res).await
}
