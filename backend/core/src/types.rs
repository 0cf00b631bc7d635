/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::input::{greater_than_zero, port_in_range};
use super::permission::TokenVerifier;
use super::storage::ObjectStore;
use clap::Parser;
use entity::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "Jobbergate",
    display_name = "Jobbergate",
    bin_name = "jobbergate-api",
    author = "Wavelens",
    version,
    about,
    long_about = None
)]
pub struct Cli {
    #[arg(long, env = "JOBBERGATE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "JOBBERGATE_IP", default_value = "127.0.0.1")]
    pub ip: String,
    #[arg(long, env = "JOBBERGATE_PORT", value_parser = port_in_range, default_value_t = 8000)]
    pub port: u16,
    #[arg(long, env = "JOBBERGATE_CORS_ORIGIN")]
    pub cors_origin: Option<String>,
    #[arg(long, env = "JOBBERGATE_DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(long, env = "JOBBERGATE_DATABASE_URL_FILE")]
    pub database_url_file: Option<String>,
    #[arg(long, env = "JOBBERGATE_S3_BUCKET_NAME")]
    pub s3_bucket_name: Option<String>,
    #[arg(long, env = "JOBBERGATE_S3_ENDPOINT_URL")]
    pub s3_endpoint_url: Option<String>,
    #[arg(long, env = "JOBBERGATE_S3_REGION", default_value = "us-east-1")]
    pub s3_region: String,
    #[arg(long, env = "JOBBERGATE_S3_ACCESS_KEY_ID")]
    pub s3_access_key_id: Option<String>,
    #[arg(long, env = "JOBBERGATE_S3_SECRET_ACCESS_KEY_FILE")]
    pub s3_secret_access_key_file: Option<String>,
    #[arg(
        long,
        env = "JOBBERGATE_MAX_UPLOAD_FILE_SIZE",
        value_parser = greater_than_zero::<u64>,
        default_value = "104857600"
    )]
    pub max_upload_file_size: u64,
    #[arg(long, env = "JOBBERGATE_OIDC_DISCOVERY_URL")]
    pub oidc_discovery_url: Option<String>,
    #[arg(long, env = "JOBBERGATE_OIDC_AUDIENCE")]
    pub oidc_audience: Option<String>,
    #[arg(long, env = "JOBBERGATE_JWT_SECRET_FILE")]
    pub jwt_secret_file: Option<String>,
    #[arg(long, env = "JOBBERGATE_REPORT_ERRORS", default_value = "false")]
    pub report_errors: bool,
    #[arg(long, env = "JOBBERGATE_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

pub struct ServerState {
    pub db: DatabaseConnection,
    pub cli: Cli,
    pub store: Arc<dyn ObjectStore>,
    pub verifier: TokenVerifier,
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

/// Query parameters shared by every list endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct ListParams {
    #[serde(default, alias = "user")]
    pub user_only: bool,
    #[serde(default, alias = "all")]
    pub include_null_identifier: bool,
    pub search: Option<String>,
    pub sort_field: Option<String>,
    #[serde(default = "default_true")]
    pub sort_ascending: bool,
    #[serde(default)]
    pub start: u64,
    pub limit: Option<u64>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            user_only: false,
            include_null_identifier: false,
            search: None,
            sort_field: None,
            sort_ascending: true,
            start: 0,
            limit: None,
        }
    }
}

fn default_true() -> bool {
    true
}

pub type EApplication = application::Entity;
pub type EJobScript = job_script::Entity;
pub type EJobScriptFile = job_script_file::Entity;
pub type EJobScriptTemplate = job_script_template::Entity;
pub type EJobSubmission = job_submission::Entity;
pub type ETemplateFile = template_file::Entity;
pub type EWorkflowFile = workflow_file::Entity;

pub type MApplication = application::Model;
pub type MJobScript = job_script::Model;
pub type MJobScriptFile = job_script_file::Model;
pub type MJobScriptTemplate = job_script_template::Model;
pub type MJobSubmission = job_submission::Model;
pub type MTemplateFile = template_file::Model;
pub type MWorkflowFile = workflow_file::Model;

pub type AApplication = application::ActiveModel;
pub type AJobScript = job_script::ActiveModel;
pub type AJobScriptFile = job_script_file::ActiveModel;
pub type AJobScriptTemplate = job_script_template::ActiveModel;
pub type AJobSubmission = job_submission::ActiveModel;
pub type ATemplateFile = template_file::ActiveModel;
pub type AWorkflowFile = workflow_file::ActiveModel;

pub type CApplication = application::Column;
pub type CJobScript = job_script::Column;
pub type CJobScriptFile = job_script_file::Column;
pub type CJobScriptTemplate = job_script_template::Column;
pub type CJobSubmission = job_submission::Column;
pub type CTemplateFile = template_file::Column;
pub type CWorkflowFile = workflow_file::Column;
