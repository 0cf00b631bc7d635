/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod applications;
pub mod job_scripts;
pub mod job_submissions;
pub mod job_templates;

use crate::error::{WebError, WebResult};
use axum::extract::Json;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use jobbergate_core::types::BaseResponse;

pub async fn handle_404() -> WebError {
    WebError::NotFound("Not Found".to_string())
}

pub async fn get_health() -> WebResult<Json<BaseResponse<String>>> {
    let res = BaseResponse {
        error: false,
        message: "200 ALIVE".to_string(),
    };

    Ok(Json(res))
}

/// Raw file download, the only response that is not wrapped in [`BaseResponse`].
pub(crate) fn file_response(filename: &str, content: Vec<u8>) -> Response {
    (
        [
            (CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", quote_filename(filename)),
            ),
        ],
        content,
    )
        .into_response()
}

/// Escapes a filename for the quoted-string form of `Content-Disposition`.
fn quote_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !c.is_control())
        .fold(String::with_capacity(filename.len()), |mut quoted, c| {
            if c == '"' || c == '\\' {
                quoted.push('\\');
            }

            quoted.push(c);
            quoted
        })
}
