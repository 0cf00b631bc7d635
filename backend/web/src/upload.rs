/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use axum::extract::Multipart;
use axum::http::HeaderMap;
use axum::http::header::CONTENT_LENGTH;
use jobbergate_core::input::check_file_name;

use crate::error::{WebError, WebResult};

pub const UPLOAD_FILE_FIELD: &str = "upload_file";
pub const RUNTIME_CONFIG_FIELD: &str = "runtime_config";

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub runtime_config: Option<String>,
}

impl UploadForm {
    pub fn require_file(self) -> WebResult<(UploadedFile, Option<String>)> {
        match self.file {
            Some(file) => Ok((file, self.runtime_config)),
            None => Err(WebError::BadRequest(format!(
                "Missing multipart field {}",
                UPLOAD_FILE_FIELD
            ))),
        }
    }
}

pub fn check_content_length(headers: &HeaderMap, limit: u64) -> WebResult<()> {
    let length = headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    match length {
        Some(length) if length > limit => Err(WebError::PayloadTooLarge(limit)),
        _ => Ok(()),
    }
}

/// Reads the upload form, rejecting anything above `limit` bytes before it is stored.
pub async fn read_upload(
    headers: &HeaderMap,
    mut multipart: Multipart,
    limit: u64,
) -> WebResult<UploadForm> {
    check_content_length(headers, limit)?;

    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some(UPLOAD_FILE_FIELD) => {
                let filename = field.file_name().map(str::to_string);

                if let Some(name) = &filename {
                    check_file_name(name)?;
                }

                let mut content = Vec::new();

                while let Some(chunk) = field.chunk().await? {
                    if (content.len() + chunk.len()) as u64 > limit {
                        return Err(WebError::PayloadTooLarge(limit));
                    }

                    content.extend_from_slice(&chunk);
                }

                form.file = Some(UploadedFile { filename, content });
            }
            Some(RUNTIME_CONFIG_FIELD) => {
                form.runtime_config = Some(field.text().await?);
            }
            name => {
                tracing::debug!(field = ?name, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_content_length_limit() {
        let mut headers = HeaderMap::new();
        assert!(check_content_length(&headers, 10).is_ok());

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("10"));
        assert!(check_content_length(&headers, 10).is_ok());

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("11"));
        assert!(matches!(
            check_content_length(&headers, 10),
            Err(WebError::PayloadTooLarge(10))
        ));
    }
}
