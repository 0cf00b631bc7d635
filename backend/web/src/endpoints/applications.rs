/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::file_response;
use crate::authorization::require_permission;
use crate::error::WebResult;
use crate::upload::read_upload;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::{Extension, Json};
use chrono::{NaiveDateTime, Utc};
use jobbergate_core::consts::APPLICATION_ARCHIVE_NAME;
use jobbergate_core::files;
use jobbergate_core::input::IdOrIdentifier;
use jobbergate_core::permission::{Identity, Permission};
use jobbergate_core::service;
use jobbergate_core::types::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize, Deserialize, Debug)]
pub struct MakeApplicationRequest {
    pub application_name: String,
    pub application_identifier: Option<String>,
    #[serde(default)]
    pub application_description: String,
    #[serde(default)]
    pub application_file: String,
    #[serde(default)]
    pub application_config: String,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PatchApplicationRequest {
    pub application_name: Option<String>,
    pub application_identifier: Option<String>,
    pub application_description: Option<String>,
    pub application_file: Option<String>,
    pub application_config: Option<String>,
}

impl PatchApplicationRequest {
    /// Only the supplied fields are written.
    pub fn apply(self, application: MApplication, now: NaiveDateTime) -> AApplication {
        let mut aapplication: AApplication = application.into();

        if let Some(name) = self.application_name {
            aapplication.application_name = Set(name);
        }

        if let Some(identifier) = self.application_identifier {
            aapplication.application_identifier = Set(Some(identifier));
        }

        if let Some(description) = self.application_description {
            aapplication.application_description = Set(description);
        }

        if let Some(file) = self.application_file {
            aapplication.application_file = Set(file);
        }

        if let Some(config) = self.application_config {
            aapplication.application_config = Set(config);
        }

        aapplication.updated_at = Set(now);
        aapplication
    }
}

pub async fn get(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> WebResult<Json<BaseResponse<Page<MApplication>>>> {
    require_permission(&identity, Permission::ApplicationsView)?;

    let condition = service::list_condition::<EApplication>(&params, &identity.email);
    let page = service::list::<EApplication, _>(&state.db, &params, condition).await?;

    let res = BaseResponse {
        error: false,
        message: page,
    };

    Ok(Json(res))
}

pub async fn post(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<MakeApplicationRequest>,
) -> WebResult<(StatusCode, Json<BaseResponse<MApplication>>)> {
    require_permission(&identity, Permission::ApplicationsEdit)?;

    if let Some(identifier) = &body.application_identifier {
        service::ensure_identifier_available::<EApplication, _>(&state.db, identifier, None)
            .await?;
    }

    let now = Utc::now().naive_utc();
    let aapplication = AApplication {
        application_name: Set(body.application_name),
        application_identifier: Set(body.application_identifier),
        application_description: Set(body.application_description),
        application_owner_email: Set(identity.email.clone()),
        application_file: Set(body.application_file),
        application_config: Set(body.application_config),
        application_uploaded: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let application = service::create::<EApplication, _, _>(&state.db, aapplication).await?;

    tracing::info!(id = application.id, owner = %identity.email, "Created application");

    let res = BaseResponse {
        error: false,
        message: application,
    };

    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn get_application(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id_or_identifier): Path<String>,
) -> WebResult<Json<BaseResponse<MApplication>>> {
    require_permission(&identity, Permission::ApplicationsView)?;

    let application = service::get_one::<EApplication, _>(
        &state.db,
        &IdOrIdentifier::coerce(&id_or_identifier),
    )
    .await?;

    let res = BaseResponse {
        error: false,
        message: application,
    };

    Ok(Json(res))
}

pub async fn put_application(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(body): Json<PatchApplicationRequest>,
) -> WebResult<Json<BaseResponse<MApplication>>> {
    require_permission(&identity, Permission::ApplicationsEdit)?;

    let application = service::get_by_id::<EApplication, _>(&state.db, id).await?;

    if let Some(identifier) = &body.application_identifier {
        service::ensure_identifier_available::<EApplication, _>(&state.db, identifier, Some(id))
            .await?;
    }

    let aapplication = body.apply(application, Utc::now().naive_utc());
    let application = service::update::<EApplication, _, _>(&state.db, id, aapplication).await?;

    let res = BaseResponse {
        error: false,
        message: application,
    };

    Ok(Json(res))
}

pub async fn delete_application(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> WebResult<Json<BaseResponse<String>>> {
    require_permission(&identity, Permission::ApplicationsEdit)?;

    let application = service::get_by_id::<EApplication, _>(&state.db, id).await?;
    service::ensure_unreferenced::<EJobScript, _>(&state.db, CJobScript::ApplicationId, id)
        .await?;
    service::delete::<EApplication, _>(&state.db, id).await?;

    if application.application_uploaded {
        files::discard_application_archive(state.store.as_ref(), id).await?;
    }

    tracing::info!(id, "Deleted application");

    let res = BaseResponse {
        error: false,
        message: "Application deleted".to_string(),
    };

    Ok(Json(res))
}

pub async fn post_application_upload(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    multipart: Multipart,
) -> WebResult<Json<BaseResponse<MApplication>>> {
    require_permission(&identity, Permission::ApplicationsEdit)?;

    let application = service::get_by_id::<EApplication, _>(&state.db, id).await?;
    let (file, _) = read_upload(&headers, multipart, state.cli.max_upload_file_size)
        .await?
        .require_file()?;

    let application = files::put_application_archive(
        &state.db,
        state.store.as_ref(),
        application,
        file.content,
    )
    .await?;

    let res = BaseResponse {
        error: false,
        message: application,
    };

    Ok(Json(res))
}

pub async fn get_application_upload(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    require_permission(&identity, Permission::ApplicationsView)?;

    let application = service::get_by_id::<EApplication, _>(&state.db, id).await?;
    let content = files::get_application_archive(state.store.as_ref(), &application).await?;

    Ok(file_response(APPLICATION_ARCHIVE_NAME, content))
}

pub async fn delete_application_upload(
    state: State<Arc<ServerState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> WebResult<Json<BaseResponse<MApplication>>> {
    require_permission(&identity, Permission::ApplicationsEdit)?;

    let application = service::get_by_id::<EApplication, _>(&state.db, id).await?;
    let application =
        files::delete_application_archive(&state.db, state.store.as_ref(), application).await?;

    let res = BaseResponse {
        error: false,
        message: application,
    };

    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn application() -> MApplication {
        MApplication {
            id: 1,
            application_name: "rats".to_string(),
            application_identifier: Some("rats".to_string()),
            application_description: "counts rats".to_string(),
            application_owner_email: "owner@example.com".to_string(),
            application_file: "print('rats')".to_string(),
            application_config: "{}".to_string(),
            application_uploaded: false,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_patch_touches_only_supplied_fields() {
        let now = Utc::now().naive_utc();
        let patch = PatchApplicationRequest {
            application_description: Some("counts mice".to_string()),
            ..Default::default()
        };

        let aapplication = patch.apply(application(), now);

        assert_eq!(
            aapplication.application_description,
            ActiveValue::Set("counts mice".to_string())
        );
        assert_eq!(
            aapplication.application_name,
            ActiveValue::Unchanged("rats".to_string())
        );
        assert_eq!(
            aapplication.application_identifier,
            ActiveValue::Unchanged(Some("rats".to_string()))
        );
        assert_eq!(aapplication.updated_at, ActiveValue::Set(now));
    }
}
