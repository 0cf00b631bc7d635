/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use jobbergate_core::permission::Permission;
use jobbergate_core::storage::{MemoryStore, ObjectStore, StorageError};
use jobbergate_core::types::*;
use mockall::mock;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::Value;
use std::sync::Arc;

mock! {
    pub Store {}

    #[async_trait]
    impl ObjectStore for Store {
        async fn put(&self, key: &str, content: Vec<u8>) -> Result<(), StorageError>;
        async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
        async fn delete(&self, key: &str) -> Result<(), StorageError>;
    }
}

fn oversized_form(filename: &str) -> MultipartForm {
    let content = vec![b'x'; common::UPLOAD_LIMIT as usize + 1];
    MultipartForm::new().add_part("upload_file", Part::bytes(content).file_name(filename))
}

fn store_never_written() -> Arc<dyn ObjectStore> {
    let mut store = MockStore::new();
    store.expect_put().times(0);
    store.expect_delete().times(0);
    Arc::new(store)
}

#[tokio::test]
async fn test_oversized_application_upload() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::application(1, Some("rats"))]])
        .into_connection();
    let server = common::create_test_server_with_store(db.clone(), store_never_written());

    let response = server
        .post("/jobbergate/applications/1/upload")
        .authorization_bearer(common::token(&[Permission::ApplicationsEdit]))
        .multipart(oversized_form("jobbergate.tar.gz"))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    // the application was looked up but never marked as uploaded
    assert_eq!(db.into_transaction_log().len(), 1);
}

#[tokio::test]
async fn test_oversized_template_upload() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::job_script_template(1)]])
        .into_connection();
    let server = common::create_test_server_with_store(db, store_never_written());

    let response = server
        .put("/jobbergate/job-script-templates/1/upload/template/ENTRYPOINT")
        .authorization_bearer(common::token(&[Permission::JobTemplatesEdit]))
        .multipart(oversized_form("entrypoint.sh.j2"))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_invalid_file_type() {
    let server = common::create_test_server_with_store(
        MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        store_never_written(),
    );

    let response = server
        .put("/jobbergate/job-scripts/1/upload/BINARY")
        .authorization_bearer(common::token(&[Permission::JobScriptsEdit]))
        .multipart(
            MultipartForm::new()
                .add_part("upload_file", Part::bytes(b"echo".to_vec()).file_name("run.sh")),
        )
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_application_upload() {
    let mut uploaded = common::application(1, Some("rats"));
    uploaded.application_uploaded = true;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::application(1, Some("rats"))]])
        .append_query_results([vec![uploaded]])
        .into_connection();
    let store = Arc::new(MemoryStore::new());
    let server = common::create_test_server_with_store(db, store.clone());

    let response = server
        .post("/jobbergate/applications/1/upload")
        .authorization_bearer(common::token(&[Permission::ApplicationsEdit]))
        .multipart(
            MultipartForm::new().add_part(
                "upload_file",
                Part::bytes(b"archive".to_vec()).file_name("jobbergate.tar.gz"),
            ),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["message"]["application_uploaded"],
        true
    );
    assert_eq!(
        store.get("applications/1/jobbergate.tar.gz").await.unwrap(),
        b"archive".to_vec()
    );
}

#[tokio::test]
async fn test_template_file_upload() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::job_script_template(4)]])
        .append_query_results([Vec::<MTemplateFile>::new()])
        .append_query_results([vec![MTemplateFile {
            id: 4,
            filename: "entrypoint.sh.j2".to_string(),
            file_type: entity::FileType::Entrypoint,
            created_at: Default::default(),
            updated_at: Default::default(),
        }]])
        .into_connection();
    let store = Arc::new(MemoryStore::new());
    let server = common::create_test_server_with_store(db, store.clone());

    let response = server
        .put("/jobbergate/job-script-templates/rats/upload/template/entrypoint")
        .authorization_bearer(common::token(&[Permission::JobTemplatesEdit]))
        .multipart(MultipartForm::new().add_part(
            "upload_file",
            Part::bytes(b"#!/bin/bash\n".to_vec()).file_name("entrypoint.sh.j2"),
        ))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["message"]["file_type"],
        "ENTRYPOINT"
    );
    assert!(store.contains("job_script_templates/4/entrypoint.sh.j2").await);
}

#[tokio::test]
async fn test_application_download() {
    let mut uploaded = common::application(1, Some("rats"));
    uploaded.application_uploaded = true;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![uploaded]])
        .append_query_results([vec![common::application(2, None)]])
        .into_connection();
    let store = Arc::new(MemoryStore::new());
    store
        .put("applications/1/jobbergate.tar.gz", b"archive".to_vec())
        .await
        .unwrap();
    let server = common::create_test_server_with_store(db, store);
    let token = common::token(&[Permission::ApplicationsView]);

    let response = server
        .get("/jobbergate/applications/1/upload")
        .authorization_bearer(token.clone())
        .await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"archive");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"jobbergate.tar.gz\""
    );

    // application 2 never had an archive uploaded
    server
        .get("/jobbergate/applications/2/upload")
        .authorization_bearer(token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
