/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod common;

use axum::http::StatusCode;
use chrono::NaiveDateTime;
use entity::{FileType, SubmissionStatus};
use jobbergate_core::permission::{Permission, TokenClaims};
use jobbergate_core::storage::{MemoryStore, ObjectStore};
use jobbergate_core::types::*;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::{Value, json};
use std::sync::Arc;

fn job_script_file(filename: &str, file_type: FileType) -> MJobScriptFile {
    MJobScriptFile {
        id: 2,
        filename: filename.to_string(),
        file_type,
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

fn submission(id: i32, status: SubmissionStatus) -> MJobSubmission {
    MJobSubmission {
        id,
        name: "rats".to_string(),
        description: None,
        owner_email: common::OWNER_EMAIL.to_string(),
        job_script_id: 2,
        execution_directory: None,
        slurm_job_id: None,
        client_id: Some("test-cluster".to_string()),
        status,
        report_message: None,
        execution_parameters: json!({"job_name": "rats"}),
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

#[tokio::test]
async fn test_create_without_client_id() {
    let server = common::create_test_server(
        MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
    );
    let token = common::encode_claims(&TokenClaims {
        client_id: None,
        ..common::claims(&[Permission::JobSubmissionsEdit])
    });

    let response = server
        .post("/jobbergate/job-submissions")
        .authorization_bearer(token)
        .json(&json!({"name": "rats", "job_script_id": 2}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_requires_single_entrypoint() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::job_script(2)]])
        .append_query_results([vec![
            job_script_file("one.sh", FileType::Entrypoint),
            job_script_file("two.sh", FileType::Entrypoint),
        ]])
        .into_connection();
    let server = common::create_test_server(db);

    let response = server
        .post("/jobbergate/job-submissions")
        .authorization_bearer(common::token(&[Permission::JobSubmissionsEdit]))
        .json(&json!({"name": "rats", "job_script_id": 2}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_parses_sbatch_parameters() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::job_script(2)]])
        .append_query_results([vec![job_script_file("run.sh", FileType::Entrypoint)]])
        .append_query_results([vec![job_script_file("run.sh", FileType::Entrypoint)]])
        .append_query_results([
            vec![submission(7, SubmissionStatus::Created)],
            vec![submission(7, SubmissionStatus::Created)],
        ])
        .into_connection();

    let store = Arc::new(MemoryStore::new());
    store
        .put(
            "job_scripts/2/run.sh",
            b"#!/bin/bash\n#SBATCH --job-name=rats\n".to_vec(),
        )
        .await
        .unwrap();

    let server = common::create_test_server_with_store(db.clone(), store);

    let response = server
        .post("/jobbergate/job-submissions")
        .authorization_bearer(common::token(&[Permission::JobSubmissionsEdit]))
        .json(&json!({"name": "rats", "job_script_id": 2}))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["message"]["status"], "CREATED");

    // the insert carries the parsed parameters and the token's client id
    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains("job_name"));
    assert!(log.contains("test-cluster"));
}

#[tokio::test]
async fn test_agent_pending() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![submission(7, SubmissionStatus::Created)]])
        .into_connection();
    let server = common::create_test_server(db.clone());

    let response = server
        .get("/jobbergate/job-submissions/agent/pending")
        .authorization_bearer(common::token(&[Permission::JobSubmissionsView]))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"][0]["id"], 7);

    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains("test-cluster"));
}

#[tokio::test]
async fn test_agent_update_other_client() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<MJobSubmission>::new()])
        .into_connection();
    let server = common::create_test_server(db);

    let response = server
        .put("/jobbergate/job-submissions/agent/7")
        .authorization_bearer(common::token(&[Permission::JobSubmissionsEdit]))
        .json(&json!({"status": "SUBMITTED", "slurm_job_id": 11}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_invalid_slurm_job_ids() {
    let server = common::create_test_server(
        MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
    );

    let response = server
        .get("/jobbergate/job-submissions")
        .add_query_param("slurm_job_ids", "1,abc")
        .authorization_bearer(common::token(&[Permission::JobSubmissionsView]))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
