/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod common;

use axum::http::StatusCode;
use chrono::NaiveDateTime;
use entity::FileType;
use jobbergate_core::permission::Permission;
use jobbergate_core::storage::{MemoryStore, ObjectStore};
use jobbergate_core::types::*;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::{Value, json};
use std::sync::Arc;

fn entrypoint_template() -> MTemplateFile {
    MTemplateFile {
        id: 1,
        filename: "entrypoint.sh.j2".to_string(),
        file_type: FileType::Entrypoint,
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

async fn store_with_template(content: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .put(
            "job_script_templates/1/entrypoint.sh.j2",
            content.as_bytes().to_vec(),
        )
        .await
        .unwrap();
    store
}

fn render_body() -> Value {
    json!({
        "create_request": {"name": "rats"},
        "render_request": {
            "template_output_name_mapping": {"entrypoint.sh.j2": "run.sh"},
            "sbatch_params": ["--partition=debug"],
            "param_dict": {"jobbergate_config": {"job_name": "rats"}}
        }
    })
}

#[tokio::test]
async fn test_render_from_template() {
    let mut job_script = common::job_script(5);
    job_script.parent_template_id = Some(1);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::job_script_template(1)]])
        .append_query_results([vec![entrypoint_template()]])
        .append_query_results([vec![entrypoint_template()]])
        .append_query_results([vec![job_script.clone()], vec![job_script]])
        .append_query_results([Vec::<MJobScriptFile>::new()])
        .append_query_results([vec![MJobScriptFile {
            id: 5,
            filename: "run.sh".to_string(),
            file_type: FileType::Entrypoint,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }]])
        .into_connection();

    let store =
        store_with_template("#!/bin/bash\n#SBATCH --job-name={{ job_name }}\necho start\n").await;
    let server = common::create_test_server_with_store(db, store.clone());

    let response = server
        .post("/jobbergate/job-scripts/render-from-template/rats")
        .authorization_bearer(common::token(&[Permission::JobScriptsEdit]))
        .json(&render_body())
        .await;

    response.assert_status(StatusCode::CREATED);

    let body = response.json::<Value>();
    assert_eq!(body["message"]["parent_template_id"], 1);
    assert_eq!(body["message"]["files"][0]["filename"], "run.sh");

    let rendered = store.get("job_scripts/5/run.sh").await.unwrap();
    assert_eq!(
        String::from_utf8(rendered).unwrap(),
        "#!/bin/bash\n#SBATCH --job-name=rats\n#SBATCH --partition=debug\necho start\n"
    );
}

#[tokio::test]
async fn test_render_with_undefined_variable() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::job_script_template(1)]])
        .append_query_results([vec![entrypoint_template()]])
        .append_query_results([vec![entrypoint_template()]])
        .into_connection();

    let store = store_with_template("#!/bin/bash\necho {{ missing_value }}\n").await;
    let server = common::create_test_server_with_store(db.clone(), store);

    let response = server
        .post("/jobbergate/job-scripts/render-from-template/1")
        .authorization_bearer(common::token(&[Permission::JobScriptsEdit]))
        .json(&render_body())
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // nothing was written after the template lookups
    assert_eq!(db.into_transaction_log().len(), 3);
}

#[tokio::test]
async fn test_delete_job_script_with_submissions() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::job_script(2)]])
        .append_query_results([vec![MJobSubmission {
            id: 9,
            name: "rats".to_string(),
            description: None,
            owner_email: common::OWNER_EMAIL.to_string(),
            job_script_id: 2,
            execution_directory: None,
            slurm_job_id: None,
            client_id: None,
            status: entity::SubmissionStatus::Created,
            report_message: None,
            execution_parameters: json!({}),
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }]])
        .into_connection();
    let server = common::create_test_server(db);

    let response = server
        .delete("/jobbergate/job-scripts/2")
        .authorization_bearer(common::token(&[Permission::JobScriptsEdit]))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["message"]["table"],
        "job_submissions"
    );
}
