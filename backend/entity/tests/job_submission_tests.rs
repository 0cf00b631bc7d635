/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for job script and job submission entities

use chrono::NaiveDate;
use entity::*;
use sea_orm::{DatabaseBackend, MockDatabase, entity::prelude::*};
use serde_json::json;

fn naive_date() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 10)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

#[tokio::test]
async fn test_job_submission_entity() -> Result<(), DbErr> {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![job_submission::Model {
            id: 7,
            name: "rats".to_owned(),
            description: Some("counting rats".to_owned()),
            owner_email: "owner@example.com".to_owned(),
            job_script_id: 2,
            execution_directory: Some("/scratch/rats".to_owned()),
            slurm_job_id: Some(1234),
            client_id: Some("test-cluster".to_owned()),
            status: SubmissionStatus::Submitted,
            report_message: None,
            execution_parameters: json!({"partition": "debug"}),
            created_at: naive_date(),
            updated_at: naive_date(),
        }]])
        .into_connection();

    let submission = job_submission::Entity::find_by_id(7)
        .one(&db)
        .await?
        .expect("submission exists");

    assert_eq!(submission.status, SubmissionStatus::Submitted);
    assert_eq!(submission.slurm_job_id, Some(1234));
    assert_eq!(submission.execution_parameters["partition"], "debug");

    Ok(())
}

#[tokio::test]
async fn test_job_script_files_by_parent() -> Result<(), DbErr> {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            job_script_file::Model {
                id: 2,
                filename: "run.sh".to_owned(),
                file_type: FileType::Entrypoint,
                created_at: naive_date(),
                updated_at: naive_date(),
            },
            job_script_file::Model {
                id: 2,
                filename: "helper.py".to_owned(),
                file_type: FileType::Support,
                created_at: naive_date(),
                updated_at: naive_date(),
            },
        ]])
        .into_connection();

    let files = job_script_file::Entity::find()
        .filter(job_script_file::Column::Id.eq(2))
        .all(&db)
        .await?;

    assert_eq!(files.len(), 2);
    assert_eq!(
        files
            .iter()
            .filter(|f| f.file_type == FileType::Entrypoint)
            .count(),
        1
    );

    Ok(())
}

#[test]
fn test_model_serialization() {
    let template = job_script_template::Model {
        id: 1,
        identifier: None,
        name: "rats".to_owned(),
        description: None,
        owner_email: "owner@example.com".to_owned(),
        template_vars: json!({"job_name": "rats"}),
        created_at: naive_date(),
        updated_at: naive_date(),
    };

    let value = serde_json::to_value(&template).unwrap();
    assert_eq!(value["template_vars"]["job_name"], "rats");
    assert_eq!(value["identifier"], serde_json::Value::Null);
}
